use crate::error::{GraphError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `fallback`, so deployments can raise
/// chain tracing to `debug` without a rebuild.
pub fn init_logging(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| GraphError::InvalidArgument(format!("bad log filter: {e}")))?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|_| GraphError::InvalidArgument("logging already initialized".into()))
}
