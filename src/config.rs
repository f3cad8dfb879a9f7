//! Coordinator configuration.
//!
//! Version mode and chain tracing are explicit construction-time options
//! rather than process-global flags, so two coordinators in one process can
//! disagree about them.

/// Controls how physical versions are derived for edge keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMode {
    /// Every write of the same logical edge lands on one fixed version,
    /// so repeated writes overwrite in place.
    Single,

    /// Each batch derives a version from the wall clock so repeated writes
    /// produce distinguishable, time-ordered physical versions. Newer
    /// writes sort before older ones in the underlying store.
    Multi,
}

/// Configuration for the chain write coordinator.
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// Version derivation mode for edge keys.
    pub version_mode: VersionMode,

    /// Emit a debug event per chain with its terminal outcome.
    pub trace_chains: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            version_mode: VersionMode::Single,
            trace_chains: false,
        }
    }
}

impl WriteConfig {
    /// Preset enabling wall-clock versioning.
    pub fn multi_version() -> Self {
        Self {
            version_mode: VersionMode::Multi,
            ..Self::default()
        }
    }
}
