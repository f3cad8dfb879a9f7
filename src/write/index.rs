use std::sync::Arc;

use crate::codec;
use crate::error::Result;
use crate::kv::BatchOp;
use crate::meta::schema::IndexItem;
use crate::model::{PartId, PropertyValue};
use crate::write::EdgeWriteUnit;

/// Produces secondary-index writes that join an edge's atomic unit.
///
/// Built once per batch when the space has index definitions; edge types
/// without indexes (the common case) get none and skip this entirely.
pub struct IndexDelegate {
    prop_names: Vec<String>,
    indexes: Vec<Arc<IndexItem>>,
}

impl IndexDelegate {
    pub fn new(prop_names: Vec<String>, indexes: Vec<Arc<IndexItem>>) -> Self {
        Self {
            prop_names,
            indexes,
        }
    }

    /// Companion index puts for one encoded edge unit, keyed for `part`.
    pub fn index_ops(
        &self,
        vid_len: usize,
        part: PartId,
        unit: &EdgeWriteUnit,
    ) -> Result<Vec<BatchOp>> {
        let (_, key, _) = codec::decode_edge_key(vid_len, &unit.key)?;
        let values = codec::decode_row(&unit.value)?;
        let by_name: Vec<(&str, &PropertyValue)> = self
            .prop_names
            .iter()
            .map(String::as_str)
            .zip(values.iter())
            .collect();

        let mut ops = Vec::new();
        for index in &self.indexes {
            if index.edge_type != key.edge_type.abs() {
                continue;
            }
            let mut indexed: Vec<&PropertyValue> = Vec::with_capacity(index.fields.len());
            for field in &index.fields {
                match by_name.iter().find(|(name, _)| *name == field.as_str()) {
                    Some((_, value)) => indexed.push(value),
                    // Row encoding guarantees full schema coverage; an index
                    // over a field missing from the row is a stale
                    // definition and produces no entry.
                    None => {
                        indexed.clear();
                        break;
                    }
                }
            }
            if indexed.len() != index.fields.len() {
                continue;
            }
            ops.push(BatchOp::Put {
                key: codec::index_key(vid_len, part, index, &key, &indexed),
                value: Vec::new(),
            });
        }
        Ok(ops)
    }
}
