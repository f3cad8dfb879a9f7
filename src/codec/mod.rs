//! Key and row encoding for edge writes.
//!
//! An edge's physical key is its owning partition, its padded endpoint ids,
//! type and ranking, and a version tag. The version tag is derived once per
//! batch: a fixed constant in single-version mode (overwrite in place), or
//! `i64::MAX - wall_clock_micros` in multi-version mode so that, under the
//! store's ascending byte order, newer writes sort before older ones.
//!
//! Row values are encoded against the edge schema in the request's declared
//! property-name order. The per-property byte layout is self-describing
//! (tag byte plus payload); schema checking happens at encode time.

use bytes::{BufMut, BytesMut};

use crate::config::VersionMode;
use crate::error::{GraphError, Result};
use crate::meta::schema::{EdgeSchema, IndexItem};
use crate::model::{EdgeKey, PartId, PropertyValue};

/// Fixed version used by single-version mode.
pub const SINGLE_VERSION: i64 = 1;

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_STRING: u8 = 0x04;
const TAG_BYTES: u8 = 0x05;

/// Byte length of an encoded edge key for a given vid length.
pub fn edge_key_len(vid_len: usize) -> usize {
    4 + vid_len + 4 + 8 + vid_len + 8
}

fn put_vid(buf: &mut BytesMut, vid: &[u8], vid_len: usize) {
    if vid.len() >= vid_len {
        buf.put_slice(&vid[..vid_len]);
    } else {
        buf.put_slice(vid);
        buf.put_bytes(0, vid_len - vid.len());
    }
}

/// Key prefix identifying one logical edge within a partition: everything
/// but the version. Scanning this prefix yields all physical versions.
pub fn edge_prefix(vid_len: usize, part: PartId, key: &EdgeKey) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(edge_key_len(vid_len));
    buf.put_u32_le(part);
    put_vid(&mut buf, &key.src, vid_len);
    buf.put_i32_le(key.edge_type);
    buf.put_i64_le(key.ranking);
    put_vid(&mut buf, &key.dst, vid_len);
    buf.to_vec()
}

/// Full physical key for one edge version.
pub fn edge_key(vid_len: usize, part: PartId, key: &EdgeKey, version: i64) -> Vec<u8> {
    let mut buf = BytesMut::from(&edge_prefix(vid_len, part, key)[..]);
    // Version is big-endian so lexicographic key order matches numeric
    // version order.
    buf.put_u64(version as u64);
    buf.to_vec()
}

/// Replaces the partition prefix of an encoded edge key, keeping the rest.
/// Used to materialize the remote-side copy of a chain write.
pub fn rekey_for_part(key: &[u8], part: PartId) -> Vec<u8> {
    let mut out = key.to_vec();
    out[..4].copy_from_slice(&part.to_le_bytes());
    out
}

/// Decodes a physical edge key back into its parts.
pub fn decode_edge_key(vid_len: usize, key: &[u8]) -> Result<(PartId, EdgeKey, i64)> {
    if key.len() != edge_key_len(vid_len) {
        return Err(GraphError::InvalidArgument(format!(
            "edge key length {} does not match vid length {}",
            key.len(),
            vid_len
        )));
    }
    let part = u32::from_le_bytes(key[..4].try_into().unwrap());
    let mut at = 4;
    let src = key[at..at + vid_len].to_vec();
    at += vid_len;
    let edge_type = i32::from_le_bytes(key[at..at + 4].try_into().unwrap());
    at += 4;
    let ranking = i64::from_le_bytes(key[at..at + 8].try_into().unwrap());
    at += 8;
    let dst = key[at..at + vid_len].to_vec();
    at += vid_len;
    let version = u64::from_be_bytes(key[at..at + 8].try_into().unwrap()) as i64;
    Ok((
        part,
        EdgeKey {
            src,
            edge_type,
            ranking,
            dst,
        },
        version,
    ))
}

/// Version tag for one batch in the given mode.
pub fn version_tag(mode: VersionMode) -> i64 {
    match mode {
        VersionMode::Single => SINGLE_VERSION,
        VersionMode::Multi => version_from_micros(wall_clock_micros()),
    }
}

/// Multi-version tag for a wall-clock reading. Later readings map to
/// numerically smaller tags, which sort first.
pub fn version_from_micros(micros: i64) -> i64 {
    i64::MAX - micros
}

fn wall_clock_micros() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

fn put_value(buf: &mut BytesMut, value: &PropertyValue) {
    match value {
        PropertyValue::Bool(b) => {
            buf.put_u8(TAG_BOOL);
            buf.put_u8(u8::from(*b));
        }
        PropertyValue::Int(i) => {
            buf.put_u8(TAG_INT);
            buf.put_i64_le(*i);
        }
        PropertyValue::Float(f) => {
            buf.put_u8(TAG_FLOAT);
            buf.put_f64_le(*f);
        }
        PropertyValue::String(s) => {
            buf.put_u8(TAG_STRING);
            buf.put_u32_le(s.len() as u32);
            buf.put_slice(s.as_bytes());
        }
        PropertyValue::Bytes(b) => {
            buf.put_u8(TAG_BYTES);
            buf.put_u32_le(b.len() as u32);
            buf.put_slice(b);
        }
    }
}

/// Encodes property values against the schema, in the declared name order.
///
/// Every schema field must be supplied exactly once; a missing, duplicate,
/// or unknown name and any value/type disagreement is a mismatch.
pub fn encode_row(
    schema: &EdgeSchema,
    prop_names: &[String],
    props: &[PropertyValue],
) -> Result<Vec<u8>> {
    if prop_names.len() != props.len() {
        return Err(GraphError::TypeMismatch(format!(
            "{} property names for {} values",
            prop_names.len(),
            props.len()
        )));
    }
    if prop_names.len() != schema.fields.len() {
        return Err(GraphError::TypeMismatch(format!(
            "schema declares {} fields, request carries {}",
            schema.fields.len(),
            prop_names.len()
        )));
    }
    let mut buf = BytesMut::new();
    let mut seen: Vec<&str> = Vec::with_capacity(prop_names.len());
    for (name, value) in prop_names.iter().zip(props) {
        let field = schema
            .field(name)
            .ok_or_else(|| GraphError::TypeMismatch(format!("unknown property {name}")))?;
        if seen.contains(&name.as_str()) {
            return Err(GraphError::TypeMismatch(format!(
                "duplicate property {name}"
            )));
        }
        seen.push(name);
        if !field.prop_type.matches(value) {
            return Err(GraphError::TypeMismatch(format!(
                "property {name} does not match its declared type"
            )));
        }
        put_value(&mut buf, value);
    }
    Ok(buf.to_vec())
}

/// Decodes a row back into its values, in encoded order.
pub fn decode_row(mut bytes: &[u8]) -> Result<Vec<PropertyValue>> {
    fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
        if bytes.len() < n {
            return Err(GraphError::InvalidArgument("truncated row".into()));
        }
        let (head, tail) = bytes.split_at(n);
        *bytes = tail;
        Ok(head)
    }

    let mut out = Vec::new();
    while !bytes.is_empty() {
        let tag = take(&mut bytes, 1)?[0];
        let value = match tag {
            TAG_BOOL => PropertyValue::Bool(take(&mut bytes, 1)?[0] != 0),
            TAG_INT => PropertyValue::Int(i64::from_le_bytes(
                take(&mut bytes, 8)?.try_into().unwrap(),
            )),
            TAG_FLOAT => PropertyValue::Float(f64::from_le_bytes(
                take(&mut bytes, 8)?.try_into().unwrap(),
            )),
            TAG_STRING => {
                let len = u32::from_le_bytes(take(&mut bytes, 4)?.try_into().unwrap()) as usize;
                let raw = take(&mut bytes, len)?;
                PropertyValue::String(
                    String::from_utf8(raw.to_vec())
                        .map_err(|_| GraphError::InvalidArgument("invalid utf8 in row".into()))?,
                )
            }
            TAG_BYTES => {
                let len = u32::from_le_bytes(take(&mut bytes, 4)?.try_into().unwrap()) as usize;
                PropertyValue::Bytes(take(&mut bytes, len)?.to_vec())
            }
            other => {
                return Err(GraphError::InvalidArgument(format!(
                    "unknown property tag {other:#x}"
                )))
            }
        };
        out.push(value);
    }
    Ok(out)
}

/// Key for one secondary-index entry of an edge.
pub fn index_key(
    vid_len: usize,
    part: PartId,
    index: &IndexItem,
    key: &EdgeKey,
    values: &[&PropertyValue],
) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u32_le(part);
    buf.put_u32_le(index.index_id);
    for value in values {
        put_value(&mut buf, value);
    }
    put_vid(&mut buf, &key.src, vid_len);
    put_vid(&mut buf, &key.dst, vid_len);
    buf.to_vec()
}
