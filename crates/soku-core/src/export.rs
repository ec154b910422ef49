//! Layout persistence: pretty JSON for the user-facing export, MessagePack
//! for compact in-memory snapshots.

use crate::model::Block;
use serde::Deserialize;
use thiserror::Error;

/// File name offered for the exported layout.
pub const EXPORT_FILE_NAME: &str = "sokurepo_layout.json";

/// MIME type of the exported layout.
pub const EXPORT_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Serialize the whole block list as an indented JSON array.
pub fn export_json(blocks: &[Block]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(blocks)?)
}

/// Parse a layout produced by [`export_json`].
///
/// Slot trees have no depth limit, so neither does the parser; each nested
/// template costs two JSON levels, which the default limit of 128 would cut
/// off at about 60 templates.
pub fn import_json(json: &str) -> Result<Vec<Block>, SnapshotError> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let blocks = Vec::<Block>::deserialize(&mut de)?;
    de.end()?;
    Ok(blocks)
}

/// Encode blocks as named-field MessagePack.
pub fn encode_snapshot(blocks: &[Block]) -> Result<Vec<u8>, SnapshotError> {
    Ok(rmp_serde::to_vec_named(blocks)?)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Block>, SnapshotError> {
    Ok(rmp_serde::from_slice(bytes)?)
}
