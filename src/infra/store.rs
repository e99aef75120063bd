//! Persisted formats: the extracted recipe set and the item dump.
//!
//! Both are gzip-compressed JSON blobs. The recipe blob exists so later runs
//! can skip re-scanning the large raw dataset; the item dump is produced by
//! the database layer and only read here.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::domain::{ItemRow, Recipe};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed data: {0}")]
    Format(#[from] serde_json::Error),
}

/// Encode a recipe set as a gzip-compressed JSON array, preserving order.
pub fn encode_recipes(recipes: &[Recipe]) -> Result<Vec<u8>, StoreError> {
    let json = serde_json::to_vec(recipes)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decode a recipe set. Corrupt or truncated input is an error; this never
/// returns a partial or reordered list.
pub fn decode_recipes(bytes: &[u8]) -> Result<Vec<Recipe>, StoreError> {
    let mut json = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

pub fn save_recipes(path: &Path, recipes: &[Recipe]) -> Result<(), StoreError> {
    let bytes = encode_recipes(recipes)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, StoreError> {
    let bytes = fs::read(path)?;
    decode_recipes(&bytes)
}

/// Load the gzipped-JSON item dump. Columns beyond the ones [`ItemRow`]
/// carries are ignored, so a full table dump works unmodified.
pub fn load_item_dump(path: &Path) -> Result<Vec<ItemRow>, StoreError> {
    let file = fs::File::open(path)?;
    let mut json = Vec::new();
    GzDecoder::new(file).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

pub fn save_item_dump(path: &Path, items: &[ItemRow]) -> Result<(), StoreError> {
    let json = serde_json::to_vec(items)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let bytes = encoder.finish()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
