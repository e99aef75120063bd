//! Client and decoder for the raw spell-effect dataset.
//!
//! The dataset ships as a versioned `Spell.csv.gz` release blob. Release
//! blobs are immutable, so a copy already on disk is reused without
//! re-downloading. The CSV has a header row whose names are ignored; columns
//! are positional, per the dataset layout.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::domain::{SpellEffectRecord, REAGENT_FIELDS};
use crate::util::version::{APP_VERSION, USER_AGENT};

const DEFAULT_BASE_URL: &str =
    "https://github.com/skynatbs/craft_price_index-data/releases/download/";

// Column indices (0-based) of the fields the extractor reads. The reagent
// id and count blocks are each eight consecutive columns.
const COL_SPELL_ID: usize = 0;
const COL_REAGENT_IDS: usize = 52;
const COL_REAGENT_COUNTS: usize = 60;
const COL_EFFECT: usize = 71;
const COL_DIE_SIDES: usize = 74;
const COL_BASE_POINTS: usize = 80;
const COL_CREATED_ITEM: usize = 107;
const COL_SECONDARY_ITEM_TYPE: usize = 108;
const COL_TERTIARY_ITEM_TYPE: usize = 109;

const MIN_COLUMNS: usize = COL_TERTIARY_ITEM_TYPE + 1;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dataset endpoint returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("dataset is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed dataset line {line}: {reason}")]
    Line { line: usize, reason: String },
}

/// Downloads dataset release blobs, reusing local copies.
#[derive(Clone)]
pub struct DatasetClient {
    http: Client,
    base_url: Url,
}

impl DatasetClient {
    pub fn new() -> Result<Self, DatasetError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, DatasetError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    /// Fetch `file_name` into `dest_dir`, skipping the network when a copy
    /// already exists. A failed fetch is an error; there is no partial data.
    pub async fn download(&self, file_name: &str, dest_dir: &Path) -> Result<PathBuf, DatasetError> {
        let dest = dest_dir.join(file_name);
        if dest.exists() {
            debug!(path = %dest.display(), "dataset already on disk, skipping download");
            return Ok(dest);
        }

        let url = self
            .base_url
            .join(&format!("{APP_VERSION}/{file_name}"))?;
        info!(%url, "downloading dataset");
        let response = self.http.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(DatasetError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        fs::create_dir_all(dest_dir)?;
        fs::write(&dest, &bytes)?;
        info!(path = %dest.display(), bytes = bytes.len(), "dataset saved");
        Ok(dest)
    }
}

/// Read a spell dataset from disk, gunzipping when the path ends in `.gz`.
pub fn read_spell_records(path: &Path) -> Result<Vec<SpellEffectRecord>, DatasetError> {
    let raw = fs::read(path)?;
    let text = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut text = String::new();
        GzDecoder::new(raw.as_slice()).read_to_string(&mut text)?;
        text
    } else {
        String::from_utf8(raw)?
    };
    parse_spell_csv(&text)
}

/// Decode the dataset CSV into effect records. The first line is a header
/// and is skipped; every following non-empty line must parse, so a corrupt
/// file is an error rather than a silently shorter dataset.
pub fn parse_spell_csv(text: &str) -> Result<Vec<SpellEffectRecord>, DatasetError> {
    let mut lines = text.lines().enumerate();
    if lines.next().is_none() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (index, line) in lines {
        if line.is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        let record = record_from_fields(&fields).map_err(|reason| DatasetError::Line {
            line: index + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn record_from_fields(fields: &[String]) -> Result<SpellEffectRecord, String> {
    if fields.len() < MIN_COLUMNS {
        return Err(format!(
            "expected at least {MIN_COLUMNS} columns, got {}",
            fields.len()
        ));
    }

    let mut reagent_ids = [0u32; REAGENT_FIELDS];
    let mut reagent_counts = [0u32; REAGENT_FIELDS];
    for slot in 0..REAGENT_FIELDS {
        reagent_ids[slot] = int_field(fields, COL_REAGENT_IDS + slot)?;
        reagent_counts[slot] = int_field(fields, COL_REAGENT_COUNTS + slot)?;
    }

    Ok(SpellEffectRecord {
        spell_id: int_field(fields, COL_SPELL_ID)?,
        effect: int_field(fields, COL_EFFECT)?,
        die_sides: int_field(fields, COL_DIE_SIDES)?,
        base_points: int_field(fields, COL_BASE_POINTS)?,
        created_item: int_field(fields, COL_CREATED_ITEM)?,
        secondary_item_type: flag_field(fields, COL_SECONDARY_ITEM_TYPE)?,
        tertiary_item_type: flag_field(fields, COL_TERTIARY_ITEM_TYPE)?,
        reagent_ids,
        reagent_counts,
    })
}

fn int_field<T: std::str::FromStr>(fields: &[String], index: usize) -> Result<T, String> {
    fields[index]
        .trim()
        .parse()
        .map_err(|_| format!("column {}: not a number: {:?}", index + 1, fields[index]))
}

/// Item-type fields are written either as decimal or as `0x`-prefixed hex.
fn flag_field(fields: &[String], index: usize) -> Result<u64, String> {
    let value = fields[index].trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("column {}: not a flag value: {value:?}", index + 1))
}

/// Minimal quote-aware CSV field split. Handles quoted fields containing
/// commas and doubled quotes; no multi-line fields, which the dataset does
/// not contain.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a dataset line with every column zeroed except the given
    /// `(index, value)` overrides.
    fn line_with(overrides: &[(usize, &str)]) -> String {
        let mut fields = vec!["0".to_string(); MIN_COLUMNS];
        for (index, value) in overrides {
            fields[*index] = (*value).to_string();
        }
        fields.join(",")
    }

    fn dataset(lines: &[String]) -> String {
        let header = vec!["col"; MIN_COLUMNS].join(",");
        let mut text = header;
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    #[test]
    fn decodes_the_craft_columns() {
        let line = line_with(&[
            (COL_SPELL_ID, "2962"),
            (COL_EFFECT, "24"),
            (COL_DIE_SIDES, "1"),
            (COL_BASE_POINTS, "4"),
            (COL_CREATED_ITEM, "2996"),
            (COL_SECONDARY_ITEM_TYPE, "0x0"),
            (COL_TERTIARY_ITEM_TYPE, "0x0"),
            (COL_REAGENT_IDS, "2589"),
            (COL_REAGENT_COUNTS, "2"),
        ]);
        let records = parse_spell_csv(&dataset(&[line])).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.spell_id, 2962);
        assert_eq!(record.effect, 24);
        assert_eq!(record.die_sides, 1);
        assert_eq!(record.base_points, 4);
        assert_eq!(record.created_item, 2996);
        assert_eq!(record.secondary_item_type, 0);
        assert_eq!(record.reagent_ids[0], 2589);
        assert_eq!(record.reagent_counts[0], 2);
    }

    #[test]
    fn hex_flags_parse_as_hex() {
        let line = line_with(&[(COL_SECONDARY_ITEM_TYPE, "0x4000")]);
        let records = parse_spell_csv(&dataset(&[line])).unwrap();
        assert_eq!(records[0].secondary_item_type, 0x4000);
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let mut fields = vec!["0".to_string(); MIN_COLUMNS];
        fields[1] = "\"Brood of Nozdormu, Keepers of Time\"".to_string();
        fields[COL_SPELL_ID] = "7".to_string();
        let records = parse_spell_csv(&dataset(&[fields.join(",")])).unwrap();
        assert_eq!(records[0].spell_id, 7);
    }

    #[test]
    fn header_only_input_is_empty() {
        assert!(parse_spell_csv("a,b,c").unwrap().is_empty());
        assert!(parse_spell_csv("").unwrap().is_empty());
    }

    #[test]
    fn short_lines_are_an_error() {
        let text = dataset(&["1,2,3".to_string()]);
        let err = parse_spell_csv(&text).unwrap_err();
        assert!(matches!(err, DatasetError::Line { line: 2, .. }));
    }

    #[test]
    fn non_numeric_columns_are_an_error() {
        let line = line_with(&[(COL_DIE_SIDES, "many")]);
        assert!(parse_spell_csv(&dataset(&[line])).is_err());
    }

    #[test]
    fn split_handles_doubled_quotes() {
        let fields = split_csv_line("1,\"say \"\"hi\"\"\",3");
        assert_eq!(fields, vec!["1", "say \"hi\"", "3"]);
    }
}
