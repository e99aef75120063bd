//! The delimited price-table exchange format.
//!
//! Tab-separated, UTF-8, one header row, one row per item. The operator
//! edits this file by hand to seed atomic-item prices, so the format favors
//! spreadsheet friendliness: empty cells for absent values, and `-1` for a
//! not-yet-priced row. The `-1` sentinel exists only in this format; in
//! memory the price state is a sum type.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::domain::{
    FinalPriceRow, PriceRow, PriceTable, ReagentSlot, UnitPrice, MAX_REAGENTS,
};

const UNRESOLVED_SENTINEL: f64 = -1.0;

const FIXED_COLUMNS: [&str; 12] = [
    "item_id",
    "display_name",
    "unit_price",
    "markup",
    "purchasable",
    "category",
    "subcategory",
    "quality_tier",
    "binding",
    "item_level",
    "required_level",
    "produced_count",
];

const FINAL_COLUMNS: [&str; 5] = ["item_id", "display_name", "price", "markup", "purchasable"];

#[derive(Debug, Error)]
pub enum TableIoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("missing or unexpected table header")]
    Header,
    #[error("malformed table line {line}: {reason}")]
    Row { line: usize, reason: String },
}

fn header_line() -> String {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|name| name.to_string()).collect();
    for slot in 1..=MAX_REAGENTS {
        columns.push(format!("reagent_item_id_{slot}"));
        columns.push(format!("reagent_name_{slot}"));
        columns.push(format!("reagent_count_{slot}"));
    }
    columns.join("\t")
}

fn price_row_line(row: &PriceRow) -> String {
    let mut fields: Vec<String> = vec![
        row.item_id.to_string(),
        row.name.clone(),
        match row.unit_price {
            UnitPrice::Resolved(value) => value.to_string(),
            UnitPrice::Unresolved => UNRESOLVED_SENTINEL.to_string(),
        },
        row.markup.to_string(),
        row.purchasable
            .map(|flag| i32::from(flag).to_string())
            .unwrap_or_default(),
        row.category.clone(),
        row.subcategory.clone(),
        row.quality.clone(),
        row.binding.clone(),
        row.item_level.to_string(),
        row.required_level.to_string(),
        row.produced_count
            .map(|count| count.to_string())
            .unwrap_or_default(),
    ];
    for slot in 0..MAX_REAGENTS {
        match row.reagents.get(slot) {
            Some(reagent) => {
                fields.push(reagent.item_id.to_string());
                fields.push(reagent.name.clone().unwrap_or_default());
                fields.push(reagent.count.to_string());
            }
            None => fields.extend([String::new(), String::new(), String::new()]),
        }
    }
    fields.join("\t")
}

/// Write the working table (base or seeded) in the exchange format.
pub fn write_price_table(path: &Path, table: &PriceTable) -> Result<(), TableIoError> {
    let mut text = header_line();
    for row in table.rows() {
        text.push('\n');
        text.push_str(&price_row_line(row));
    }
    text.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

pub fn read_price_table(path: &Path) -> Result<PriceTable, TableIoError> {
    let text = fs::read_to_string(path)?;
    parse_price_table(&text)
}

/// Parse the exchange format. The header is validated before any row is
/// touched; a malformed row is an error, never a silently shorter table.
pub fn parse_price_table(text: &str) -> Result<PriceTable, TableIoError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header == header_line() => {}
        _ => return Err(TableIoError::Header),
    }

    let mut table = PriceTable::new();
    for (index, line) in lines {
        if line.is_empty() {
            continue;
        }
        let row = parse_price_row(line).map_err(|reason| TableIoError::Row {
            line: index + 1,
            reason,
        })?;
        table.insert(row);
    }
    Ok(table)
}

fn parse_price_row(line: &str) -> Result<PriceRow, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    let expected = FIXED_COLUMNS.len() + 3 * MAX_REAGENTS;
    if fields.len() != expected {
        return Err(format!(
            "expected {expected} columns, got {}",
            fields.len()
        ));
    }

    let unit_price = match parse_number::<f64>(fields[2], "unit_price")? {
        value if value == UNRESOLVED_SENTINEL => UnitPrice::Unresolved,
        value => UnitPrice::Resolved(value),
    };
    let purchasable = match fields[4] {
        "" => None,
        value => Some(parse_number::<i64>(value, "purchasable")? != 0),
    };
    let produced_count = match fields[11] {
        "" => None,
        value => Some(parse_number(value, "produced_count")?),
    };

    let mut reagents = Vec::new();
    for slot in 0..MAX_REAGENTS {
        let base = FIXED_COLUMNS.len() + slot * 3;
        let id = fields[base];
        if id.is_empty() || id == "0" {
            continue;
        }
        let name = fields[base + 1];
        reagents.push(ReagentSlot {
            item_id: parse_number(id, "reagent_item_id")?,
            name: (!name.is_empty()).then(|| name.to_string()),
            // Hand-edited sheets sometimes hold counts as floats.
            count: parse_number::<f64>(fields[base + 2], "reagent_count")? as u32,
        });
    }

    Ok(PriceRow {
        item_id: parse_number(fields[0], "item_id")?,
        name: fields[1].to_string(),
        unit_price,
        markup: parse_number(fields[3], "markup")?,
        purchasable,
        category: fields[5].to_string(),
        subcategory: fields[6].to_string(),
        quality: fields[7].to_string(),
        binding: fields[8].to_string(),
        item_level: parse_number(fields[9], "item_level")?,
        required_level: parse_number(fields[10], "required_level")?,
        produced_count,
        reagents,
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, column: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("column {column}: not a number: {value:?}"))
}

/// Write the resolved export: copper prices, no reagent columns.
pub fn write_final_table(path: &Path, rows: &[FinalPriceRow]) -> Result<(), TableIoError> {
    let mut text = FINAL_COLUMNS.join("\t");
    for row in rows {
        text.push('\n');
        let fields = [
            row.item_id.to_string(),
            row.name.clone(),
            row.price_copper.to_string(),
            row.markup.to_string(),
            row.purchasable
                .map(|flag| i32::from(flag).to_string())
                .unwrap_or_default(),
        ];
        text.push_str(&fields.join("\t"));
    }
    text.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}
