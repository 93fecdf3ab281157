use crate::error::{Result, StoreError};
use incident_protocol::{Dimension, IncidentRecord, RelationRecord};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

const COUNT_COLUMN: &str = "Count";
const HOURS_COLUMN: &str = "Hours";
const SOURCE_COLUMN: &str = "Source";
const TARGET_COLUMN: &str = "Target";

/// On-disk encoding of an uploaded table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma separated with a header row
    Csv,

    /// Array of objects keyed by column name
    Json,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn load_incidents(path: &Path) -> Result<Vec<IncidentRecord>> {
    let format = TableFormat::from_path(path)?;
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(e, path))?;
    let records = match format {
        TableFormat::Csv => parse_incidents_csv(file)?,
        TableFormat::Json => parse_incidents_json(&read_all(file, path)?)?,
    };
    log::debug!("Loaded {} incident rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_relations(path: &Path) -> Result<Vec<RelationRecord>> {
    let format = TableFormat::from_path(path)?;
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(e, path))?;
    let records = match format {
        TableFormat::Csv => parse_relations_csv(file)?,
        TableFormat::Json => parse_relations_json(&read_all(file, path)?)?,
    };
    log::debug!("Loaded {} relation rows from {}", records.len(), path.display());
    Ok(records)
}

fn read_all(mut file: std::fs::File, path: &Path) -> Result<String> {
    let mut raw = String::new();
    file.read_to_string(&mut raw)
        .map_err(|e| StoreError::io(e, path))?;
    Ok(raw)
}

pub fn parse_incidents_csv<R: Read>(reader: R) -> Result<Vec<IncidentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h == column);

    let count_idx = position(COUNT_COLUMN).ok_or_else(|| missing("incident", COUNT_COLUMN))?;
    let hours_idx = position(HOURS_COLUMN).ok_or_else(|| missing("incident", HOURS_COLUMN))?;
    let dimension_idx: Vec<(Dimension, usize)> = Dimension::ALL
        .iter()
        .filter_map(|&dim| position(dim.column_name()).map(|idx| (dim, idx)))
        .collect();

    let mut records = Vec::new();
    for (offset, row) in reader.records().enumerate() {
        let row = row?;
        let line = offset + 2;
        let count = parse_count(line, row.get(count_idx).unwrap_or(""))?;
        let hours = parse_hours(line, row.get(hours_idx).unwrap_or(""))?;

        let mut record = IncidentRecord::new(count, hours);
        for &(dim, idx) in &dimension_idx {
            record.set(dim, row.get(idx).map(str::to_string));
        }
        records.push(record);
    }
    Ok(records)
}

pub fn parse_relations_csv<R: Read>(reader: R) -> Result<Vec<RelationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h == column);

    let source_idx = position(SOURCE_COLUMN).ok_or_else(|| missing("relation", SOURCE_COLUMN))?;
    let target_idx = position(TARGET_COLUMN).ok_or_else(|| missing("relation", TARGET_COLUMN))?;

    let mut relations = Vec::new();
    for (offset, row) in reader.records().enumerate() {
        let row = row?;
        let source = row.get(source_idx).unwrap_or("");
        let target = row.get(target_idx).unwrap_or("");
        push_relation(&mut relations, offset + 2, source, target);
    }
    Ok(relations)
}

pub fn parse_incidents_json(raw: &str) -> Result<Vec<IncidentRecord>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(raw)?;

    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 1;
        let count = parse_count(line, &cell_text(row.get(COUNT_COLUMN)).unwrap_or_default())?;
        let hours = parse_hours(line, &cell_text(row.get(HOURS_COLUMN)).unwrap_or_default())?;

        let mut record = IncidentRecord::new(count, hours);
        for dim in Dimension::ALL {
            record.set(dim, cell_text(row.get(dim.column_name())));
        }
        records.push(record);
    }
    Ok(records)
}

pub fn parse_relations_json(raw: &str) -> Result<Vec<RelationRecord>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(raw)?;

    let mut relations = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let source = cell_text(row.get(SOURCE_COLUMN)).unwrap_or_default();
        let target = cell_text(row.get(TARGET_COLUMN)).unwrap_or_default();
        push_relation(&mut relations, idx + 1, &source, &target);
    }
    Ok(relations)
}

fn push_relation(relations: &mut Vec<RelationRecord>, row: usize, source: &str, target: &str) {
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        log::warn!("Skipping relation row {row}: missing endpoint");
        return;
    }
    relations.push(RelationRecord::new(source, target));
}

/// Text of a JSON cell; null and blank cells are missing
fn cell_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn parse_count(row: usize, raw: &str) -> Result<u64> {
    if raw.is_empty() {
        return Ok(0);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| StoreError::invalid_value(row, COUNT_COLUMN, raw, "not a number"))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(StoreError::invalid_value(
            row,
            COUNT_COLUMN,
            raw,
            "expected a non-negative integer",
        ));
    }
    Ok(value as u64)
}

fn parse_hours(row: usize, raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| StoreError::invalid_value(row, HOURS_COLUMN, raw, "not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::invalid_value(
            row,
            HOURS_COLUMN,
            raw,
            "expected a non-negative real",
        ));
    }
    Ok(value)
}

fn missing(table: &'static str, column: &str) -> StoreError {
    StoreError::MissingColumn {
        table,
        column: column.to_string(),
    }
}
