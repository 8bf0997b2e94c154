// JSON snapshot loading
//
// Two shapes are accepted:
//   [ { "序号": "1", "负责人": "张三" }, ... ]        array of flat records
//   { "columns": [...], "rows": [[...], ...] }        positional table

use std::path::Path;

use serde_json::Value;

use docdrift_core::Snapshot;

use crate::error::IoError;
use crate::snapshot::{snapshot_from_rows, HeaderRow};

pub(crate) fn load(path: &Path) -> Result<Snapshot, IoError> {
    let text = crate::csv::read_file_as_utf8(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| IoError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rows = rows_from_value(value).map_err(|message| IoError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    snapshot_from_rows(rows, HeaderRow::First).ok_or_else(|| IoError::EmptyHeader(path.to_path_buf()))
}

/// Flatten either accepted shape into header + positional rows.
fn rows_from_value(value: Value) -> Result<Vec<Vec<String>>, String> {
    match value {
        Value::Array(records) => from_records(records),
        Value::Object(mut table) => {
            let columns = match table.remove("columns") {
                Some(Value::Array(c)) => c,
                _ => return Err("expected an array of records or an object with \"columns\" and \"rows\"".into()),
            };
            let header = columns.iter().map(cell_text).collect::<Result<Vec<_>, _>>()?;
            let mut rows = vec![header];
            match table.remove("rows") {
                Some(Value::Array(data)) => {
                    for (i, row) in data.iter().enumerate() {
                        let Value::Array(cells) = row else {
                            return Err(format!("row {i} is not an array"));
                        };
                        rows.push(cells.iter().map(cell_text).collect::<Result<_, _>>()?);
                    }
                }
                None => {}
                Some(_) => return Err("\"rows\" must be an array".into()),
            }
            Ok(rows)
        }
        _ => Err("expected an array of records or an object with \"columns\" and \"rows\"".into()),
    }
}

/// Columns in first-seen key order across all records.
fn from_records(records: Vec<Value>) -> Result<Vec<Vec<String>>, String> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let Value::Object(map) = record else {
            return Err(format!("record {i} is not an object"));
        };
        for key in map.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(map);
    }

    let mut rows = Vec::with_capacity(objects.len() + 1);
    rows.push(columns.clone());
    for map in &objects {
        let row = columns
            .iter()
            .map(|c| map.get(c).map(cell_text).unwrap_or_else(|| Ok(String::new())))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn cell_text(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(format!("nested value {value} is not a cell")),
    }
}
