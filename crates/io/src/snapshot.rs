use std::collections::{HashMap, HashSet};
use std::path::Path;

use docdrift_core::{cell, Snapshot};

use crate::error::IoError;

/// Where the header row sits in a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderRow {
    /// First non-blank row, or the row after a one-cell title row.
    #[default]
    Auto,
    First,
    /// 1-based sheet row.
    Row(usize),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Field delimiter; sniffed when absent.
    pub delimiter: Option<u8>,
    pub header: HeaderRow,
}

/// Load a snapshot, dispatching on the file extension.
pub fn load_snapshot(path: &Path, options: &LoadOptions) -> Result<Snapshot, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let snapshot = match ext.as_str() {
        "csv" | "txt" => crate::csv::load(path, options.delimiter, options.header)?,
        "tsv" => crate::csv::load(path, Some(options.delimiter.unwrap_or(b'\t')), options.header)?,
        "json" => crate::json::load(path)?,
        _ => return Err(IoError::UnsupportedFormat(path.to_path_buf())),
    };
    log::debug!(
        "loaded {}: {} column(s), {} row(s), data from sheet row {}",
        path.display(),
        snapshot.column_count(),
        snapshot.row_count(),
        snapshot.first_data_row
    );
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn filled(row: &[String]) -> usize {
    row.iter().filter(|c| !c.trim().is_empty()).count()
}

/// Index of the header row in `rows`, or `None` when there is none.
pub(crate) fn header_index(rows: &[Vec<String>], header: HeaderRow) -> Option<usize> {
    match header {
        HeaderRow::First => (!rows.is_empty()).then_some(0),
        HeaderRow::Row(n) => (n >= 1 && n <= rows.len()).then(|| n - 1),
        HeaderRow::Auto => {
            let first = rows.iter().position(|r| !is_blank(r))?;
            // Exports carry a one-cell title row above the real header.
            match rows.get(first + 1) {
                Some(next) if filled(&rows[first]) == 1 && filled(next) > 1 => Some(first + 1),
                _ => Some(first),
            }
        }
    }
}

/// Unique, non-empty labels: blanks become `Column C`, repeats get `#2`, `#3`.
/// A suffix never reuses a label the header already spells out.
pub(crate) fn label_columns(raw: &[String], width: usize) -> Vec<String> {
    let base: Vec<String> = (0..width)
        .map(|i| {
            let label = raw.get(i).map(|s| s.trim()).unwrap_or("");
            if label.is_empty() {
                format!("Column {}", cell::column_letter(i))
            } else {
                label.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = base.iter().cloned().collect();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    base.into_iter()
        .map(|label| {
            if emitted.insert(label.clone()) {
                return label;
            }
            let n = next_suffix.entry(label.clone()).or_insert(2);
            loop {
                let candidate = format!("{label}#{n}");
                *n += 1;
                if !taken.contains(&candidate) {
                    taken.insert(candidate.clone());
                    emitted.insert(candidate.clone());
                    return candidate;
                }
            }
        })
        .collect()
}

fn trimmed_len(row: &[String]) -> usize {
    row.iter().rposition(|c| !c.trim().is_empty()).map(|i| i + 1).unwrap_or(0)
}

/// Turn raw positional rows into a snapshot. `None` when there is no usable header.
pub(crate) fn snapshot_from_rows(rows: Vec<Vec<String>>, header: HeaderRow) -> Option<Snapshot> {
    let h = header_index(&rows, header)?;
    if is_blank(&rows[h]) {
        return None;
    }

    let width = rows[h..].iter().map(|r| trimmed_len(r)).max().unwrap_or(0);
    let columns = label_columns(&rows[h], width);

    let mut sheet_rows = Vec::new();
    let mut data = Vec::new();
    for (offset, row) in rows.into_iter().enumerate().skip(h + 1) {
        if is_blank(&row) {
            continue;
        }
        // sheet rows are 1-based
        sheet_rows.push(offset + 1);
        data.push(row);
    }

    let snapshot = Snapshot::from_rows(&columns, &data)
        .with_first_data_row(h + 2)
        .with_sheet_rows(sheet_rows);
    Some(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(r: &[&[&str]]) -> Vec<Vec<String>> {
        r.iter().map(|x| x.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn title_row_is_skipped() {
        let r = rows(&[&["出国销售计划表", "", ""], &["序号", "负责人", "完成进度"], &["1", "张三", "50%"]]);
        assert_eq!(header_index(&r, HeaderRow::Auto), Some(1));
        let snap = snapshot_from_rows(r, HeaderRow::Auto).unwrap();
        assert_eq!(snap.columns, vec!["序号", "负责人", "完成进度"]);
        assert_eq!(snap.first_data_row, 3);
        assert_eq!(snap.value(0, "负责人"), "张三");
    }

    #[test]
    fn single_column_file_keeps_its_header() {
        let r = rows(&[&["name"], &["a"], &["b"]]);
        assert_eq!(header_index(&r, HeaderRow::Auto), Some(0));
    }

    #[test]
    fn explicit_header_rows() {
        let r = rows(&[&["x", "y"], &["a", "b"]]);
        assert_eq!(header_index(&r, HeaderRow::First), Some(0));
        assert_eq!(header_index(&r, HeaderRow::Row(2)), Some(1));
        assert_eq!(header_index(&r, HeaderRow::Row(3)), None);
        assert_eq!(header_index(&r, HeaderRow::Row(0)), None);
    }

    #[test]
    fn blank_and_repeated_labels() {
        let raw: Vec<String> = ["a", "", "a", " a ", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(label_columns(&raw, 6), vec!["a", "Column B", "a#2", "a#3", "b", "Column F"]);
    }

    #[test]
    fn suffix_skips_labels_already_in_header() {
        let raw: Vec<String> = ["a", "a#2", "a", "a"].iter().map(|s| s.to_string()).collect();
        let labels = label_columns(&raw, 4);
        assert_eq!(labels, vec!["a", "a#2", "a#3", "a#4"]);

        let r = rows(&[&["a", "a#2", "a"], &["1", "2", "3"]]);
        let snap = snapshot_from_rows(r, HeaderRow::First).unwrap();
        assert_eq!(snap.value(0, "a#2"), "2");
        assert_eq!(snap.value(0, "a#3"), "3");
    }

    #[test]
    fn blank_rows_are_dropped() {
        let r = rows(&[&["", ""], &["id", "v"], &["", " "], &["1", "x"], &["", ""], &["2", "y"]]);
        let snap = snapshot_from_rows(r, HeaderRow::Auto).unwrap();
        assert_eq!(snap.row_count(), 2);
        assert_eq!(snap.first_data_row, 4);
        assert_eq!(snap.value(1, "id"), "2");
        assert_eq!(snap.sheet_row(1), 6);
    }

    #[test]
    fn rows_after_a_gap_keep_their_sheet_row() {
        let r = rows(&[&["id", "v"], &["1", "x"], &["", ""], &["2", "y"]]);
        let snap = snapshot_from_rows(r, HeaderRow::First).unwrap();
        assert_eq!(snap.sheet_row(0), 2);
        assert_eq!(snap.sheet_row(1), 4);
    }

    #[test]
    fn wide_data_rows_get_lettered_columns() {
        let r = rows(&[&["id", "v"], &["1", "x", "extra"]]);
        let snap = snapshot_from_rows(r, HeaderRow::Auto).unwrap();
        assert_eq!(snap.columns, vec!["id", "v", "Column C"]);
        assert_eq!(snap.value(0, "Column C"), "extra");
    }

    #[test]
    fn no_header_means_none() {
        assert!(snapshot_from_rows(Vec::new(), HeaderRow::Auto).is_none());
        assert!(snapshot_from_rows(rows(&[&["", ""]]), HeaderRow::Auto).is_none());
        assert!(snapshot_from_rows(rows(&[&["", ""], &["a", "b"]]), HeaderRow::First).is_none());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        std::fs::write(&path, b"PK").unwrap();
        let err = load_snapshot(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }
}
