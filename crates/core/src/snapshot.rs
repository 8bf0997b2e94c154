use std::collections::HashMap;

/// One data row: raw column label → raw cell text.
pub type Record = HashMap<String, String>;

/// A tabular snapshot as handed to the differ.
///
/// `columns` keeps header order; the differ walks columns in this order.
/// `first_data_row` is the 1-based sheet row of `records[0]` and is only
/// used to derive A1 addresses for modifications. `sheet_rows`, when set,
/// holds the sheet row of every record (loaders that skip blank lines).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub first_data_row: usize,
    pub sheet_rows: Vec<usize>,
}

impl Snapshot {
    /// Snapshot with a single header row at sheet row 1.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            columns,
            records,
            first_data_row: 2,
            sheet_rows: Vec::new(),
        }
    }

    /// Build a snapshot from positional rows aligned to `columns`.
    /// Short rows are padded with empty strings, extra fields are dropped.
    pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: &[Vec<S>]) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let records = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let value = row.get(i).map(|v| v.as_ref()).unwrap_or("");
                        (col.clone(), value.to_string())
                    })
                    .collect()
            })
            .collect();
        Self::new(columns, records)
    }

    pub fn with_first_data_row(mut self, sheet_row: usize) -> Self {
        self.first_data_row = sheet_row.max(1);
        self
    }

    /// Pin the sheet row of each record, in record order.
    pub fn with_sheet_rows(mut self, sheet_rows: Vec<usize>) -> Self {
        if let Some(&first) = sheet_rows.first() {
            self.first_data_row = first;
        }
        self.sheet_rows = sheet_rows;
        self
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    /// Cell value, or "" when the record lacks the column.
    pub fn value(&self, row: usize, column: &str) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// 1-based sheet row of the record at `row`.
    pub fn sheet_row(&self, row: usize) -> usize {
        match self.sheet_rows.get(row) {
            Some(&sheet_row) => sheet_row,
            None => self.first_data_row + row,
        }
    }
}
