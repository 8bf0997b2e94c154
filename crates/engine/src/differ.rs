use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use docdrift_core::cell;
use docdrift_core::{ChangeKind, Modification, Snapshot};

use crate::error::DriftError;
use crate::normalize::{canonical, equivalent, Canonical};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How baseline rows are paired with target rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowAlignment {
    /// Key alignment when a usable identifier column exists, else positional.
    #[default]
    Auto,
    /// Align by this column; a missing column or unusable values are errors.
    Key(String),
    Positional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffOptions {
    pub alignment: RowAlignment,
    /// Identifier columns tried in order by `RowAlignment::Auto`.
    pub key_candidates: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            alignment: RowAlignment::Auto,
            key_candidates: default_key_candidates(),
        }
    }
}

pub fn default_key_candidates() -> Vec<String> {
    ["序号", "id", "ID", "编号"].iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AlignmentUsed {
    Key { column: String },
    Positional,
}

impl std::fmt::Display for AlignmentUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key { column } => write!(f, "key '{column}'"),
            Self::Positional => write!(f, "positional"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub baseline_rows: usize,
    pub target_rows: usize,
    /// Rows present on both sides.
    pub aligned_rows: usize,
    pub added_rows: usize,
    pub deleted_rows: usize,
    /// Number of modifications emitted.
    pub modified_cells: usize,
    /// `1 - modified_cells / max(baseline cells, target cells)`, in [0, 1].
    pub similarity: f64,
    pub alignment_used: AlignmentUsed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub modifications: Vec<Modification>,
    pub summary: DiffSummary,
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compare two snapshots. Modifications come out in row-then-column order:
/// aligned and deleted rows in baseline order, then added rows in target order.
pub fn diff(baseline: &Snapshot, target: &Snapshot, options: &DiffOptions) -> Result<DiffResult, DriftError> {
    if baseline.columns.is_empty() {
        return Err(DriftError::EmptyHeader { side: "baseline".into() });
    }
    if target.columns.is_empty() {
        return Err(DriftError::EmptyHeader { side: "target".into() });
    }

    let alignment = choose_alignment(baseline, target, options)?;
    let pairs = match &alignment {
        AlignmentUsed::Key { column } => key_pairs(baseline, target, column),
        AlignmentUsed::Positional => positional_pairs(baseline, target),
    };
    log::debug!(
        "aligning {} baseline / {} target rows by {alignment}",
        baseline.row_count(),
        target.row_count()
    );

    let shared: Vec<(usize, &str)> = baseline
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| target.has_column(c))
        .map(|(i, c)| (i, c.as_str()))
        .collect();

    let mut modifications = Vec::new();
    let (mut aligned, mut added, mut deleted) = (0, 0, 0);

    for pair in pairs {
        match pair {
            (Some(b), Some(t)) => {
                aligned += 1;
                for &(col_idx, col) in &shared {
                    let old = baseline.value(b, col);
                    let new = target.value(t, col);
                    if !equivalent(old, new) {
                        modifications.push(Modification {
                            row: b,
                            column: col.to_string(),
                            old_value: old.to_string(),
                            new_value: new.to_string(),
                            kind: ChangeKind::ContentChanged,
                            cell: cell::address(baseline.sheet_row(b), col_idx),
                        });
                    }
                }
            }
            (Some(b), None) => {
                deleted += 1;
                whole_row(baseline, b, ChangeKind::RowDeleted, &mut modifications);
            }
            (None, Some(t)) => {
                added += 1;
                whole_row(target, t, ChangeKind::RowAdded, &mut modifications);
            }
            (None, None) => {}
        }
    }

    let cells = (baseline.row_count() * baseline.column_count()).max(target.row_count() * target.column_count());
    let similarity = if cells == 0 {
        1.0
    } else {
        (1.0 - modifications.len() as f64 / cells as f64).clamp(0.0, 1.0)
    };

    let summary = DiffSummary {
        baseline_rows: baseline.row_count(),
        target_rows: target.row_count(),
        aligned_rows: aligned,
        added_rows: added,
        deleted_rows: deleted,
        modified_cells: modifications.len(),
        similarity,
        alignment_used: alignment,
    };
    Ok(DiffResult { modifications, summary })
}

/// One event per non-empty cell of an added or deleted row.
fn whole_row(snapshot: &Snapshot, row: usize, kind: ChangeKind, out: &mut Vec<Modification>) {
    for (col_idx, col) in snapshot.columns.iter().enumerate() {
        let value = snapshot.value(row, col);
        if value.trim().is_empty() {
            continue;
        }
        let (old_value, new_value) = match kind {
            ChangeKind::RowAdded => (String::new(), value.to_string()),
            _ => (value.to_string(), String::new()),
        };
        out.push(Modification {
            row,
            column: col.clone(),
            old_value,
            new_value,
            kind,
            cell: cell::address(snapshot.sheet_row(row), col_idx),
        });
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

fn choose_alignment(
    baseline: &Snapshot,
    target: &Snapshot,
    options: &DiffOptions,
) -> Result<AlignmentUsed, DriftError> {
    match &options.alignment {
        RowAlignment::Positional => Ok(AlignmentUsed::Positional),
        RowAlignment::Key(column) => {
            for (side, snap) in [("baseline", baseline), ("target", target)] {
                if !snap.has_column(column) {
                    return Err(DriftError::MissingKeyColumn {
                        side: side.into(),
                        column: column.clone(),
                    });
                }
                if let Some(value) = first_bad_key(snap, column) {
                    return Err(DriftError::DuplicateKeys {
                        side: side.into(),
                        column: column.clone(),
                        value,
                    });
                }
            }
            Ok(AlignmentUsed::Key { column: column.clone() })
        }
        RowAlignment::Auto => {
            let usable = |c: &String| {
                baseline.has_column(c)
                    && target.has_column(c)
                    && first_bad_key(baseline, c).is_none()
                    && first_bad_key(target, c).is_none()
            };
            Ok(match options.key_candidates.iter().find(|c| usable(c)) {
                Some(column) => AlignmentUsed::Key { column: column.clone() },
                None => {
                    log::debug!("no usable identifier column among {:?}; aligning by position", options.key_candidates);
                    AlignmentUsed::Positional
                }
            })
        }
    }
}

/// Keys compare in normalized form, so `007` and `7` identify the same row.
fn key_form(raw: &str) -> String {
    match canonical(raw) {
        Canonical::Stars(n) => n.to_string(),
        Canonical::Number(n) | Canonical::Text(n) => n,
    }
}

/// First empty or repeated key value, if any.
fn first_bad_key(snapshot: &Snapshot, column: &str) -> Option<String> {
    let mut seen = HashSet::new();
    for row in 0..snapshot.row_count() {
        let key = key_form(snapshot.value(row, column));
        if key.is_empty() || !seen.insert(key.clone()) {
            return Some(key);
        }
    }
    None
}

type RowPair = (Option<usize>, Option<usize>);

fn key_pairs(baseline: &Snapshot, target: &Snapshot, column: &str) -> Vec<RowPair> {
    let target_index: HashMap<String, usize> = (0..target.row_count())
        .map(|t| (key_form(target.value(t, column)), t))
        .collect();
    let mut consumed = vec![false; target.row_count()];
    let mut pairs = Vec::with_capacity(baseline.row_count().max(target.row_count()));

    for b in 0..baseline.row_count() {
        match target_index.get(&key_form(baseline.value(b, column))) {
            Some(&t) => {
                consumed[t] = true;
                pairs.push((Some(b), Some(t)));
            }
            None => pairs.push((Some(b), None)),
        }
    }
    pairs.extend(
        consumed
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(t, _)| (None, Some(t))),
    );
    pairs
}

fn positional_pairs(baseline: &Snapshot, target: &Snapshot) -> Vec<RowPair> {
    let (nb, nt) = (baseline.row_count(), target.row_count());
    (0..nb.max(nt))
        .map(|i| ((i < nb).then_some(i), (i < nt).then_some(i)))
        .collect()
}
