// docdrift diff: one table, two snapshots

use std::io::{self, Write};
use std::path::Path;

use docdrift_engine::{diff, DiffOptions, DiffResult, RowAlignment};
use docdrift_io::{load_snapshot, LoadOptions};

use crate::exit_codes::EXIT_CHANGES;
use crate::util::{column_width, pad_right};
use crate::CliError;

pub fn cmd_diff(
    baseline: &Path,
    target: &Path,
    key: Option<String>,
    positional: bool,
    json: bool,
    quiet: bool,
    load: &LoadOptions,
) -> Result<(), CliError> {
    let base = load_snapshot(baseline, load)?;
    let tgt = load_snapshot(target, load)?;

    let alignment = match (key, positional) {
        (Some(column), _) => RowAlignment::Key(column),
        (None, true) => RowAlignment::Positional,
        (None, false) => RowAlignment::Auto,
    };
    let options = DiffOptions {
        alignment,
        ..DiffOptions::default()
    };
    let result = diff(&base, &tgt, &options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &result).map_err(|e| CliError::output(e.into()))?;
        writeln!(out).map_err(CliError::output)?;
    } else {
        render_modifications(&mut out, &result).map_err(CliError::output)?;
    }

    if !quiet {
        let s = &result.summary;
        eprintln!("baseline: {} rows ({})", s.baseline_rows, baseline.display());
        eprintln!("target:   {} rows ({})", s.target_rows, target.display());
        eprintln!("aligned:  {} rows by {}", s.aligned_rows, s.alignment_used);
        eprintln!("added: {}  deleted: {}", s.added_rows, s.deleted_rows);
        eprintln!("modified cells: {}  similarity: {:.3}", s.modified_cells, s.similarity);
    }

    if result.modifications.is_empty() {
        Ok(())
    } else {
        Err(CliError::silent(EXIT_CHANGES))
    }
}

/// Fixed-width listing, one modification per line, in diff order.
pub(crate) fn render_modifications(out: &mut impl Write, result: &DiffResult) -> io::Result<()> {
    if result.modifications.is_empty() {
        return writeln!(out, "no modifications");
    }

    let mods = &result.modifications;
    let cell_w = column_width(mods.iter().map(|m| m.cell.as_str()), 4, 8);
    let col_w = column_width(mods.iter().map(|m| m.column.as_str()), 6, 24);
    let kind_w = column_width(mods.iter().map(|m| m.kind.as_str()), 6, 16);

    writeln!(
        out,
        "{}  {}  {}  change",
        pad_right("cell", cell_w),
        pad_right("column", col_w),
        pad_right("kind", kind_w)
    )?;
    for m in mods {
        writeln!(
            out,
            "{}  {}  {}  {:?} -> {:?}",
            pad_right(&m.cell, cell_w),
            pad_right(&m.column, col_w),
            pad_right(m.kind.as_str(), kind_w),
            m.old_value,
            m.new_value
        )?;
    }
    Ok(())
}
