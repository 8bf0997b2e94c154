// docdrift cluster: reorder an existing artifact

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use docdrift_cluster::{reorder_with_cols, ReorderOptions, StrategyKind};
use docdrift_engine::model::ReorderedMatrix;
use docdrift_io::{read_matrix, write_json};

use crate::util::{column_width, heat_glyph, pad_right};
use crate::CliError;

pub fn cmd_cluster(
    artifact: &Path,
    strategy: StrategyKind,
    max_passes: usize,
    floor: f64,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    if !(0.0..=1.0).contains(&floor) {
        return Err(CliError::args(format!("--floor must be within [0, 1], got {floor}")));
    }
    let matrix = read_matrix(artifact)?;

    let options = ReorderOptions { floor, max_passes };
    let ordering = reorder_with_cols(matrix.matrix(), matrix.heatmap_data.cols, strategy, &options);
    let view = matrix.reordered(&ordering);

    if let Some(path) = &output {
        write_json(path, &matrix.with_cluster_ordering(ordering))?;
        eprintln!("wrote {}", path.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &view).map_err(|e| CliError::output(e.into()))?;
        writeln!(out).map_err(CliError::output)?;
    } else {
        render_reordered(&mut out, &view).map_err(CliError::output)?;
    }
    Ok(())
}

/// Heat strips in the new order, column order listed underneath.
pub(crate) fn render_reordered(out: &mut impl Write, view: &ReorderedMatrix) -> io::Result<()> {
    writeln!(
        out,
        "strategy {}: metric {:.4} (identity {:.4})",
        view.strategy, view.metric, view.identity_metric
    )?;
    let name_w = column_width(view.table_names.iter().map(String::as_str), 8, 28);
    for (name, row) in view.table_names.iter().zip(&view.matrix) {
        let strip: String = row.iter().map(|h| heat_glyph(*h)).collect();
        writeln!(out, "{}  {}", pad_right(name, name_w), strip)?;
    }
    writeln!(out, "columns: {}", view.column_names.join(" | "))
}
