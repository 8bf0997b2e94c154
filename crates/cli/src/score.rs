// docdrift score: full batch run

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use docdrift_cluster::StrategyKind;
use docdrift_engine::{run, ClusterOptions, ComprehensiveScoreMatrix, RunOptions, TableScore};
use docdrift_io::{write_json, BatchConfig, LoadOptions};

use crate::util::{column_width, heat_glyph, pad_right};
use crate::CliError;

/// Columns listed per table in the summary.
const HOTTEST: usize = 3;

pub fn cmd_score(
    batch_path: &Path,
    output: Option<PathBuf>,
    json: bool,
    cluster: Option<StrategyKind>,
    timestamp: Option<String>,
    quiet: bool,
    load: &LoadOptions,
) -> Result<(), CliError> {
    let batch = BatchConfig::load(batch_path)?;
    let taxonomy = batch.load_taxonomy()?;
    let scoring = batch.scoring(&taxonomy);
    let tables = batch.load_tables(load)?;

    let cluster = match cluster {
        Some(strategy) => Some(ClusterOptions {
            strategy,
            ..batch.cluster_options().unwrap_or_default()
        }),
        None => batch.cluster_options(),
    };
    let options = RunOptions {
        diff: batch.diff_options(),
        cluster,
        timestamp,
    };
    let out = run(&taxonomy, &scoring, &tables, &options)?;

    let artifact = match (output, json) {
        (Some(path), _) => Some(path),
        (None, true) => None,
        (None, false) => Some(batch.base_dir.join(format!("{}.comprehensive.json", batch.name))),
    };
    if let Some(path) = &artifact {
        write_json(path, &out.matrix)?;
    }

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &out.matrix).map_err(|e| CliError::output(e.into()))?;
        writeln!(stdout).map_err(CliError::output)?;
    } else {
        render_summary(&mut stdout, &out.table_scores, &out.matrix, scoring.floor).map_err(CliError::output)?;
    }

    if !quiet {
        let s = &out.matrix.statistics;
        eprintln!(
            "{} table(s), {} modified of {} cells ({:.1}%)",
            out.matrix.table_names.len(),
            s.modified_cells,
            s.total_cells,
            s.modification_rate * 100.0
        );
        if let Some(path) = &artifact {
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

/// One line per table (heat strip plus the hottest columns), then totals.
pub(crate) fn render_summary(
    out: &mut impl Write,
    scores: &[TableScore],
    matrix: &ComprehensiveScoreMatrix,
    floor: f64,
) -> io::Result<()> {
    let name_w = column_width(matrix.table_names.iter().map(String::as_str), 8, 28);

    for (row, score) in matrix.heatmap_data.matrix.iter().zip(scores) {
        let strip: String = row.iter().map(|h| heat_glyph(*h)).collect();

        let mut hot: Vec<(usize, f64)> = row.iter().copied().enumerate().filter(|(_, h)| *h > floor).collect();
        // hottest first, canonical order among equals
        hot.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let hottest: Vec<String> = hot
            .iter()
            .take(HOTTEST)
            .map(|(i, h)| format!("{} {:.2}", matrix.column_names[*i], h))
            .collect();

        writeln!(
            out,
            "{}  {}  rows {:>4}  mods {:>4}  {}",
            pad_right(&score.table_name, name_w),
            strip,
            score.total_rows,
            score.modifications.len(),
            if hottest.is_empty() { "-".to_string() } else { hottest.join(", ") }
        )?;
    }

    let s = &matrix.statistics;
    writeln!(
        out,
        "risk: {} high, {} medium, {} low  |  modified columns: L1 {}, L2 {}, L3 {}",
        s.risk_distribution.high,
        s.risk_distribution.medium,
        s.risk_distribution.low,
        s.tier_breakdown.l1,
        s.tier_breakdown.l2,
        s.tier_breakdown.l3
    )?;
    if let Some(ordering) = &matrix.cluster_ordering {
        writeln!(
            out,
            "cluster: {} metric {:.4} (identity {:.4})",
            ordering.strategy, ordering.metric, ordering.identity_metric
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdrift_core::Snapshot;
    use docdrift_engine::{ScoringConfig, TableInput, Taxonomy};

    fn table(name: &str, owner_before: &str, owner_after: &str) -> TableInput {
        let cols = ["序号", "负责人"];
        TableInput {
            name: name.into(),
            baseline: Snapshot::from_rows(&cols, &[vec!["1", owner_before]]),
            target: Snapshot::from_rows(&cols, &[vec!["1", owner_after]]),
            sources: Vec::new(),
        }
    }

    #[test]
    fn summary_lists_hot_columns() {
        let taxonomy = Taxonomy::reference();
        let tables = [table("出国销售计划表", "张三", "李四"), table("小红书部门", "王五", "王五")];
        let out = run(&taxonomy, &ScoringConfig::default(), &tables, &RunOptions::default()).unwrap();

        let mut buf = Vec::new();
        render_summary(&mut buf, &out.table_scores, &out.matrix, 0.05).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("出国销售计划表"));
        assert!(lines[0].ends_with("负责人 0.30"));
        assert!(lines[0].contains('▒'));
        assert!(lines[1].ends_with('-'));
        assert!(lines[2].starts_with("risk: 0 high, 1 medium, 37 low"));
        assert!(lines[2].ends_with("L1 1, L2 0, L3 0"));
    }
}
