// docdrift taxonomy show | validate | resolve

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use docdrift_engine::{ColumnResolver, MatchMethod, Taxonomy};
use docdrift_io::load_taxonomy;

use crate::util::{column_width, pad_right};
use crate::CliError;

fn taxonomy_or_reference(path: Option<PathBuf>) -> Result<Taxonomy, CliError> {
    match path {
        Some(p) => Ok(load_taxonomy(&p)?),
        None => Ok(Taxonomy::reference()),
    }
}

pub fn cmd_show(path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let taxonomy = taxonomy_or_reference(path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &taxonomy).map_err(|e| CliError::output(e.into()))?;
        writeln!(out).map_err(CliError::output)?;
    } else {
        let text = toml::to_string_pretty(&taxonomy)
            .map_err(|e| CliError::output(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        out.write_all(text.as_bytes()).map_err(CliError::output)?;
    }
    Ok(())
}

pub fn cmd_validate(path: &Path) -> Result<(), CliError> {
    let taxonomy = load_taxonomy(path)?;
    println!(
        "ok: {} (version {}, {} columns, {} aliases, {} tables)",
        path.display(),
        taxonomy.version,
        taxonomy.column_count(),
        taxonomy.aliases.len(),
        taxonomy.tables.len()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct ResolvedLabel {
    label: String,
    target: Option<String>,
    tier: Option<String>,
    method: MatchMethod,
}

fn resolve_all(taxonomy: &Taxonomy, labels: &[String], tables: bool) -> Vec<ResolvedLabel> {
    let resolver = ColumnResolver::new(taxonomy);
    labels
        .iter()
        .map(|label| {
            if tables {
                let r = resolver.resolve_table(label);
                ResolvedLabel {
                    label: label.clone(),
                    target: r.column.map(|i| taxonomy.tables[i].name.clone()),
                    tier: None,
                    method: r.method,
                }
            } else {
                let r = resolver.resolve(label);
                ResolvedLabel {
                    label: label.clone(),
                    target: r.column.map(|i| taxonomy.columns[i].name.clone()),
                    tier: r.column.map(|i| taxonomy.columns[i].tier.to_string()),
                    method: r.method,
                }
            }
        })
        .collect()
}

pub fn cmd_resolve(labels: &[String], tables: bool, path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let taxonomy = taxonomy_or_reference(path)?;
    let resolved = resolve_all(&taxonomy, labels, tables);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &resolved).map_err(|e| CliError::output(e.into()))?;
        writeln!(out).map_err(CliError::output)?;
    } else {
        render_resolved(&mut out, &resolved).map_err(CliError::output)?;
    }
    Ok(())
}

fn render_resolved(out: &mut impl Write, resolved: &[ResolvedLabel]) -> io::Result<()> {
    let label_w = column_width(resolved.iter().map(|r| r.label.as_str()), 6, 32);
    for r in resolved {
        match (&r.target, &r.tier) {
            (Some(target), Some(tier)) => {
                writeln!(out, "{}  -> {} [{}] ({})", pad_right(&r.label, label_w), target, tier, r.method)?
            }
            (Some(target), None) => writeln!(out, "{}  -> {} ({})", pad_right(&r.label, label_w), target, r.method)?,
            (None, _) => writeln!(out, "{}  unmapped", pad_right(&r.label, label_w))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_columns_with_tiers() {
        let taxonomy = Taxonomy::reference();
        let resolved = resolve_all(&taxonomy, &labels(&["负责人", "总完成进度", "备注"]), false);
        assert_eq!(resolved[0].target.as_deref(), Some("负责人"));
        assert_eq!(resolved[0].tier.as_deref(), Some("L1"));
        assert_eq!(resolved[0].method, MatchMethod::Exact);
        assert_eq!(resolved[1].target.as_deref(), Some("完成进度"));
        assert_eq!(resolved[1].method, MatchMethod::Alias);
        assert_eq!(resolved[2].target, None);
        assert_eq!(resolved[2].method, MatchMethod::Unmapped);
    }

    #[test]
    fn resolves_table_names() {
        let taxonomy = Taxonomy::reference();
        let resolved = resolve_all(&taxonomy, &labels(&["测试版本-小红书部门"]), true);
        assert_eq!(resolved[0].target.as_deref(), Some("小红书部门"));
        assert_eq!(resolved[0].tier, None);
    }

    #[test]
    fn listing_marks_unmapped_labels() {
        let taxonomy = Taxonomy::reference();
        let resolved = resolve_all(&taxonomy, &labels(&["负责人", "备注"]), false);
        let mut buf = Vec::new();
        render_resolved(&mut buf, &resolved).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "负责人  -> 负责人 [L1] (exact)\n备注    unmapped\n");
    }
}
