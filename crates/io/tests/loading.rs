// Loader and batch behaviour against real files.
//
// Run with: cargo test -p docdrift-io --test loading

use std::path::{Path, PathBuf};

use docdrift_core::ChangeKind;
use docdrift_engine::{diff, run, DiffOptions, RunOptions, SourceRole};
use docdrift_io::{load_snapshot, read_matrix, write_json, BatchConfig, HeaderRow, IoError, LoadOptions};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

// ===========================================================================
// Snapshots
// ===========================================================================

#[test]
fn export_with_title_row() {
    let snap = load_snapshot(&fixtures_dir().join("batch/outbound_baseline.csv"), &LoadOptions::default()).unwrap();
    assert_eq!(snap.columns, vec!["序号", "负责人", "重要程度", "完成进度", "备注"]);
    assert_eq!(snap.row_count(), 3);
    assert_eq!(snap.first_data_row, 3);
    assert_eq!(snap.value(1, "备注"), "加急");
}

#[test]
fn explicit_header_row_keeps_the_title() {
    let options = LoadOptions {
        header: HeaderRow::First,
        ..LoadOptions::default()
    };
    let snap = load_snapshot(&fixtures_dir().join("batch/outbound_baseline.csv"), &options).unwrap();
    assert_eq!(snap.columns[0], "出国销售计划表");
    assert_eq!(snap.columns[1], "Column B");
    assert_eq!(snap.row_count(), 4);
}

#[test]
fn gbk_export_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let (bytes, _, _) = encoding_rs::GBK.encode("序号,负责人\n1,张三\n");
    assert!(std::str::from_utf8(&bytes).is_err());
    let path = write(dir.path(), "gbk.csv", &bytes);

    let snap = load_snapshot(&path, &LoadOptions::default()).unwrap();
    assert_eq!(snap.columns, vec!["序号", "负责人"]);
    assert_eq!(snap.value(0, "负责人"), "张三");
}

#[test]
fn utf8_bom_is_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bom.csv", "\u{feff}id;name\n1;a\n".as_bytes());
    let snap = load_snapshot(&path, &LoadOptions::default()).unwrap();
    assert_eq!(snap.columns, vec!["id", "name"]);
}

#[test]
fn explicit_delimiter_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "pipes.txt", b"a|b,c\n1|2,3\n");
    let options = LoadOptions {
        delimiter: Some(b','),
        ..LoadOptions::default()
    };
    let snap = load_snapshot(&path, &options).unwrap();
    assert_eq!(snap.columns, vec!["a|b", "c"]);
}

#[test]
fn json_records() {
    let snap = load_snapshot(&fixtures_dir().join("records.json"), &LoadOptions::default()).unwrap();
    assert_eq!(snap.columns, vec!["序号", "负责人", "完成进度"]);
    // the all-blank record is dropped
    assert_eq!(snap.row_count(), 2);
    assert_eq!(snap.value(0, "完成进度"), "30");
    assert_eq!(snap.value(1, "完成进度"), "");
}

#[test]
fn missing_file_is_not_found() {
    let err = load_snapshot(Path::new("/nonexistent/docdrift/a.csv"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::NotFound(_)));
    assert!(err.is_input());
}

#[test]
fn empty_files_have_no_header() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "empty.csv", b"");
    let blank = write(dir.path(), "blank.csv", b",,\n,,\n");
    let json = write(dir.path(), "empty.json", b"[]");
    for path in [csv, blank, json] {
        let err = load_snapshot(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::EmptyHeader(_)), "{}: {err}", path.display());
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.json", b"[{\"a\": ");
    let err = load_snapshot(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::Parse { .. }));
}

#[test]
fn loaded_snapshots_diff_with_sheet_addresses() {
    let base = load_snapshot(&fixtures_dir().join("batch/outbound_baseline.csv"), &LoadOptions::default()).unwrap();
    let target = load_snapshot(&fixtures_dir().join("batch/outbound_target.csv"), &LoadOptions::default()).unwrap();
    let result = diff(&base, &target, &DiffOptions::default()).unwrap();
    assert_eq!(result.modifications.len(), 3);
    assert!(result.modifications.iter().all(|m| m.kind == ChangeKind::ContentChanged));
    assert_eq!(result.modifications[0].column, "完成进度");
    assert_eq!(result.modifications[0].cell, "D3");
    assert_eq!(result.modifications[1].column, "负责人");
    assert_eq!(result.modifications[1].cell, "B4");
}

#[test]
fn cells_after_a_blank_line_keep_their_address() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.csv", "序号,负责人\n1,张三\n\n2,李四\n".as_bytes());
    let target = write(dir.path(), "target.csv", "序号,负责人\n1,张三\n\n2,赵六\n".as_bytes());
    let base = load_snapshot(&base, &LoadOptions::default()).unwrap();
    let target = load_snapshot(&target, &LoadOptions::default()).unwrap();
    assert_eq!(base.row_count(), 2);

    let result = diff(&base, &target, &DiffOptions::default()).unwrap();
    assert_eq!(result.modifications.len(), 1);
    assert_eq!(result.modifications[0].cell, "B4");
}

// ===========================================================================
// Batches
// ===========================================================================

#[test]
fn batch_end_to_end() {
    let config = BatchConfig::load(&fixtures_dir().join("batch/batch.toml")).unwrap();
    let taxonomy = config.load_taxonomy().unwrap();
    let scoring = config.scoring(&taxonomy);
    let tables = config.load_tables(&LoadOptions::default()).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1].baseline.columns[0], "编号");

    let options = RunOptions {
        diff: config.diff_options(),
        cluster: config.cluster_options(),
        timestamp: Some("2025-09-15T00:00:00Z".into()),
    };
    let out = run(&taxonomy, &scoring, &tables, &options).unwrap();
    let m = &out.matrix;

    assert_eq!(m.table_names, vec!["出国销售计划表", "小红书部门"]);
    assert_eq!(m.metadata.source_files.len(), 4);
    assert_eq!(m.metadata.source_files[0].role, SourceRole::Baseline);
    assert!(m.metadata.source_files.iter().all(|s| s.sha256.len() == 64));
    assert_eq!(m.statistics.total_cells, 3 * 19 + 3 * 19);
    assert_eq!(m.statistics.modified_cells, 8);
    assert_eq!(m.cluster_ordering.as_ref().unwrap().strategy, "barycenter");

    let col = |name: &str| m.column_names.iter().position(|c| c == name).unwrap();
    assert_eq!(m.heatmap_data.matrix[0][col("负责人")], 0.30);
    assert_eq!(m.heatmap_data.matrix[0][col("完成进度")], 0.30);
    assert_eq!(m.heatmap_data.matrix[1][col("序号")], 0.30);
    assert_eq!(m.heatmap_data.matrix[1][col("最新复盘时间")], 0.60);
    assert_eq!(out.table_scores[0].unmapped_columns, vec!["备注".to_string()]);

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("comprehensive.json");
    write_json(&artifact, m).unwrap();
    let back = read_matrix(&artifact).unwrap();
    assert_eq!(back.table_names, m.table_names);
    assert_eq!(back.metadata.source_files, m.metadata.source_files);
    assert_eq!(back.column_modifications_by_table, m.column_modifications_by_table);
    for (a, b) in back.matrix().iter().flatten().zip(m.matrix().iter().flatten()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn batch_with_missing_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", b"id,v\n1,x\n");
    let batch = write(
        dir.path(),
        "batch.toml",
        b"name = \"n\"\n[[tables]]\nname = \"t\"\nbaseline = \"a.csv\"\ntarget = \"b.csv\"\n",
    );
    let config = BatchConfig::load(&batch).unwrap();
    let err = config.load_tables(&LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::NotFound(ref p) if p.ends_with("b.csv")));
}

#[test]
fn batch_with_taxonomy_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut taxonomy = docdrift_engine::Taxonomy::reference();
    taxonomy.version = "custom-2".into();
    taxonomy.scoring = Some(docdrift_engine::ScoringConfig {
        floor: 0.0,
        ..Default::default()
    });
    write(dir.path(), "tax.toml", toml::to_string(&taxonomy).unwrap().as_bytes());
    let batch = write(
        dir.path(),
        "batch.toml",
        b"name = \"n\"\ntaxonomy = \"tax.toml\"\n[[tables]]\nname = \"t\"\nbaseline = \"a.csv\"\ntarget = \"b.csv\"\n",
    );

    let config = BatchConfig::load(&batch).unwrap();
    let loaded = config.load_taxonomy().unwrap();
    assert_eq!(loaded.version, "custom-2");
    assert_eq!(config.scoring(&loaded).floor, 0.0);
}

#[test]
fn unreadable_batch_is_a_config_error() {
    let err = BatchConfig::load(Path::new("/nonexistent/docdrift/batch.toml")).unwrap_err();
    assert!(err.is_config());
    assert!(!err.is_input());
}
