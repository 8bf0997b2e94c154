//! Batch config files.
//!
//! ```toml
//! name = "week-37"
//! taxonomy = "taxonomy.toml"        # optional, reference taxonomy otherwise
//!
//! [scoring]                         # optional, overrides the taxonomy's
//! floor = 0.05
//!
//! [alignment]
//! mode = "key"                      # auto | key | positional
//! key_column = "序号"
//!
//! [cluster]
//! strategy = "spectral"
//!
//! [[tables]]
//! name = "出国销售计划表"
//! baseline = "baseline/outbound.csv"
//! target = "target/outbound.csv"
//! ```
//!
//! Relative paths resolve against the directory of the batch file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use docdrift_cluster::{ReorderOptions, StrategyKind};
use docdrift_engine::differ::default_key_candidates;
use docdrift_engine::{
    ClusterOptions, DiffOptions, RowAlignment, ScoringConfig, SourceFile, SourceRole, TableInput, Taxonomy,
};

use crate::artifact::fingerprint;
use crate::error::IoError;
use crate::snapshot::{load_snapshot, LoadOptions};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    #[default]
    Auto,
    Key,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentConfig {
    #[serde(default)]
    pub mode: AlignmentMode,
    #[serde(default)]
    pub key_column: Option<String>,
    /// Replaces the default identifier candidates for `auto`.
    #[serde(default)]
    pub key_candidates: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

fn default_max_passes() -> usize {
    ReorderOptions::default().max_passes
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    pub baseline: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub name: String,
    #[serde(default)]
    pub taxonomy: Option<PathBuf>,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub cluster: Option<ClusterConfig>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl BatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, IoError> {
        let config: BatchConfig = toml::from_str(input).map_err(|e| IoError::Config {
            path: None,
            message: format!("batch parse error: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a batch file; paths resolve next to it.
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let text = std::fs::read_to_string(path).map_err(|e| IoError::Config {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml(&text).map_err(|e| match e {
            IoError::Config { path: None, message } => IoError::Config {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IoError> {
        let invalid = |message: String| IoError::Config { path: None, message };

        if self.name.trim().is_empty() {
            return Err(invalid("batch name must not be empty".into()));
        }
        if self.tables.is_empty() {
            return Err(invalid("batch declares no [[tables]]".into()));
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(invalid("table name must not be empty".into()));
            }
            if !names.insert(table.name.as_str()) {
                return Err(invalid(format!("duplicate table '{}'", table.name)));
            }
            if table.baseline.as_os_str().is_empty() || table.target.as_os_str().is_empty() {
                return Err(invalid(format!("table '{}': baseline and target are required", table.name)));
            }
        }

        match (&self.alignment.mode, &self.alignment.key_column) {
            (AlignmentMode::Key, None) => {
                return Err(invalid("alignment mode 'key' requires key_column".into()));
            }
            (AlignmentMode::Key, Some(k)) if k.trim().is_empty() => {
                return Err(invalid("key_column must not be empty".into()));
            }
            _ => {}
        }
        if let Some(candidates) = &self.alignment.key_candidates {
            if candidates.is_empty() {
                return Err(invalid("key_candidates must not be empty".into()));
            }
        }

        if let Some(scoring) = &self.scoring {
            scoring.validate().map_err(|e| IoError::config(None, e))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl BatchConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The taxonomy file named by the batch, or the reference taxonomy.
    pub fn load_taxonomy(&self) -> Result<Taxonomy, IoError> {
        match &self.taxonomy {
            Some(path) => load_taxonomy(&self.resolve(path)),
            None => Ok(Taxonomy::reference()),
        }
    }

    /// Batch `[scoring]`, else the taxonomy's, else the defaults.
    pub fn scoring(&self, taxonomy: &Taxonomy) -> ScoringConfig {
        self.scoring
            .clone()
            .or_else(|| taxonomy.scoring.clone())
            .unwrap_or_default()
    }

    pub fn diff_options(&self) -> DiffOptions {
        let alignment = match self.alignment.mode {
            AlignmentMode::Auto => RowAlignment::Auto,
            AlignmentMode::Positional => RowAlignment::Positional,
            AlignmentMode::Key => RowAlignment::Key(self.alignment.key_column.clone().unwrap_or_default()),
        };
        DiffOptions {
            alignment,
            key_candidates: self
                .alignment
                .key_candidates
                .clone()
                .unwrap_or_else(default_key_candidates),
        }
    }

    pub fn cluster_options(&self) -> Option<ClusterOptions> {
        self.cluster.as_ref().map(|c| ClusterOptions {
            strategy: c.strategy,
            max_passes: c.max_passes,
        })
    }

    /// Load every table's snapshots in declaration order, fingerprinting
    /// each file for the artifact metadata.
    pub fn load_tables(&self, options: &LoadOptions) -> Result<Vec<TableInput>, IoError> {
        let mut inputs = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let baseline_path = self.resolve(&table.baseline);
            let target_path = self.resolve(&table.target);
            let baseline = load_snapshot(&baseline_path, options)?;
            let target = load_snapshot(&target_path, options)?;
            let sources = vec![
                source_file(&table.name, SourceRole::Baseline, &baseline_path)?,
                source_file(&table.name, SourceRole::Target, &target_path)?,
            ];
            inputs.push(TableInput {
                name: table.name.clone(),
                baseline,
                target,
                sources,
            });
        }
        log::info!("batch '{}': loaded {} table(s)", self.name, inputs.len());
        Ok(inputs)
    }
}

fn source_file(table: &str, role: SourceRole, path: &Path) -> Result<SourceFile, IoError> {
    Ok(SourceFile {
        table: table.to_string(),
        role,
        path: path.display().to_string(),
        sha256: fingerprint(path)?,
    })
}

/// Read and validate a taxonomy TOML file.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::Config {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    Taxonomy::from_toml(&text).map_err(|e| IoError::config(Some(path.to_path_buf()), e))
}
