// docdrift CLI - drift heat scoring for recurring spreadsheet exports

mod cluster;
mod diff;
mod exit_codes;
mod logging;
mod score;
mod taxonomy;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use docdrift_cluster::StrategyKind;
use docdrift_engine::DriftError;
use docdrift_io::{HeaderRow, IoError, LoadOptions};

use exit_codes::{drift_exit_code, io_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "docdrift")]
#[command(about = "Score how much recurring spreadsheet exports drift, column by column")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). Overrides DOCDRIFT_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two snapshots of one table and list the modified cells
    #[command(after_help = "\
Examples:
  docdrift diff week36.csv week37.csv
  docdrift diff week36.csv week37.csv --key 序号 --json
  docdrift diff old.json new.json --positional

Exit codes: 0 identical, 1 modifications found, 3 unreadable input.")]
    Diff {
        baseline: PathBuf,
        target: PathBuf,

        /// Align rows by this column (error if missing or not unique)
        #[arg(long, conflicts_with = "positional")]
        key: Option<String>,

        /// Align rows by position
        #[arg(long)]
        positional: bool,

        /// Print the modifications and summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// No summary on stderr
        #[arg(long, short)]
        quiet: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Run a batch: diff every table, score columns, build the comprehensive matrix
    #[command(after_help = "\
Examples:
  docdrift score batch.toml
  docdrift score batch.toml --output out/week37.json --cluster spectral
  docdrift score batch.toml --json | jq .statistics

Without --output the artifact is written next to the batch file as <name>.comprehensive.json
(unless --json sends it to stdout).")]
    Score {
        batch: PathBuf,

        /// Artifact path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the artifact as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Reorder the matrix (identity, barycenter, heat_signature, spectral, hierarchical); overrides [cluster]
        #[arg(long)]
        cluster: Option<StrategyKind>,

        /// Fixed metadata timestamp (reproducible artifacts)
        #[arg(long)]
        timestamp: Option<String>,

        #[arg(long, short)]
        quiet: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Reorder the heat matrix of an existing artifact
    #[command(after_help = "\
Examples:
  docdrift cluster week37.json
  docdrift cluster week37.json --strategy spectral --json
  docdrift cluster week37.json --strategy barycenter --output week37.json")]
    Cluster {
        artifact: PathBuf,

        #[arg(long, default_value_t = StrategyKind::default())]
        strategy: StrategyKind,

        /// Adjacent-swap refinement passes
        #[arg(long, default_value_t = 8)]
        max_passes: usize,

        /// Heat treated as "unchanged"
        #[arg(long, default_value_t = 0.05)]
        floor: f64,

        /// Write the artifact back with `cluster_ordering` filled in
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the reordered matrix as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Inspect, validate and query column taxonomies
    #[command(subcommand)]
    Taxonomy(TaxonomyCommands),
}

#[derive(Subcommand)]
enum TaxonomyCommands {
    /// Print a taxonomy (the reference one by default)
    Show {
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Check a taxonomy file
    Validate { file: PathBuf },

    /// Resolve column labels (or table names) through the matching cascade
    #[command(after_help = "\
Examples:
  docdrift taxonomy resolve 负责人 总完成进度 'Owner (assignee)'
  docdrift taxonomy resolve --table 副本-出国销售计划表-工作表1")]
    Resolve {
        #[arg(required = true)]
        labels: Vec<String>,

        /// Resolve against the table registry instead of the columns
        #[arg(long)]
        table: bool,

        #[arg(long)]
        taxonomy: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

/// Snapshot parsing options shared by `diff` and `score`.
#[derive(Args, Debug, Clone)]
struct LoadArgs {
    /// Field delimiter for CSV/TXT (sniffed by default)
    #[arg(long)]
    delimiter: Option<char>,

    /// 1-based header row (auto-detected by default; skips a one-cell title row)
    #[arg(long)]
    header_row: Option<usize>,
}

impl LoadArgs {
    fn to_options(&self) -> Result<LoadOptions, CliError> {
        let delimiter = match self.delimiter {
            None => None,
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => return Err(CliError::args(format!("delimiter must be a single ASCII character, got '{c}'"))),
        };
        let header = match self.header_row {
            None => HeaderRow::Auto,
            Some(0) => return Err(CliError::args("--header-row is 1-based")),
            Some(n) => HeaderRow::Row(n),
        };
        Ok(LoadOptions { delimiter, header })
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:     docdrift-engine ", env!("CARGO_PKG_VERSION"),
            "\nstrategies: identity, barycenter, heat_signature, spectral, hierarchical",
            "\nbuild:      debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:     docdrift-engine ", env!("CARGO_PKG_VERSION"),
            "\nstrategies: identity, barycenter, heat_signature, spectral, hierarchical",
            "\nbuild:      release",
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Diff {
            baseline,
            target,
            key,
            positional,
            json,
            quiet,
            load,
        } => load
            .to_options()
            .and_then(|options| diff::cmd_diff(&baseline, &target, key, positional, json, quiet, &options)),
        Commands::Score {
            batch,
            output,
            json,
            cluster,
            timestamp,
            quiet,
            load,
        } => load
            .to_options()
            .and_then(|options| score::cmd_score(&batch, output, json, cluster, timestamp, quiet, &options)),
        Commands::Cluster {
            artifact,
            strategy,
            max_passes,
            floor,
            output,
            json,
        } => cluster::cmd_cluster(&artifact, strategy, max_passes, floor, output, json),
        Commands::Taxonomy(command) => match command {
            TaxonomyCommands::Show { taxonomy, json } => taxonomy::cmd_show(taxonomy, json),
            TaxonomyCommands::Validate { file } => taxonomy::cmd_validate(&file),
            TaxonomyCommands::Resolve {
                labels,
                table,
                taxonomy,
                json,
            } => taxonomy::cmd_resolve(&labels, table, taxonomy, json),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Writing to stdout failed.
    pub fn output(err: std::io::Error) -> Self {
        Self { code: EXIT_ERROR, message: err.to_string(), hint: None }
    }

    /// Exit with `code` and no message (e.g. `diff` found modifications).
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<DriftError> for CliError {
    fn from(err: DriftError) -> Self {
        let hint = match &err {
            DriftError::MissingKeyColumn { .. } => Some("check --key against the header, or use --positional"),
            DriftError::DuplicateKeys { .. } => Some("key values must be unique and non-empty; use --positional"),
            DriftError::EmptyHeader { .. } => Some("use --header-row to point at the header"),
            _ => None,
        };
        Self {
            code: drift_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::NotFound(_) => Some("relative paths in a batch file resolve against the batch file's directory"),
            IoError::EmptyHeader(_) => Some("use --header-row to point at the header"),
            IoError::UnsupportedFormat(_) => Some("export the sheet as CSV first"),
            _ => None,
        };
        Self {
            code: io_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}
