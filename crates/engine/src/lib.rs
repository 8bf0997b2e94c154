//! `docdrift-engine` — drift heat engine.
//!
//! Pure engine crate: receives pre-loaded snapshots, returns modifications,
//! per-table heat vectors and the comprehensive score matrix.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod differ;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod model;
pub mod normalize;
pub mod resolver;
pub mod scoring;
pub mod taxonomy;

pub use aggregate::{Aggregator, RowCounts};
pub use differ::{diff, DiffOptions, DiffResult, DiffSummary, RowAlignment};
pub use engine::{run, ClusterOptions, RunOptions, RunOutput, TableInput};
pub use error::DriftError;
pub use matrix::MatrixBuilder;
pub use model::{ComprehensiveScoreMatrix, SourceFile, SourceRole, TableScore};
pub use normalize::equivalent;
pub use resolver::{ColumnResolver, MatchMethod, Resolution};
pub use scoring::{Breakpoint, ScoringConfig};
pub use taxonomy::Taxonomy;
