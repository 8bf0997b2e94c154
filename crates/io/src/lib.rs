//! `docdrift-io` — file-side collaborator for the drift engine.
//!
//! Loads CSV/TSV/JSON snapshots, parses batch and taxonomy files,
//! fingerprints inputs and writes the comprehensive score artifact.

pub mod artifact;
pub mod batch;
pub mod csv;
pub mod error;
pub mod json;
pub mod snapshot;

pub use artifact::{fingerprint, read_matrix, write_json};
pub use batch::{load_taxonomy, AlignmentMode, BatchConfig};
pub use error::IoError;
pub use snapshot::{load_snapshot, HeaderRow, LoadOptions};
