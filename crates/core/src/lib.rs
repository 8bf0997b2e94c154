//! `docdrift-core` — shared types for the drift pipeline.
//!
//! Snapshots come in, modifications and tiers flow between the engine,
//! the IO collaborators and the CLI. No logic beyond addressing lives here.

pub mod cell;
pub mod modification;
pub mod snapshot;
pub mod tier;

pub use modification::{ChangeKind, Modification};
pub use snapshot::{Record, Snapshot};
pub use tier::RiskTier;
