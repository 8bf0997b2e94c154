//! CLI Exit Code Registry
//!
//! Single source of truth for `docdrift` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                      |
//! |------|--------------------------------------------------------------|
//! | 0    | Success                                                      |
//! | 1    | `diff` found modifications, or an unspecified failure        |
//! | 2    | Usage error (bad arguments)                                  |
//! | 3    | Input error (missing/unreadable snapshot, empty header)      |
//! | 4    | Configuration error (batch or taxonomy file)                 |
//! | 5    | Validation error (table scores that do not fit the taxonomy) |

use docdrift_engine::DriftError;
use docdrift_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Snapshots differ. Like `diff(1)`, exit 1 means "files differ."
pub const EXIT_CHANGES: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Snapshot missing, unreadable, malformed, or without a header;
/// key column missing or repeated under explicit key alignment.
pub const EXIT_INPUT: u8 = 3;

/// Batch or taxonomy file does not parse or validate.
pub const EXIT_CONFIG: u8 = 4;

/// Table scores that do not fit the taxonomy (dimension mismatch,
/// unknown or repeated column, repeated table).
pub const EXIT_VALIDATION: u8 = 5;

pub fn drift_exit_code(err: &DriftError) -> u8 {
    if err.is_input() {
        EXIT_INPUT
    } else if err.is_config() {
        EXIT_CONFIG
    } else if err.is_validation() {
        EXIT_VALIDATION
    } else {
        EXIT_ERROR
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    if err.is_input() {
        EXIT_INPUT
    } else if err.is_config() {
        EXIT_CONFIG
    } else {
        EXIT_ERROR
    }
}
