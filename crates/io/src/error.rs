use std::fmt;
use std::path::PathBuf;

use docdrift_engine::DriftError;

#[derive(Debug)]
pub enum IoError {
    /// Input file does not exist.
    NotFound(PathBuf),
    /// File exists but could not be read.
    Read { path: PathBuf, message: String },
    /// Malformed CSV or JSON content.
    Parse { path: PathBuf, message: String },
    /// Extension not handled by the loader.
    UnsupportedFormat(PathBuf),
    /// No header row, or a header row without a single label.
    EmptyHeader(PathBuf),
    /// Batch or taxonomy file that does not parse or validate.
    Config { path: Option<PathBuf>, message: String },
    Write { path: PathBuf, message: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "{}: file not found", path.display()),
            Self::Read { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "{}: parse error: {message}", path.display()),
            Self::UnsupportedFormat(path) => {
                write!(f, "{}: unsupported format (expected .csv, .tsv, .txt or .json)", path.display())
            }
            Self::EmptyHeader(path) => write!(f, "{}: no header row found", path.display()),
            Self::Config { path: Some(path), message } => write!(f, "{}: {message}", path.display()),
            Self::Config { path: None, message } => write!(f, "{message}"),
            Self::Write { path, message } => write!(f, "{}: write failed: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}

impl IoError {
    /// Errors about a snapshot file itself.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Read { .. }
                | Self::Parse { .. }
                | Self::UnsupportedFormat(_)
                | Self::EmptyHeader(_)
        )
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub(crate) fn config(path: Option<PathBuf>, err: DriftError) -> Self {
        Self::Config {
            path,
            message: err.to_string(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Read {
                path,
                message: err.to_string(),
            }
        }
    }
}
