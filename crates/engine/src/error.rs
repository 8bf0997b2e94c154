use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DriftError {
    /// Snapshot without a single column label.
    EmptyHeader { side: String },
    /// Explicit key alignment requested, key column absent from a snapshot.
    MissingKeyColumn { side: String, column: String },
    /// Key column has an empty or repeated value.
    DuplicateKeys { side: String, column: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad breakpoints, unknown alias target, etc.).
    ConfigValidation(String),
    /// Table score whose column count does not fit the taxonomy.
    DimensionMismatch { table: String, expected: usize, found: usize },
    /// Table score naming a column outside the taxonomy.
    UnknownColumn { table: String, column: String },
    /// Table score listing the same canonical column twice.
    DuplicateColumn { table: String, column: String },
    /// Two table scores with the same name in one matrix.
    DuplicateTable(String),
}

impl fmt::Display for DriftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHeader { side } => write!(f, "{side} snapshot has an empty header row"),
            Self::MissingKeyColumn { side, column } => {
                write!(f, "{side} snapshot: key column '{column}' not found")
            }
            Self::DuplicateKeys { side, column, value } => {
                if value.is_empty() {
                    write!(f, "{side} snapshot: key column '{column}' has an empty value")
                } else {
                    write!(f, "{side} snapshot: key column '{column}' repeats value '{value}'")
                }
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DimensionMismatch { table, expected, found } => {
                write!(f, "table '{table}': expected {expected} canonical columns, found {found}")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "table '{table}': '{column}' is not a canonical column")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "table '{table}': column '{column}' listed more than once")
            }
            Self::DuplicateTable(name) => write!(f, "table '{name}' appears more than once"),
        }
    }
}

impl std::error::Error for DriftError {}

impl DriftError {
    /// Input errors are about the snapshots themselves, not configuration.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyHeader { .. } | Self::MissingKeyColumn { .. } | Self::DuplicateKeys { .. }
        )
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::ConfigValidation(_))
    }

    /// Table scores that do not fit the taxonomy.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::UnknownColumn { .. }
                | Self::DuplicateColumn { .. }
                | Self::DuplicateTable(_)
        )
    }
}
