use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    ContentChanged,
    RowAdded,
    RowDeleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::ContentChanged => "content_changed",
            ChangeKind::RowAdded => "row_added",
            ChangeKind::RowDeleted => "row_deleted",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic change between baseline and target.
///
/// `column` is the raw label as found in the source snapshot, never the
/// canonical name. `row` is the 0-based record index: baseline side for
/// content changes and deletions, target side for additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub row: usize,
    pub column: String,
    pub old_value: String,
    pub new_value: String,
    pub kind: ChangeKind,
    /// A1 address of the cell in the snapshot the row index refers to.
    pub cell: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ChangeKind::RowAdded).unwrap();
        assert_eq!(json, "\"row_added\"");
        assert_eq!(ChangeKind::ContentChanged.to_string(), "content_changed");
    }
}
