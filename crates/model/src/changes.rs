use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Edit,
    Delete,
    Any,
}

impl ChangeType {
    /// Map a provider file status (`added`, `removed`, `modified`, ...) onto
    /// a change type. Unknown statuses (`renamed`, `changed`, ...) count as
    /// edits.
    pub fn from_status(status: &str) -> Self {
        match status {
            "added" => Self::Add,
            "removed" => Self::Delete,
            _ => Self::Edit,
        }
    }
}

/// One file touched by the commit range or pull request being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub file: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl ChangedFile {
    pub fn new(file: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            file: file.into(),
            change_type,
            patch: None,
        }
    }

    pub fn edited(file: impl Into<String>) -> Self {
        Self::new(file, ChangeType::Edit)
    }
}
