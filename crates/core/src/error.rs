use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Errors raised while loading or validating the question catalog.
///
/// All variants are fatal at startup: a process with a malformed catalog has
/// nothing useful to ask, so the service refuses to come up rather than
/// discovering the problem mid-conversation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read questions file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed questions document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no questions resolved from the document")]
    Empty,
    #[error("question '{label}' depends on unknown label '{dependency}'")]
    UnknownDependency { label: String, dependency: String },
    #[error("dependency cycle detected involving: {0}")]
    DependencyCycle(String),
}

/// Outcome of handing answers to the persistence sink for one turn.
///
/// Persistence failure is deliberately a status flag, never an error: the
/// in-memory session remains authoritative and the conversation continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Failed,
    NoUserKey,
    NothingToSave,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved => write!(f, "saved"),
            SaveStatus::Failed => write!(f, "failed"),
            SaveStatus::NoUserKey => write!(f, "no_user_key"),
            SaveStatus::NothingToSave => write!(f, "nothing_to_save"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::UnknownDependency {
            label: "BA_1".to_string(),
            dependency: "ZZ_9".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "question 'BA_1' depends on unknown label 'ZZ_9'"
        );

        let err = CatalogError::Empty;
        assert_eq!(format!("{}", err), "no questions resolved from the document");
    }

    #[test]
    fn test_save_status_display_and_serde() {
        assert_eq!(format!("{}", SaveStatus::Saved), "saved");
        assert_eq!(format!("{}", SaveStatus::NoUserKey), "no_user_key");

        let json = serde_json::to_string(&SaveStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
        let back: SaveStatus = serde_json::from_str("\"nothing_to_save\"").unwrap();
        assert_eq!(back, SaveStatus::NothingToSave);
    }
}
