use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if this error is a remote read fault
    pub fn is_read_fault(&self) -> bool {
        matches!(self, Error::MemoryReadFailed { .. })
    }

    pub(crate) fn read_failed(address: u64, message: impl Into<String>) -> Self {
        Error::MemoryReadFailed {
            address,
            message: message.into(),
        }
    }
}

/// Offset schema could not be resolved from its source documents.
///
/// Resolution never stops at the first problem: every missing or mistyped
/// path is collected so the whole document can be fixed in one pass.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to parse {document}: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Offset schema unresolved: {}", format_issues(.0))]
    Unresolved(Vec<SchemaIssue>),

    #[error("Persisted offset schema is invalid (zero global offsets)")]
    Invalid,
}

/// A single path that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    Missing(String),
    NotANumber(String),
}

impl SchemaIssue {
    pub fn path(&self) -> &str {
        match self {
            SchemaIssue::Missing(path) | SchemaIssue::NotANumber(path) => path,
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaIssue::Missing(path) => write!(f, "missing '{}'", path),
            SchemaIssue::NotANumber(path) => write!(f, "'{}' is not a plain number", path),
        }
    }
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_read_fault_classification() {
        assert!(Error::read_failed(0x1000, "unmapped").is_read_fault());
        assert!(!Error::ProcessNotFound("cs2.exe".to_string()).is_read_fault());
    }

    #[test]
    fn test_unresolved_lists_every_path() {
        let err = SchemaError::Unresolved(vec![
            SchemaIssue::Missing("client.dll.dwViewMatrix".to_string()),
            SchemaIssue::NotANumber("client.dll.classes.C_BaseEntity.fields.m_iHealth".to_string()),
        ]);
        let message = err.to_string();
        assert!(message.contains("missing 'client.dll.dwViewMatrix'"));
        assert!(message.contains("m_iHealth' is not a plain number"));
    }
}
