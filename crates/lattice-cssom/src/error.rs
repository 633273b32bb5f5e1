//! Error types for the object model.

use std::path::PathBuf;

/// Result type alias for CSSOM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by strict, single-unit operations.
///
/// Bulk stylesheet parsing never produces these; its problems are recovered
/// locally and reported as [`crate::parser::ParseError`] diagnostics instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Text does not parse as the requested grammar unit.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// A rule list index is out of range.
    #[error("Index {index} is out of range for a rule list of length {length}")]
    Index { index: usize, length: usize },

    /// The rule is not allowed at the requested position.
    #[error("Hierarchy error: {message}")]
    Hierarchy { message: String },

    /// The requested item is not present.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// File I/O error.
    #[error("Failed to read stylesheet '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create an index error.
    pub fn index(index: usize, length: usize) -> Self {
        Self::Index { index, length }
    }

    /// Create a hierarchy error.
    pub fn hierarchy(message: impl Into<String>) -> Self {
        Self::Hierarchy {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a [`Error::Syntax`].
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// Whether this is a [`Error::Index`].
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index { .. })
    }

    /// Whether this is a [`Error::Hierarchy`].
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, Self::Hierarchy { .. })
    }

    /// Whether this is a [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::index(4, 2).to_string(),
            "Index 4 is out of range for a rule list of length 2"
        );
        assert_eq!(
            Error::not_found("medium 'print'").to_string(),
            "Not found: medium 'print'"
        );
    }

    #[test]
    fn error_kinds() {
        assert!(Error::syntax("x").is_syntax());
        assert!(Error::hierarchy("x").is_hierarchy());
        assert!(!Error::hierarchy("x").is_syntax());
        assert!(Error::index(0, 0).is_index());
        assert!(Error::not_found("x").is_not_found());
    }
}
