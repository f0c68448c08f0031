//! Error types for the rewrite operations.

use thiserror::Error;

use crate::parser::ParseError;

/// Which merge fragment an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// The JOIN fragment.
    Join,
    /// The WHERE fragment.
    Where,
}

impl FragmentKind {
    /// Returns the clause name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::Where => "WHERE",
        }
    }
}

/// Errors returned by the rewrite operations.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Empty or whitespace-only SQL.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The statement could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The operation does not apply to this statement.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A JOIN or WHERE fragment could not be used.
    #[error("invalid {} fragment `{fragment}`: {reason}", .kind.as_str())]
    Fragment {
        kind: FragmentKind,
        fragment: String,
        reason: String,
    },
}

/// Errors of the merge operation.
pub type MergeError = RewriteError;

/// Result type alias for rewrite operations.
pub type Result<T> = std::result::Result<T, RewriteError>;
