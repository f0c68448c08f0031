//! Parser error types.

use crate::lexer::{Span, TokenKind};

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not follow the grammar.
    Syntax,
    /// A clause that defines the statement (FROM, INTO/VALUES, SET) is absent.
    MissingClause,
    /// A statement kind the toolkit deliberately rejects (DDL).
    UnsupportedStatement,
    /// Subqueries, parentheses or unary operators nest deeper, or an
    /// operator chain runs longer, than the configured limits.
    TooDeep,
    /// A string literal, quoted identifier or block comment is not closed.
    Unterminated,
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {}..{}", .span.start, .span.end)]
pub struct ParseError {
    /// Error category.
    pub kind: ParseErrorKind,
    /// The error message.
    pub message: String,
    /// The location of the error in the cleaned SQL text.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new syntax error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if matches!(found, TokenKind::Eof) {
            return Self::unexpected_eof(expected, span);
        }
        let expected: String = expected.into();
        Self {
            kind: ParseErrorKind::Syntax,
            message: format!("Unexpected token: expected {expected}, found {found:?}"),
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }

    /// Creates an "unexpected end of input" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        let expected: String = expected.into();
        Self {
            kind: ParseErrorKind::Syntax,
            message: format!("Unexpected end of input: expected {expected}"),
            span,
            expected: Some(expected),
            found: Some(TokenKind::Eof),
        }
    }

    /// Creates an error for a missing statement-defining clause.
    #[must_use]
    pub fn missing_clause(clause: &str, statement: &str, found: TokenKind, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::MissingClause,
            message: format!("{statement} statement requires a {clause} clause"),
            span,
            expected: Some(clause.to_string()),
            found: Some(found),
        }
    }

    /// Creates an error for a statement kind that is recognized but rejected.
    #[must_use]
    pub fn unsupported_statement(keyword: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::UnsupportedStatement,
            message: format!("{keyword} statements are not supported"),
            span,
            expected: Some(String::from("SELECT, INSERT, UPDATE, or DELETE")),
            found: None,
        }
    }

    /// Creates an error for nesting beyond `max_depth`.
    #[must_use]
    pub fn too_deep(max_depth: usize, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::TooDeep,
            message: format!("Nesting exceeds the maximum depth of {max_depth}"),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an error for an operator chain longer than `max_terms`.
    #[must_use]
    pub fn too_long(max_terms: usize, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::TooDeep,
            message: format!("Operator chain exceeds the maximum of {max_terms} operands"),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an error for an unclosed literal or comment.
    #[must_use]
    pub fn unterminated(what: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Unterminated,
            message: format!("Unterminated {what}"),
            span,
            expected: None,
            found: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::new("boom", Span::new(3, 7));
        assert_eq!(err.to_string(), "boom at position 3..7");
    }

    #[test]
    fn test_unexpected_eof_is_detected() {
        let err = ParseError::unexpected("FROM", TokenKind::Eof, Span::new(9, 9));
        assert!(err.message.starts_with("Unexpected end of input"));
        assert_eq!(err.found, Some(TokenKind::Eof));
    }

    #[test]
    fn test_kinds() {
        let span = Span::default();
        assert_eq!(
            ParseError::unsupported_statement("CREATE", span).kind,
            ParseErrorKind::UnsupportedStatement
        );
        assert_eq!(ParseError::too_deep(4, span).kind, ParseErrorKind::TooDeep);
        assert_eq!(
            ParseError::missing_clause("FROM", "SELECT", TokenKind::Eof, span).kind,
            ParseErrorKind::MissingClause
        );
    }
}
