//! Token types for the SQL lexer.

use super::Span;

/// Declares the reserved words once; the enum, its spelling and the
/// lookup table are generated from the same list.
macro_rules! keywords {
    ($($group:literal => { $($variant:ident = $text:literal),+ $(,)? })+) => {
        /// Reserved SQL keywords.
        ///
        /// Only words that carry grammar structure are reserved. Everything
        /// else (`count`, `date`, `status`, `key`, ...) lexes as an
        /// identifier so it can name a column, table or function.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Keyword {
            $($(
                #[doc = concat!("`", $text, "` (", $group, ")")]
                $variant,
            )+)+
        }

        impl Keyword {
            /// Every keyword paired with its upper-case spelling, sorted by
            /// spelling.
            const TABLE: &'static [(&'static str, Self)] = &sorted_table([
                $($(($text, Self::$variant),)+)+
            ]);

            /// The upper-case spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($(Self::$variant => $text,)+)+
                }
            }
        }
    };
}

keywords! {
    "query" => {
        Select = "SELECT", From = "FROM", Where = "WHERE", Order = "ORDER", By = "BY",
        Group = "GROUP", Having = "HAVING", Limit = "LIMIT", Offset = "OFFSET",
        Distinct = "DISTINCT", All = "ALL", With = "WITH", Recursive = "RECURSIVE",
        Union = "UNION",
    }
    "join" => {
        Join = "JOIN", Inner = "INNER", Left = "LEFT", Right = "RIGHT", Full = "FULL",
        Outer = "OUTER", Cross = "CROSS", On = "ON", Using = "USING",
    }
    "dml" => {
        Insert = "INSERT", Into = "INTO", Values = "VALUES", Update = "UPDATE", Set = "SET",
        Delete = "DELETE",
    }
    "ddl, rejected" => {
        Create = "CREATE", Drop = "DROP", Alter = "ALTER", Truncate = "TRUNCATE",
    }
    "predicate" => {
        And = "AND", Or = "OR", Not = "NOT", In = "IN", Between = "BETWEEN", Like = "LIKE",
        Is = "IS", Null = "NULL", True = "TRUE", False = "FALSE", Exists = "EXISTS",
    }
    "ordering" => {
        Asc = "ASC", Desc = "DESC",
    }
    "expression" => {
        As = "AS", Case = "CASE", When = "WHEN", Then = "THEN", Else = "ELSE", End = "END",
        Cast = "CAST",
    }
}

/// Byte-wise `a < b` usable in const context.
const fn str_less(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut i = 0;
    while i < a.len() && i < b.len() {
        if a[i] != b[i] {
            return a[i] < b[i];
        }
        i += 1;
    }
    a.len() < b.len()
}

/// Insertion sort of the keyword table at compile time.
const fn sorted_table<const N: usize>(
    mut table: [(&'static str, Keyword); N],
) -> [(&'static str, Keyword); N] {
    let mut i = 1;
    while i < N {
        let mut j = i;
        while j > 0 && str_less(table[j].0, table[j - 1].0) {
            let tmp = table[j];
            table[j] = table[j - 1];
            table[j - 1] = tmp;
            j -= 1;
        }
        i += 1;
    }
    table
}

impl Keyword {
    /// Looks a word up case-insensitively; `None` for non-reserved words.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        // No keyword is longer than this; longer words skip the allocation.
        if word.len() > 9 {
            return None;
        }
        let upper = word.to_ascii_uppercase();
        Self::TABLE
            .binary_search_by(|(text, _)| (*text).cmp(upper.as_str()))
            .ok()
            .map(|i| Self::TABLE[i].1)
    }

    /// Returns true for keywords that introduce a data-definition statement.
    #[must_use]
    pub const fn is_ddl(&self) -> bool {
        matches!(self, Self::Create | Self::Drop | Self::Alter | Self::Truncate)
    }
}

/// The kind of token.
///
/// Literal and identifier payloads hold the exact source spelling,
/// including quotes and escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal (e.g., `42`, `3.14`, `1e10`, `0x1F`)
    Number(String),
    /// String literal (e.g., `'it''s'`, `X'1F'`)
    String(String),

    // Identifiers and keywords
    /// Identifier, bare or quoted (e.g., `users`, `` `order` ``, `"Name"`)
    Identifier(String),
    /// Reserved SQL keyword
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// !=
    NotEq,
    /// <>
    LtGt,
    /// <=>
    NullSafeEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// ?
    Question,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::lookup("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("select"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("SeLeCt"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("status"), None);
    }

    #[test]
    fn test_common_column_names_are_not_reserved() {
        for word in ["count", "date", "key", "text", "name", "status", "value"] {
            assert_eq!(Keyword::lookup(word), None, "{word} should not be reserved");
        }
    }

    #[test]
    fn test_every_keyword_round_trips() {
        assert!(Keyword::TABLE.windows(2).all(|w| w[0].0 < w[1].0));
        for (text, kw) in Keyword::TABLE {
            assert_eq!(kw.as_str(), *text);
            assert_eq!(Keyword::lookup(&text.to_lowercase()), Some(*kw));
        }
    }

    #[test]
    fn test_ddl_keywords() {
        assert!(Keyword::Create.is_ddl());
        assert!(Keyword::Truncate.is_ddl());
        assert!(!Keyword::Delete.is_ddl());
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6));
        let plus = Token::new(TokenKind::Plus, Span::new(0, 1));
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
        assert!(!select.is_eof());
    }
}
