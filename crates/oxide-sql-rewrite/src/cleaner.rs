//! Comment- and quote-aware SQL text normalization.
//!
//! All functions here share one left-to-right scanner. Text inside string
//! literals and quoted identifiers is never altered, and comment markers
//! inside them are not comments.

use crate::lexer::{Keyword, Lexer, TokenKind};

/// Scanner state at a given point of the input.
///
/// A state other than [`ScanState::Normal`] or [`ScanState::LineComment`]
/// at end of input means a quote or block comment was left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Plain SQL text.
    Normal,
    /// Inside `'...'`.
    SingleQuote,
    /// Inside `"..."`.
    DoubleQuote,
    /// Inside `` `...` ``.
    Backtick,
    /// Inside `-- ...` up to the end of the line.
    LineComment,
    /// Inside `/* ... */` at the given nesting depth.
    BlockComment(usize),
}

impl ScanState {
    const fn quote(self) -> Option<char> {
        match self {
            Self::SingleQuote => Some('\''),
            Self::DoubleQuote => Some('"'),
            Self::Backtick => Some('`'),
            _ => None,
        }
    }
}

/// Cleaned text together with the state the scanner ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
    pub text: String,
    pub state: ScanState,
}

/// One unit of scanner output.
#[derive(Debug, Clone, Copy)]
enum Piece {
    /// A character of SQL text outside quotes and comments.
    Code(char),
    /// A character belonging to a quoted literal or identifier, quotes included.
    Quoted(char),
    /// A `--` comment (its text is not reported).
    LineComment,
    /// A closed `/* */` comment and the number of newlines it contained.
    BlockComment { newlines: usize },
}

/// Runs the scanner over `sql`, feeding every piece to `emit`.
fn scan(sql: &str, mut emit: impl FnMut(Piece)) -> ScanState {
    let chars: Vec<char> = sql.chars().collect();
    let mut state = ScanState::Normal;
    let mut backslashes = 0usize;
    let mut newlines = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            ScanState::Normal => match (c, next) {
                ('-', Some('-')) => {
                    emit(Piece::LineComment);
                    state = ScanState::LineComment;
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    state = ScanState::BlockComment(1);
                    newlines = 0;
                    i += 2;
                    continue;
                }
                ('\'', _) | ('"', _) | ('`', _) => {
                    state = match c {
                        '\'' => ScanState::SingleQuote,
                        '"' => ScanState::DoubleQuote,
                        _ => ScanState::Backtick,
                    };
                    backslashes = 0;
                    emit(Piece::Quoted(c));
                }
                _ => emit(Piece::Code(c)),
            },
            ScanState::SingleQuote | ScanState::DoubleQuote | ScanState::Backtick => {
                let quote = state.quote().unwrap_or('\'');
                // Backslash escapes apply to string quotes, not backticks.
                let escaped = quote != '`' && backslashes % 2 == 1;
                emit(Piece::Quoted(c));
                if c == quote && !escaped {
                    if next == Some(quote) {
                        emit(Piece::Quoted(quote));
                        i += 2;
                        backslashes = 0;
                        continue;
                    }
                    state = ScanState::Normal;
                }
                backslashes = if c == '\\' { backslashes + 1 } else { 0 };
            }
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Normal;
                    emit(Piece::Code(c));
                }
            }
            ScanState::BlockComment(depth) => match (c, next) {
                ('/', Some('*')) => {
                    state = ScanState::BlockComment(depth + 1);
                    i += 2;
                    continue;
                }
                ('*', Some('/')) => {
                    if depth == 1 {
                        emit(Piece::BlockComment { newlines });
                        state = ScanState::Normal;
                    } else {
                        state = ScanState::BlockComment(depth - 1);
                    }
                    i += 2;
                    continue;
                }
                ('\n', _) => newlines += 1,
                _ => {}
            },
        }
        i += 1;
    }

    state
}

/// Cleans `sql` and reports the state the scanner ended in.
///
/// Comments become whitespace, whitespace runs collapse to one space, the
/// ends are trimmed, and a trailing run of `;` terminators is removed.
#[must_use]
pub fn scan_clean(sql: &str) -> Scanned {
    let mut text = String::with_capacity(sql.len());
    let mut pending_space = false;

    let state = scan(sql, |piece| match piece {
        Piece::Code(c) if c.is_whitespace() => pending_space = true,
        Piece::LineComment | Piece::BlockComment { .. } => pending_space = true,
        Piece::Code(c) | Piece::Quoted(c) => {
            if pending_space && !text.is_empty() {
                text.push(' ');
            }
            pending_space = false;
            text.push(c);
        }
    });

    if state == ScanState::Normal || state == ScanState::LineComment {
        loop {
            let trimmed = text.trim_end();
            match trimmed.strip_suffix(';') {
                Some(rest) => {
                    let len = rest.len();
                    text.truncate(len);
                }
                None => {
                    let len = trimmed.len();
                    text.truncate(len);
                    break;
                }
            }
        }
    }

    Scanned { text, state }
}

/// Strips comments, collapses whitespace and drops trailing terminators.
///
/// # Example
///
/// ```rust
/// use oxide_sql_rewrite::clean_sql;
///
/// assert_eq!(
///     clean_sql("SELECT *  -- everything\n FROM t /* x */ WHERE a = '--';"),
///     "SELECT * FROM t WHERE a = '--'"
/// );
/// ```
#[must_use]
pub fn clean_sql(sql: &str) -> String {
    scan_clean(sql).text
}

/// Returns true if `sql` contains a `--` or `/* */` comment outside quotes.
#[must_use]
pub fn contains_comments(sql: &str) -> bool {
    let mut found = false;
    let state = scan(sql, |piece| {
        if matches!(piece, Piece::LineComment | Piece::BlockComment { .. }) {
            found = true;
        }
    });
    found || matches!(state, ScanState::BlockComment(_))
}

/// Removes comments but keeps all other whitespace, so line numbers in the
/// result match the input.
#[must_use]
pub fn remove_comments_only(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    scan(sql, |piece| match piece {
        Piece::Code(c) | Piece::Quoted(c) => out.push(c),
        Piece::LineComment => {}
        Piece::BlockComment { newlines: 0 } => out.push(' '),
        Piece::BlockComment { newlines } => {
            out.extend(core::iter::repeat('\n').take(newlines));
        }
    });
    out
}

/// Cleans `sql`, upper-cases keywords and starts every top-level clause on
/// its own line.
#[must_use]
pub fn clean_and_format_sql(sql: &str) -> String {
    let cleaned = clean_sql(sql);
    let tokens = Lexer::new(&cleaned).tokenize();

    let mut out = String::with_capacity(cleaned.len() + 16);
    let mut depth = 0usize;
    let mut prev_end = 0usize;
    let mut prev: Option<&TokenKind> = None;

    for (i, token) in tokens.iter().enumerate() {
        if token.is_eof() {
            break;
        }
        let next = tokens.get(i + 1).map(|t| &t.kind);
        let gap = cleaned.get(prev_end..token.span.start).unwrap_or_default();

        if depth == 0 && !out.is_empty() && starts_clause(&token.kind, prev, next) {
            out.push('\n');
        } else {
            out.push_str(gap);
        }

        let text = token.span.slice(&cleaned);
        match &token.kind {
            TokenKind::Keyword(_) => out.push_str(&text.to_ascii_uppercase()),
            TokenKind::LeftParen => {
                depth += 1;
                out.push_str(text);
            }
            TokenKind::RightParen => {
                depth = depth.saturating_sub(1);
                out.push_str(text);
            }
            _ => out.push_str(text),
        }

        prev_end = token.span.end;
        prev = Some(&token.kind);
    }

    // Anything the lexer stopped on (e.g. an unterminated literal).
    if let Some(rest) = cleaned.get(prev_end..) {
        out.push_str(rest);
    }
    out
}

/// Whether a keyword token opens a new clause line.
fn starts_clause(kind: &TokenKind, prev: Option<&TokenKind>, next: Option<&TokenKind>) -> bool {
    let TokenKind::Keyword(kw) = kind else {
        return false;
    };
    let after_join_modifier = matches!(
        prev,
        Some(TokenKind::Keyword(
            Keyword::Inner | Keyword::Left | Keyword::Right | Keyword::Full | Keyword::Cross | Keyword::Outer
        ))
    );
    match kw {
        Keyword::From
        | Keyword::Where
        | Keyword::Group
        | Keyword::Having
        | Keyword::Order
        | Keyword::Limit
        | Keyword::Set
        | Keyword::Union => true,
        Keyword::Join => !after_join_modifier,
        Keyword::Inner | Keyword::Cross | Keyword::Full => true,
        // LEFT(...) / RIGHT(...) are functions
        Keyword::Left | Keyword::Right => !matches!(next, Some(TokenKind::LeftParen)),
        // VALUES(col) inside ON DUPLICATE KEY UPDATE is a function
        Keyword::Values => matches!(
            prev,
            Some(TokenKind::Identifier(_) | TokenKind::RightParen)
        ),
        _ => false,
    }
}
