//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer over cleaned SQL text (comments already removed by
//! the [`cleaner`](crate::cleaner)). Identifiers, literals and numbers keep
//! their raw spelling so that rendering never changes what the author wrote
//! inside them.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
