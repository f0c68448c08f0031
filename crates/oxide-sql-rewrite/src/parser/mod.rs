//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing.
//! Statement grammar lives in `parser.rs`; WHERE/ON/HAVING text is handled
//! by the condition sub-parser in `condition.rs`.

mod condition;
mod error;
mod parser;
mod pratt;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;
