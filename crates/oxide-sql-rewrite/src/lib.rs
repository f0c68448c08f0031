//! # oxide-sql-rewrite
//!
//! SQL analysis and rewriting for single DML statements.
//!
//! This crate provides:
//! - A comment- and quote-aware cleaner
//! - A hand-written recursive descent parser with Pratt expression parsing
//!   for SELECT, INSERT, UPDATE and DELETE (MySQL-flavored)
//! - Table and bind-parameter extraction
//! - JOIN/WHERE fragment injection, for example to add tenant or access
//!   control filters to arbitrary queries
//!
//! Nothing is executed and no schema is consulted; everything works on the
//! SQL text alone.
//!
//! ## Analysis
//!
//! ```rust
//! use oxide_sql_rewrite::{parameters, tables, Clause};
//!
//! let params = parameters("SELECT * FROM t WHERE age BETWEEN ? AND ? AND status IN (?, ?, ?)")
//!     .unwrap();
//! assert_eq!(params.len(), 5);
//! assert_eq!(params[0].owner.as_ref().unwrap().column, "age");
//! assert_eq!(params[4].clause, Clause::Condition);
//!
//! let shallow = tables("SELECT * FROM (SELECT * FROM a) t", false).unwrap();
//! assert_eq!(shallow.len(), 1);
//! ```
//!
//! ## Rewriting
//!
//! ```rust
//! use oxide_sql_rewrite::add_join_and_where;
//!
//! let sql = add_join_and_where(
//!     "SELECT * FROM posts p WHERE p.published = 1",
//!     None,
//!     Some("posts.tenant_id = ?"),
//! )
//! .unwrap();
//!
//! // The qualifier is completed to the table's alias.
//! assert_eq!(sql, "SELECT * FROM posts p WHERE p.published = 1 AND p.tenant_id = ?");
//! ```

pub mod analysis;
pub mod ast;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod ident;
pub mod lexer;
pub mod merge;
pub mod parser;
pub mod render;
pub mod rewriter;

pub use analysis::{
    alias_map, effective_param_count, find_tables, find_tables_or_sources, Clause,
    ParameterMapping, Placeholder, TableKind, TableRef,
};
pub use ast::{ColumnRef, Condition, Expr, Statement, StatementKind};
pub use cleaner::{clean_and_format_sql, clean_sql, contains_comments, remove_comments_only};
pub use config::RewriteConfig;
pub use error::{FragmentKind, MergeError, Result, RewriteError};
pub use ident::identifiers_equal;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use rewriter::{
    add_join_and_where, parameter_mappings, parameters, parse, tables, to_sql,
    SqlRewriter,
};
