//! The string-in/string-out surface.
//!
//! [`SqlRewriter`] holds only an immutable [`RewriteConfig`], so one value
//! can be shared freely between threads. The free functions use the default
//! configuration.

use std::collections::BTreeSet;

use tracing::trace;

use crate::analysis::{self, ParameterMapping, Placeholder, TableRef};
use crate::ast::Statement;
use crate::config::RewriteConfig;
use crate::error::{Result, RewriteError};
use crate::merge;
use crate::parser::{ParseErrorKind, Parser};

/// SQL analysis and rewriting with a fixed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlRewriter {
    config: RewriteConfig,
}

impl SqlRewriter {
    /// Creates a rewriter with the given configuration.
    #[must_use]
    pub const fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Parses a single statement.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for blank input, `Parse` otherwise.
    pub fn parse(&self, sql: &str) -> Result<Statement> {
        if sql.trim().is_empty() {
            return Err(RewriteError::InvalidArgument(String::from(
                "SQL text is empty",
            )));
        }
        trace!(len = sql.len(), "parse");
        Ok(Parser::with_config(sql, self.config).parse_statement()?)
    }

    /// Tables and derived sources referenced by `sql`.
    ///
    /// # Errors
    ///
    /// Fails when `sql` does not parse.
    pub fn tables(&self, sql: &str, deep: bool) -> Result<BTreeSet<TableRef>> {
        Ok(analysis::find_tables_or_sources(&self.parse(sql)?, deep))
    }

    /// Named tables referenced by `sql`, without derived sources.
    ///
    /// # Errors
    ///
    /// Fails when `sql` does not parse.
    pub fn named_tables(&self, sql: &str, deep: bool) -> Result<BTreeSet<TableRef>> {
        Ok(analysis::find_tables(&self.parse(sql)?, deep))
    }

    /// Placeholders of `sql` in binding order.
    ///
    /// # Errors
    ///
    /// Fails when `sql` does not parse.
    pub fn parameters(&self, sql: &str) -> Result<Vec<Placeholder>> {
        Ok(analysis::parameters(&self.parse(sql)?))
    }

    /// Placeholders of `sql` with their owning columns resolved to tables.
    ///
    /// # Errors
    ///
    /// Fails when `sql` does not parse.
    pub fn parameter_mappings(&self, sql: &str) -> Result<Vec<ParameterMapping>> {
        Ok(analysis::parameter_mappings(&self.parse(sql)?))
    }

    /// Merges a JOIN and/or WHERE fragment into `sql` and renders the result.
    ///
    /// # Errors
    ///
    /// `Unsupported` for INSERT and DDL statements, `Fragment` for unusable
    /// fragments, `Parse`/`InvalidArgument` for bad base SQL.
    pub fn add_join_and_where(
        &self,
        sql: &str,
        join: Option<&str>,
        where_: Option<&str>,
    ) -> Result<String> {
        let base = match self.parse(sql) {
            Err(RewriteError::Parse(err)) if err.kind == ParseErrorKind::UnsupportedStatement => {
                return Err(RewriteError::Unsupported(err.message));
            }
            other => other?,
        };
        let merged = merge::merge(&base, join, where_, self.config)?;
        Ok(merged.to_sql())
    }
}

/// Parses a single statement with the default configuration.
///
/// # Errors
///
/// `InvalidArgument` for blank input, `Parse` otherwise.
pub fn parse(sql: &str) -> Result<Statement> {
    SqlRewriter::default().parse(sql)
}

/// Tables and derived sources referenced by `sql`.
///
/// # Errors
///
/// Fails when `sql` does not parse.
///
/// # Example
///
/// ```rust
/// use oxide_sql_rewrite::tables;
///
/// let found = tables("SELECT * FROM (SELECT * FROM a) t", true).unwrap();
/// let derived = found.iter().next().unwrap();
/// assert_eq!(derived.name, None);
/// assert_eq!(derived.alias.as_deref(), Some("t"));
/// assert_eq!(derived.children.len(), 1);
/// ```
pub fn tables(sql: &str, deep: bool) -> Result<BTreeSet<TableRef>> {
    SqlRewriter::default().tables(sql, deep)
}

/// Placeholders of `sql` in binding order.
///
/// # Errors
///
/// Fails when `sql` does not parse.
pub fn parameters(sql: &str) -> Result<Vec<Placeholder>> {
    SqlRewriter::default().parameters(sql)
}

/// Placeholders of `sql` with their owning columns resolved to tables.
///
/// # Errors
///
/// Fails when `sql` does not parse.
pub fn parameter_mappings(sql: &str) -> Result<Vec<ParameterMapping>> {
    SqlRewriter::default().parameter_mappings(sql)
}

/// Merges a JOIN and/or WHERE fragment into `sql`.
///
/// # Errors
///
/// See [`SqlRewriter::add_join_and_where`].
///
/// # Example
///
/// ```rust
/// use oxide_sql_rewrite::add_join_and_where;
///
/// let sql = add_join_and_where(
///     "SELECT * FROM users u WHERE u.status = 'active'",
///     Some("LEFT JOIN orders o ON u.id = o.user_id"),
///     Some("o.total > ?"),
/// )
/// .unwrap();
/// assert_eq!(
///     sql,
///     "SELECT * FROM users u LEFT JOIN orders o ON u.id = o.user_id \
///      WHERE u.status = 'active' AND o.total > ?"
/// );
/// ```
pub fn add_join_and_where(sql: &str, join: Option<&str>, where_: Option<&str>) -> Result<String> {
    SqlRewriter::default().add_join_and_where(sql, join, where_)
}

/// Renders a statement as SQL text.
#[must_use]
pub fn to_sql(stmt: &Statement) -> String {
    stmt.to_sql()
}
