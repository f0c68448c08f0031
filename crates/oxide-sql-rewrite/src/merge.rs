//! JOIN/WHERE fragment injection.
//!
//! A fragment is parsed by wrapping it in a throwaway carrier statement, so
//! it goes through exactly the same grammar as a full statement. The base
//! statement is cloned, never edited.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::ast::{
    ColumnRef, Condition, Expr, InValues, JoinClause, SelectStatement, Statement, StatementKind,
    TableSource,
};
use crate::config::RewriteConfig;
use crate::error::{FragmentKind, Result, RewriteError};
use crate::parser::Parser;

/// Alias of the carrier statement's table. Fragments may not rely on it.
const CARRIER_TABLE: &str = "a";

/// Parses a fragment inside a carrier statement and returns the carrier.
fn parse_carrier(
    kind: FragmentKind,
    fragment: &str,
    config: RewriteConfig,
) -> Result<SelectStatement> {
    let sql = match kind {
        FragmentKind::Join => format!("SELECT * FROM {CARRIER_TABLE} {CARRIER_TABLE} {fragment}"),
        FragmentKind::Where => {
            format!("SELECT * FROM {CARRIER_TABLE} {CARRIER_TABLE} WHERE {fragment}")
        }
    };
    let fragment_error = |reason: String| RewriteError::Fragment {
        kind,
        fragment: fragment.to_string(),
        reason,
    };

    let statement = Parser::with_config(&sql, config)
        .parse_statement()
        .map_err(|e| fragment_error(e.to_string()))?;
    let Statement::Select(select) = statement else {
        return Err(fragment_error(String::from("not a fragment")));
    };

    let extra_clauses = !select.group_by.is_empty()
        || select.having.is_some()
        || !select.order_by.is_empty()
        || select.limit.is_some();
    let extra = match kind {
        FragmentKind::Join => extra_clauses || select.where_clause.is_some(),
        FragmentKind::Where => extra_clauses || !select.joins.is_empty(),
    };
    if extra {
        return Err(fragment_error(format!(
            "only a {} clause is allowed",
            kind.as_str()
        )));
    }
    Ok(select)
}

fn parse_join_fragment(fragment: &str, config: RewriteConfig) -> Result<Vec<JoinClause>> {
    let select = parse_carrier(FragmentKind::Join, fragment, config)?;
    if select.joins.is_empty() {
        return Err(RewriteError::Fragment {
            kind: FragmentKind::Join,
            fragment: fragment.to_string(),
            reason: String::from("no JOIN found"),
        });
    }
    Ok(select.joins)
}

fn parse_where_fragment(fragment: &str, config: RewriteConfig) -> Result<Condition> {
    let select = parse_carrier(FragmentKind::Where, fragment, config)?;
    select.where_clause.ok_or_else(|| RewriteError::Fragment {
        kind: FragmentKind::Where,
        fragment: fragment.to_string(),
        reason: String::from("no recognized condition"),
    })
}

/// Table names of the statement mapped to their aliases.
struct KnownTables {
    aliases: BTreeMap<String, String>,
}

impl KnownTables {
    fn new() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    fn add(&mut self, source: &TableSource) {
        let TableSource::Table {
            name,
            alias: Some(alias),
            ..
        } = source
        else {
            return;
        };
        if let Some(qualified) = source.qualified_name() {
            self.aliases.insert(qualified, alias.clone());
        }
        self.aliases.insert(name.clone(), alias.clone());
    }

    /// Qualifier renames to apply, leaving out `excluded`'s own name and
    /// alias.
    fn renames(&self, excluded: Option<&TableSource>) -> BTreeMap<&str, &str> {
        let mut skip = BTreeSet::new();
        if let Some(source) = excluded {
            if let TableSource::Table { name, .. } = source {
                skip.insert(name.clone());
            }
            if let Some(qualified) = source.qualified_name() {
                skip.insert(qualified);
            }
            if let Some(alias) = source.alias_name() {
                skip.insert(alias.to_string());
            }
        }
        self.aliases
            .iter()
            .filter(|(name, alias)| name != alias && !skip.contains(name.as_str()))
            .map(|(name, alias)| (name.as_str(), alias.as_str()))
            .collect()
    }
}

fn complete_column(column: &mut ColumnRef, renames: &BTreeMap<&str, &str>) {
    let Some(qualifier) = &column.table_alias else {
        return;
    };
    if let Some(alias) = renames.get(qualifier.as_str()) {
        debug!(from = %qualifier, to = %alias, column = %column.column, "completing qualifier");
        column.table_alias = Some((*alias).to_string());
    }
}

/// Rewrites qualifiers in `expr`. Subqueries have their own scope and are
/// left alone.
fn complete_expr(expr: &mut Expr, renames: &BTreeMap<&str, &str>) {
    match expr {
        Expr::Column(column) => complete_column(column, renames),
        Expr::Literal(_)
        | Expr::Parameter
        | Expr::Wildcard { .. }
        | Expr::Subquery(_)
        | Expr::Exists { .. } => {}
        Expr::Binary { left, right, .. } => {
            complete_expr(left, renames);
            complete_expr(right, renames);
        }
        Expr::Unary { operand: inner, .. }
        | Expr::Paren(inner)
        | Expr::Cast { expr: inner, .. }
        | Expr::IsNull { expr: inner, .. } => complete_expr(inner, renames),
        Expr::Function(call) => {
            for arg in &mut call.args {
                complete_expr(arg, renames);
            }
        }
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            if let Some(operand) = operand {
                complete_expr(operand, renames);
            }
            for (when, then) in when_clauses {
                complete_expr(when, renames);
                complete_expr(then, renames);
            }
            if let Some(else_clause) = else_clause {
                complete_expr(else_clause, renames);
            }
        }
        Expr::In { expr, values, .. } => {
            complete_expr(expr, renames);
            if let InValues::List(list) = values {
                for value in list {
                    complete_expr(value, renames);
                }
            }
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            complete_expr(expr, renames);
            complete_expr(low, renames);
            complete_expr(high, renames);
        }
        Expr::Like { expr, pattern, .. } => {
            complete_expr(expr, renames);
            complete_expr(pattern, renames);
        }
    }
}

fn complete_condition(cond: &mut Condition, renames: &BTreeMap<&str, &str>) {
    if renames.is_empty() {
        return;
    }
    let mut stack = vec![cond];
    while let Some(node) = stack.pop() {
        match node {
            Condition::Logical { left, right, .. } => {
                stack.push(right.as_mut());
                stack.push(left.as_mut());
            }
            Condition::Not(inner) => stack.push(inner.as_mut()),
            Condition::Comparison { left, right, .. } => {
                complete_column(left, renames);
                complete_expr(right, renames);
            }
            Condition::Between {
                left, start, end, ..
            } => {
                complete_column(left, renames);
                complete_expr(start, renames);
                complete_expr(end, renames);
            }
            Condition::In { left, values, .. } => {
                complete_column(left, renames);
                if let InValues::List(list) = values {
                    for value in list {
                        complete_expr(value, renames);
                    }
                }
            }
            Condition::Null { left, .. } => complete_column(left, renames),
            Condition::Like { left, pattern, .. } => {
                complete_column(left, renames);
                complete_expr(pattern, renames);
            }
            Condition::Predicate(expr) => complete_expr(expr, renames),
            Condition::Exists { .. } => {}
        }
    }
}

/// Key deciding whether two joins target the same table.
fn join_key(source: &TableSource) -> String {
    source
        .qualified_name()
        .unwrap_or_else(|| source.to_string())
}

/// Merges a JOIN and/or WHERE fragment into `base`, returning a new
/// statement.
///
/// Fragment joins whose table is already joined are skipped, so merging
/// the same join twice has no further effect. The WHERE fragment is ANDed
/// with the existing WHERE tree. Qualifiers in the fragments that name a
/// table of `base` by its table name are rewritten to that table's alias.
///
/// # Errors
///
/// `Unsupported` for INSERT statements, `Fragment` when a fragment cannot
/// be parsed or carries more than its own clause.
pub fn merge(
    base: &Statement,
    join_fragment: Option<&str>,
    where_fragment: Option<&str>,
    config: RewriteConfig,
) -> Result<Statement> {
    trace!(
        kind = base.kind().as_str(),
        join_len = join_fragment.map_or(0, str::len),
        where_len = where_fragment.map_or(0, str::len),
        "merging fragments"
    );
    if base.kind() == StatementKind::Insert {
        return Err(RewriteError::Unsupported(String::from(
            "INSERT has no JOIN or WHERE clause to merge into",
        )));
    }

    let join_fragment = join_fragment.map(str::trim).filter(|f| !f.is_empty());
    let where_fragment = where_fragment.map(str::trim).filter(|f| !f.is_empty());

    let mut known = KnownTables::new();
    known.add(base.table());
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for join in base.joins() {
        known.add(&join.table);
        seen.insert(join_key(&join.table));
    }

    let mut new_joins = vec![];
    if let Some(fragment) = join_fragment {
        for mut join in parse_join_fragment(fragment, config)? {
            let key = join_key(&join.table);
            if !seen.insert(key.clone()) {
                debug!(table = %key, "skipping join already present");
                continue;
            }
            if let Some(on) = &mut join.on {
                complete_condition(on, &known.renames(Some(&join.table)));
            }
            new_joins.push(join);
        }
    }
    for join in &new_joins {
        known.add(&join.table);
    }

    let where_cond = match where_fragment {
        Some(fragment) => {
            let mut cond = parse_where_fragment(fragment, config)?;
            complete_condition(&mut cond, &known.renames(None));
            Some(cond)
        }
        None => None,
    };

    let mut merged = base.clone();
    let (joins, where_clause) = match &mut merged {
        Statement::Select(s) => (&mut s.joins, &mut s.where_clause),
        Statement::Update(u) => (&mut u.joins, &mut u.where_clause),
        Statement::Delete(d) => {
            // A DELETE with joins must name the tables it deletes from.
            if d.targets.is_empty() && !new_joins.is_empty() {
                d.targets
                    .extend(d.table.reference_name().map(str::to_string));
            }
            (&mut d.joins, &mut d.where_clause)
        }
        Statement::Insert(_) => {
            return Err(RewriteError::Unsupported(String::from(
                "INSERT has no JOIN or WHERE clause to merge into",
            )));
        }
    };
    joins.extend(new_joins);
    if let Some(cond) = where_cond {
        *where_clause = Some(match where_clause.take() {
            Some(existing) => Condition::and(existing, cond),
            None => cond,
        });
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(sql: &str, join: Option<&str>, where_: Option<&str>) -> String {
        let base = Parser::new(sql).parse_statement().unwrap();
        merge(&base, join, where_, RewriteConfig::default())
            .unwrap()
            .to_sql()
    }

    #[test]
    fn test_join_and_where() {
        assert_eq!(
            merged(
                "SELECT * FROM users u WHERE u.status='active'",
                Some("LEFT JOIN orders o ON u.id=o.user_id"),
                Some("o.total > ?"),
            ),
            "SELECT * FROM users u LEFT JOIN orders o ON u.id = o.user_id \
             WHERE u.status = 'active' AND o.total > ?"
        );
    }

    #[test]
    fn test_or_where_keeps_grouping() {
        assert_eq!(
            merged(
                "SELECT * FROM t WHERE a = 1 OR b = 2",
                None,
                Some("tenant_id = ? OR shared = 1"),
            ),
            "SELECT * FROM t WHERE (a = 1 OR b = 2) AND (tenant_id = ? OR shared = 1)"
        );
    }

    #[test]
    fn test_qualifier_completion() {
        assert_eq!(
            merged(
                "SELECT * FROM users u",
                Some("JOIN posts p ON users.id = p.author_id AND posts.visible = 1"),
                Some("users.tenant_id = ?"),
            ),
            "SELECT * FROM users u INNER JOIN posts p ON u.id = p.author_id \
             AND posts.visible = 1 WHERE u.tenant_id = ?"
        );
    }

    #[test]
    fn test_duplicate_join_skipped() {
        let once = merged(
            "SELECT * FROM users u",
            Some("JOIN orders o ON o.uid = u.id"),
            None,
        );
        let twice = merged(&once, Some("JOIN orders o ON o.uid = u.id"), None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_insert_unsupported() {
        let base = Parser::new("INSERT INTO t (a) VALUES (?)")
            .parse_statement()
            .unwrap();
        let err = merge(&base, None, Some("a = 1"), RewriteConfig::default()).unwrap_err();
        assert!(matches!(err, RewriteError::Unsupported(_)));
    }

    #[test]
    fn test_bad_fragments() {
        let base = Parser::new("SELECT * FROM t").parse_statement().unwrap();
        let config = RewriteConfig::default();
        assert!(matches!(
            merge(&base, Some("WHERE a = 1"), None, config),
            Err(RewriteError::Fragment {
                kind: FragmentKind::Join,
                ..
            })
        ));
        assert!(matches!(
            merge(&base, None, Some("a = 1 ORDER BY b"), config),
            Err(RewriteError::Fragment {
                kind: FragmentKind::Where,
                ..
            })
        ));
        assert!(matches!(
            merge(&base, Some("JOIN"), None, config),
            Err(RewriteError::Fragment { .. })
        ));
    }

    #[test]
    fn test_blank_fragments_are_ignored() {
        assert_eq!(merged("SELECT * FROM t", Some("  "), Some("")), "SELECT * FROM t");
    }

    #[test]
    fn test_delete_gets_target_when_joined() {
        assert_eq!(
            merged(
                "DELETE FROM sessions s WHERE s.expired = 1",
                Some("JOIN users u ON u.id = s.user_id"),
                Some("u.tenant_id = ?"),
            ),
            "DELETE s FROM sessions s INNER JOIN users u ON u.id = s.user_id \
             WHERE s.expired = 1 AND u.tenant_id = ?"
        );
        assert_eq!(
            merged("DELETE FROM sessions WHERE id = ?", None, Some("tenant_id = ?")),
            "DELETE FROM sessions WHERE id = ? AND tenant_id = ?"
        );
    }

    #[test]
    fn test_placeholder_predicates_survive_merge() {
        assert_eq!(
            merged(
                "UPDATE t SET x = 1 WHERE ? = owner",
                None,
                Some("tenant_id = ?"),
            ),
            "UPDATE t SET x = 1 WHERE ? = owner AND tenant_id = ?"
        );
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = Parser::new("DELETE FROM t WHERE a = ?").parse_statement().unwrap();
        let before = base.clone();
        let out = merge(&base, None, Some("b = ?"), RewriteConfig::default()).unwrap();
        assert_eq!(base, before);
        assert_eq!(out.to_sql(), "DELETE FROM t WHERE a = ? AND b = ?");
    }
}
