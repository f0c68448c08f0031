//! Bind-parameter extraction.
//!
//! Placeholders are reported in the order a driver binds them, which is the
//! order they appear in the SQL text. Placeholders inside subqueries are
//! numbered in place.

use std::collections::BTreeSet;

use serde::Serialize;

use super::tables::{alias_map, find_tables};
use crate::ast::{
    ColumnRef, Condition, Expr, InValues, JoinClause, Limit, LimitStyle, OrderBy, Statement,
    TableSource,
};

/// The clause a placeholder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    /// Select list, GROUP BY or ORDER BY.
    Select,
    /// WHERE, HAVING or JOIN ... ON.
    Condition,
    /// INSERT ... VALUES.
    Insert,
    /// UPDATE ... SET or ON DUPLICATE KEY UPDATE.
    UpdateSet,
    /// LIMIT / OFFSET.
    Limit,
}

/// A `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// 0-based bind position.
    pub position: u32,
    /// The column the bound value is compared with or assigned to.
    pub owner: Option<ColumnRef>,
    pub clause: Clause,
}

/// A placeholder with its owning column resolved to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterMapping {
    /// Index among the mappings, `0..n`.
    pub index: u32,
    /// Bind position of the placeholder.
    pub position: u32,
    /// Table name the owner's qualifier refers to.
    pub resolved_table: Option<String>,
    pub column: String,
    /// Qualifier as written.
    pub table_alias: Option<String>,
    pub clause: Clause,
}

#[derive(Default)]
struct Collector {
    out: Vec<Placeholder>,
}

impl Collector {
    fn push(&mut self, owner: Option<&ColumnRef>, clause: Clause) {
        let position = u32::try_from(self.out.len()).unwrap_or(u32::MAX);
        self.out.push(Placeholder {
            position,
            owner: owner.cloned(),
            clause,
        });
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Select(select) => {
                if let Some(with) = &select.with {
                    for cte in &with.ctes {
                        self.statement(&cte.query);
                    }
                }
                for column in &select.columns {
                    self.expr(&column.expr, None, Clause::Select);
                }
                self.source(&select.from);
                self.joins(&select.joins);
                if let Some(cond) = &select.where_clause {
                    self.condition(cond);
                }
                for expr in &select.group_by {
                    self.expr(expr, None, Clause::Select);
                }
                if let Some(cond) = &select.having {
                    self.condition(cond);
                }
                self.order_by(&select.order_by);
                self.limit(select.limit.as_ref());
            }
            Statement::Insert(insert) => {
                for (column, value) in insert.column_values() {
                    let owner = column.map(ColumnRef::new);
                    self.expr(value, owner.as_ref(), Clause::Insert);
                }
                for assignment in &insert.on_duplicate {
                    self.expr(
                        &assignment.value,
                        Some(&assignment.column),
                        Clause::UpdateSet,
                    );
                }
            }
            Statement::Update(update) => {
                self.source(&update.table);
                self.joins(&update.joins);
                for assignment in &update.assignments {
                    self.expr(
                        &assignment.value,
                        Some(&assignment.column),
                        Clause::UpdateSet,
                    );
                }
                if let Some(cond) = &update.where_clause {
                    self.condition(cond);
                }
                self.order_by(&update.order_by);
                self.limit(update.limit.as_ref());
            }
            Statement::Delete(delete) => {
                self.source(&delete.table);
                self.joins(&delete.joins);
                if let Some(cond) = &delete.where_clause {
                    self.condition(cond);
                }
                self.order_by(&delete.order_by);
                self.limit(delete.limit.as_ref());
            }
        }
    }

    fn source(&mut self, source: &TableSource) {
        if let TableSource::Subquery { query, .. } = source {
            self.statement(query);
        }
    }

    fn joins(&mut self, joins: &[JoinClause]) {
        for join in joins {
            self.source(&join.table);
            if let Some(on) = &join.on {
                self.condition(on);
            }
        }
    }

    fn order_by(&mut self, items: &[OrderBy]) {
        for item in items {
            self.expr(&item.expr, None, Clause::Select);
        }
    }

    fn limit(&mut self, limit: Option<&Limit>) {
        let Some(limit) = limit else {
            return;
        };
        match (&limit.offset, limit.style) {
            (Some(offset), LimitStyle::Comma) => {
                self.expr(offset, None, Clause::Limit);
                self.expr(&limit.count, None, Clause::Limit);
            }
            (offset, _) => {
                self.expr(&limit.count, None, Clause::Limit);
                if let Some(offset) = offset {
                    self.expr(offset, None, Clause::Limit);
                }
            }
        }
    }

    fn condition(&mut self, cond: &Condition) {
        for leaf in cond.leaves() {
            match leaf {
                Condition::Comparison { left, right, .. } => {
                    self.expr(right, Some(left), Clause::Condition);
                }
                Condition::Between {
                    left, start, end, ..
                } => {
                    self.expr(start, Some(left), Clause::Condition);
                    self.expr(end, Some(left), Clause::Condition);
                }
                Condition::In { left, values, .. } => {
                    self.in_values(values, Some(left), Clause::Condition);
                }
                Condition::Like { left, pattern, .. } => {
                    self.expr(pattern, Some(left), Clause::Condition);
                }
                Condition::Exists { subquery, .. } => self.statement(subquery),
                Condition::Predicate(expr) => self.expr(expr, None, Clause::Condition),
                Condition::Null { .. } | Condition::Logical { .. } | Condition::Not(_) => {}
            }
        }
    }

    fn in_values(&mut self, values: &InValues, owner: Option<&ColumnRef>, clause: Clause) {
        match values {
            InValues::List(list) => {
                for value in list {
                    self.expr(value, owner, clause);
                }
            }
            InValues::Subquery(query) => self.statement(query),
        }
    }

    fn expr(&mut self, expr: &Expr, owner: Option<&ColumnRef>, clause: Clause) {
        match expr {
            Expr::Parameter => self.push(owner, clause),
            Expr::Literal(_) | Expr::Column(_) | Expr::Wildcard { .. } => {}
            Expr::Binary { left, op, right } if op.is_comparison() => {
                // `a = ?` inside an expression: the column owns the other side.
                self.expr(left, column_of(right).or(owner), clause);
                self.expr(right, column_of(left).or(owner), clause);
            }
            Expr::Binary { left, right, .. } => {
                self.expr(left, owner, clause);
                self.expr(right, owner, clause);
            }
            Expr::Unary { operand: inner, .. }
            | Expr::Paren(inner)
            | Expr::Cast { expr: inner, .. }
            | Expr::IsNull { expr: inner, .. } => self.expr(inner, owner, clause),
            Expr::Function(call) => {
                for arg in &call.args {
                    self.expr(arg, owner, clause);
                }
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    self.expr(operand, owner, clause);
                }
                for (when, then) in when_clauses {
                    self.expr(when, owner, clause);
                    self.expr(then, owner, clause);
                }
                if let Some(else_clause) = else_clause {
                    self.expr(else_clause, owner, clause);
                }
            }
            Expr::Subquery(query) | Expr::Exists {
                subquery: query, ..
            } => self.statement(query),
            Expr::In { expr, values, .. } => {
                self.expr(expr, owner, clause);
                self.in_values(values, column_of(expr).or(owner), clause);
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                let inner = column_of(expr).or(owner);
                self.expr(expr, owner, clause);
                self.expr(low, inner, clause);
                self.expr(high, inner, clause);
            }
            Expr::Like { expr, pattern, .. } => {
                self.expr(expr, owner, clause);
                self.expr(pattern, column_of(expr).or(owner), clause);
            }
        }
    }
}

const fn column_of(expr: &Expr) -> Option<&ColumnRef> {
    match expr {
        Expr::Column(column) => Some(column),
        _ => None,
    }
}

/// Placeholders of `stmt` in binding order.
#[must_use]
pub fn parameters(stmt: &Statement) -> Vec<Placeholder> {
    let mut collector = Collector::default();
    collector.statement(stmt);
    collector.out
}

/// Number of bind values a condition consumes, by shape: `BETWEEN` takes
/// two, `IS NULL` none, `IN (...)` one per listed value (one for a
/// subquery), anything else one.
#[must_use]
pub fn effective_param_count(cond: &Condition) -> usize {
    cond.leaves()
        .into_iter()
        .map(|leaf| match leaf {
            Condition::Between { .. } => 2,
            Condition::Null { .. } => 0,
            Condition::In {
                values: InValues::List(values),
                ..
            } => values.len(),
            _ => 1,
        })
        .sum()
}

/// Placeholders that have an owning column, with the owner's qualifier
/// resolved to a table name.
///
/// Placeholders without an owner (`LIMIT ?`, `COALESCE(?, 0)`) are left
/// out; the kept ones are re-indexed densely and carry their bind position.
///
/// A qualifier that names no known table or alias is passed through. An
/// unqualified owner resolves to the statement's table when exactly one
/// named table is referenced directly.
#[must_use]
pub fn parameter_mappings(stmt: &Statement) -> Vec<ParameterMapping> {
    let aliases = alias_map(stmt);
    let direct: BTreeSet<String> = find_tables(stmt, false)
        .into_iter()
        .filter_map(|table| table.name)
        .collect();
    let single = if direct.len() == 1 {
        direct.into_iter().next()
    } else {
        None
    };

    parameters(stmt)
        .into_iter()
        .filter_map(|mut placeholder| placeholder.owner.take().map(|owner| (placeholder, owner)))
        .zip(0u32..)
        .map(|((placeholder, owner), index)| {
            let resolved_table = match &owner.table_alias {
                Some(qualifier) => Some(
                    aliases
                        .get(qualifier)
                        .cloned()
                        .unwrap_or_else(|| qualifier.clone()),
                ),
                None => single.clone(),
            };
            ParameterMapping {
                index,
                position: placeholder.position,
                resolved_table,
                column: owner.column,
                table_alias: owner.table_alias,
                clause: placeholder.clause,
            }
        })
        .collect()
}
