//! Read-only projections of a parsed statement: referenced tables and
//! bind parameters.

mod params;
mod tables;

pub use params::{
    effective_param_count, parameter_mappings, parameters, Clause, ParameterMapping, Placeholder,
};
pub use tables::{alias_map, find_tables, find_tables_or_sources, TableKind, TableRef};

use crate::ast::{Condition, Expr, InValues, Statement};

/// Collects the subqueries nested in `expr`, outermost first, in source order.
/// Does not descend into the subqueries themselves.
pub(crate) fn expr_subqueries<'a>(expr: &'a Expr, out: &mut Vec<&'a Statement>) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) | Expr::Parameter | Expr::Wildcard { .. } => {}
        Expr::Subquery(query) | Expr::Exists { subquery: query, .. } => out.push(query),
        Expr::Binary { left, right, .. } => {
            expr_subqueries(left, out);
            expr_subqueries(right, out);
        }
        Expr::Unary { operand: inner, .. }
        | Expr::Paren(inner)
        | Expr::Cast { expr: inner, .. }
        | Expr::IsNull { expr: inner, .. } => expr_subqueries(inner, out),
        Expr::Function(call) => {
            for arg in &call.args {
                expr_subqueries(arg, out);
            }
        }
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            if let Some(operand) = operand {
                expr_subqueries(operand, out);
            }
            for (when, then) in when_clauses {
                expr_subqueries(when, out);
                expr_subqueries(then, out);
            }
            if let Some(else_clause) = else_clause {
                expr_subqueries(else_clause, out);
            }
        }
        Expr::In { expr, values, .. } => {
            expr_subqueries(expr, out);
            in_values_subqueries(values, out);
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            expr_subqueries(expr, out);
            expr_subqueries(low, out);
            expr_subqueries(high, out);
        }
        Expr::Like { expr, pattern, .. } => {
            expr_subqueries(expr, out);
            expr_subqueries(pattern, out);
        }
    }
}

fn in_values_subqueries<'a>(values: &'a InValues, out: &mut Vec<&'a Statement>) {
    match values {
        InValues::List(list) => {
            for value in list {
                expr_subqueries(value, out);
            }
        }
        InValues::Subquery(query) => out.push(query),
    }
}

/// Collects the subqueries nested in a condition tree, in source order.
pub(crate) fn condition_subqueries<'a>(cond: &'a Condition, out: &mut Vec<&'a Statement>) {
    for leaf in cond.leaves() {
        match leaf {
            Condition::Comparison { right, .. } => expr_subqueries(right, out),
            Condition::Between { start, end, .. } => {
                expr_subqueries(start, out);
                expr_subqueries(end, out);
            }
            Condition::In { values, .. } => in_values_subqueries(values, out),
            Condition::Like { pattern, .. } => expr_subqueries(pattern, out),
            Condition::Exists { subquery, .. } => out.push(subquery),
            Condition::Predicate(expr) => expr_subqueries(expr, out),
            Condition::Null { .. } | Condition::Logical { .. } | Condition::Not(_) => {}
        }
    }
}
