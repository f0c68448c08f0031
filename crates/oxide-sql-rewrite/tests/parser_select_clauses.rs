//! Tests for SELECT columns, GROUP BY, HAVING, ORDER BY and LIMIT.

mod common;
use common::*;

use oxide_sql_rewrite::ast::{Condition, Expr, LimitStyle, Literal, OrderDirection};

#[test]
fn select_columns_and_aliases() {
    let s = parse_select("SELECT id, name AS n, u.email mail, COUNT(*) FROM users u");
    assert_eq!(s.columns.len(), 4);
    assert_eq!(s.columns[0].expr, Expr::column("id"));
    assert_eq!(s.columns[1].alias.as_deref(), Some("n"));
    assert_eq!(s.columns[2].alias.as_deref(), Some("mail"));
    assert!(matches!(&s.columns[3].expr, Expr::Function(f) if f.name == "COUNT"));
    round_trip("SELECT id, name AS n, u.email mail, COUNT(*) FROM users u");
}

#[test]
fn select_distinct() {
    let s = parse_select("SELECT DISTINCT status FROM orders");
    assert!(s.distinct);
    round_trip("SELECT DISTINCT status FROM orders");
}

#[test]
fn select_qualified_wildcard() {
    let s = parse_select("SELECT u.*, o.id FROM users u JOIN orders o ON o.uid = u.id");
    assert!(matches!(&s.columns[0].expr, Expr::Wildcard { table: Some(t) } if t == "u"));
}

#[test]
fn group_by_and_having() {
    let s = parse_select(
        "SELECT status, COUNT(*) FROM orders GROUP BY status HAVING COUNT(*) > ?",
    );
    assert_eq!(s.group_by, vec![Expr::column("status")]);
    let Some(Condition::Comparison { left, right, .. }) = &s.having else {
        panic!("Expected HAVING comparison");
    };
    assert_eq!(left.column, "COUNT(*)");
    assert_eq!(left.table_alias, None);
    assert_eq!(*right, Expr::Parameter);
    round_trip("SELECT status, COUNT(*) FROM orders GROUP BY status HAVING COUNT(*) > ?");
}

#[test]
fn order_by_directions() {
    let s = parse_select("SELECT * FROM t ORDER BY a, b DESC, c asc");
    let dirs: Vec<_> = s.order_by.iter().map(|o| o.direction).collect();
    assert_eq!(
        dirs,
        vec![OrderDirection::Asc, OrderDirection::Desc, OrderDirection::Asc]
    );
    round_trip("SELECT * FROM t ORDER BY a, b DESC, c ASC");
}

#[test]
fn limit_only() {
    let s = parse_select("SELECT * FROM t LIMIT 10");
    let limit = s.limit.unwrap();
    assert_eq!(limit.count, Expr::Literal(Literal::Number(String::from("10"))));
    assert_eq!(limit.offset, None);
}

#[test]
fn limit_offset_form() {
    let s = parse_select("SELECT * FROM t LIMIT 10 OFFSET 20");
    let limit = s.limit.unwrap();
    assert_eq!(limit.count, Expr::Literal(Literal::Number(String::from("10"))));
    assert_eq!(limit.offset, Some(Expr::Literal(Literal::Number(String::from("20")))));
    assert_eq!(limit.style, LimitStyle::Offset);
    round_trip("SELECT * FROM t LIMIT 10 OFFSET 20");
}

#[test]
fn limit_comma_form_swaps_operands() {
    let s = parse_select("SELECT * FROM t LIMIT 20, 10");
    let limit = s.limit.unwrap();
    assert_eq!(limit.count, Expr::Literal(Literal::Number(String::from("10"))));
    assert_eq!(limit.offset, Some(Expr::Literal(Literal::Number(String::from("20")))));
    assert_eq!(limit.style, LimitStyle::Comma);
    round_trip("SELECT * FROM t LIMIT 20, 10");
}

#[test]
fn absent_optional_clauses_are_empty() {
    let s = parse_select("SELECT * FROM t");
    assert!(s.where_clause.is_none());
    assert!(s.group_by.is_empty());
    assert!(s.having.is_none());
    assert!(s.order_by.is_empty());
    assert!(s.limit.is_none());
}

#[test]
fn full_clause_order() {
    round_trip(
        "SELECT u.id, COUNT(o.id) AS n FROM users u LEFT JOIN orders o ON o.user_id = u.id \
         WHERE u.active = 1 GROUP BY u.id HAVING COUNT(o.id) > 2 ORDER BY n DESC LIMIT 5 OFFSET 10",
    );
}
