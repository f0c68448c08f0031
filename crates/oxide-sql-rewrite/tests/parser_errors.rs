//! Tests for rejected input and error categories.

mod common;
use common::*;

use oxide_sql_rewrite::{ParseErrorKind, RewriteConfig};

#[test]
fn error_empty_input() {
    let err = parse_err("");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn error_comment_only_input() {
    let err = parse_err("/* nothing here */ -- or here");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn error_select_without_from() {
    let err = parse_err("SELECT 1");
    assert_eq!(err.kind, ParseErrorKind::MissingClause);
    assert!(err.message.contains("FROM"), "{}", err.message);
}

#[test]
fn error_insert_without_values() {
    let err = parse_err("INSERT INTO t (a, b)");
    assert_eq!(err.kind, ParseErrorKind::MissingClause);
}

#[test]
fn error_insert_without_into() {
    let err = parse_err("INSERT t VALUES (1)");
    assert_eq!(err.kind, ParseErrorKind::MissingClause);
}

#[test]
fn error_update_without_set() {
    let err = parse_err("UPDATE t WHERE a = 1");
    assert_eq!(err.kind, ParseErrorKind::MissingClause);
}

#[test]
fn error_delete_without_from() {
    let err = parse_err("DELETE t WHERE a = 1");
    assert_eq!(err.kind, ParseErrorKind::MissingClause);
}

#[test]
fn error_ddl_is_unsupported() {
    for sql in [
        "CREATE TABLE t (id INT)",
        "DROP TABLE t",
        "ALTER TABLE t ADD COLUMN c INT",
        "TRUNCATE TABLE t",
    ] {
        assert_eq!(parse_err(sql).kind, ParseErrorKind::UnsupportedStatement, "{sql}");
    }
}

#[test]
fn error_unterminated_string() {
    let err = parse_err("SELECT * FROM t WHERE a = 'open");
    assert_eq!(err.kind, ParseErrorKind::Unterminated);
}

#[test]
fn error_unterminated_identifier() {
    let err = parse_err("SELECT * FROM `t WHERE a = 1");
    assert_eq!(err.kind, ParseErrorKind::Unterminated);
}

#[test]
fn error_unterminated_block_comment() {
    let err = parse_err("SELECT * FROM t /* open");
    assert_eq!(err.kind, ParseErrorKind::Unterminated);
}

#[test]
fn error_unclosed_parenthesis() {
    let err = parse_err("SELECT * FROM t WHERE a IN (1, 2");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn error_trailing_garbage() {
    let err = parse_err("SELECT * FROM t; SELECT 1 FROM u");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn trailing_semicolons_accepted() {
    parse("SELECT * FROM t;;");
}

#[test]
fn error_too_deep_subqueries() {
    let mut sql = String::from("SELECT * FROM t WHERE a IN (SELECT a FROM t WHERE a = 1)");
    for _ in 0..40 {
        sql = format!("SELECT * FROM t WHERE a IN ({sql})");
    }
    let err = parse_err(&sql);
    assert_eq!(err.kind, ParseErrorKind::TooDeep);
}

#[test]
fn error_too_deep_parentheses() {
    let sql = format!("SELECT * FROM t WHERE {}a = 1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);
}

#[test]
fn depth_limit_is_configurable() {
    let sql = format!("SELECT * FROM t WHERE {}a = 1{}", "(".repeat(10), ")".repeat(10));
    assert!(parse_with(&sql, RewriteConfig::default()).is_ok());
    let err = parse_with(&sql, RewriteConfig::new().with_max_depth(5)).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TooDeep);
}

#[test]
fn error_too_deep_unary_chain() {
    let sql = format!("SELECT * FROM t WHERE a = {}1", "- ".repeat(1000));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);

    let sql = format!("SELECT {}a FROM t", "~".repeat(1000));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);

    let sql = format!("SELECT * FROM t WHERE {}a = 1", "NOT ".repeat(1000));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);
}

#[test]
fn short_unary_chain_parses() {
    parse("SELECT - - - a FROM t WHERE b = - - 1");
}

#[test]
fn error_operator_chain_too_long() {
    let sql = format!("SELECT {} FROM t", vec!["a"; 100_000].join(" + "));
    let err = parse_err(&sql);
    assert_eq!(err.kind, ParseErrorKind::TooDeep);
    assert!(err.message.contains("operands"), "{}", err.message);

    let sql = format!("SELECT * FROM t WHERE {}", vec!["c = 1"; 50_000].join(" AND "));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);

    let sql = format!("SELECT * FROM t WHERE {}", vec!["c = 1"; 50_000].join(" OR "));
    assert_eq!(parse_err(&sql).kind, ParseErrorKind::TooDeep);
}

#[test]
fn operand_limit_is_configurable() {
    let sql = format!("SELECT {} FROM t", vec!["a"; 20].join(" * "));
    assert!(parse_with(&sql, RewriteConfig::default()).is_ok());
    let err = parse_with(&sql, RewriteConfig::new().with_max_terms(10)).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TooDeep);

    let sql = format!("SELECT * FROM t WHERE {}", vec!["c = ?"; 20].join(" AND "));
    assert!(parse_with(&sql, RewriteConfig::new().with_max_terms(10)).is_err());
}

#[test]
fn error_display_has_position() {
    let err = parse_err("SELECT * FROM");
    let text = err.to_string();
    assert!(text.contains("at position"), "{text}");
}
