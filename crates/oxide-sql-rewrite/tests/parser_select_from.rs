//! Tests for SELECT FROM clause: table references, aliases,
//! schema-qualified tables, derived tables, CTEs and all JOIN types.

mod common;
use common::*;

use oxide_sql_rewrite::ast::{JoinType, Statement, TableSource};

#[test]
fn from_simple_table() {
    let s = parse_select("SELECT * FROM users");
    assert!(matches!(
        &s.from,
        TableSource::Table { name, schema: None, alias: None } if name == "users"
    ));
    round_trip("SELECT * FROM users");
}

#[test]
fn from_table_with_as_alias() {
    let s = parse_select("SELECT * FROM users AS u");
    assert!(matches!(
        &s.from,
        TableSource::Table { name, alias: Some(a), .. } if name == "users" && a == "u"
    ));
    round_trip("SELECT * FROM users AS u");
}

#[test]
fn from_table_with_bare_alias() {
    let s = parse_select("SELECT * FROM users u");
    assert_eq!(s.from.reference_name(), Some("u"));
    round_trip("SELECT * FROM users u");
}

#[test]
fn from_schema_qualified_table() {
    let s = parse_select("SELECT * FROM shop.users");
    assert!(matches!(
        &s.from,
        TableSource::Table { schema: Some(sc), name, .. } if sc == "shop" && name == "users"
    ));
    assert_eq!(s.from.qualified_name().as_deref(), Some("shop.users"));
    round_trip("SELECT * FROM shop.users");
}

#[test]
fn from_quoted_identifiers_keep_quotes() {
    let s = parse_select("SELECT `u`.`id` FROM `users` `u`");
    assert!(matches!(
        &s.from,
        TableSource::Table { name, alias: Some(a), .. } if name == "`users`" && a == "`u`"
    ));
    round_trip("SELECT `u`.`id` FROM `users` `u`");
}

#[test]
fn from_subquery_with_alias() {
    let s = parse_select("SELECT t.id FROM (SELECT id FROM users WHERE active = 1) AS t");
    let TableSource::Subquery { query, alias } = &s.from else {
        panic!("Expected derived table");
    };
    assert_eq!(alias.as_deref(), Some("t"));
    assert!(matches!(query.as_ref(), Statement::Select(inner) if inner.where_clause.is_some()));
    round_trip("SELECT t.id FROM (SELECT id FROM users WHERE active = 1) AS t");
}

#[test]
fn join_inner() {
    let s = parse_select("SELECT * FROM a INNER JOIN b ON a.id = b.a_id");
    assert_eq!(s.joins.len(), 1);
    assert_eq!(s.joins[0].join_type, JoinType::Inner);
    assert!(s.joins[0].on.is_some());
    round_trip("SELECT * FROM a INNER JOIN b ON a.id = b.a_id");
}

#[test]
fn join_plain_is_inner() {
    let s = parse_select("SELECT * FROM a JOIN b ON a.id = b.a_id");
    assert_eq!(s.joins[0].join_type, JoinType::Inner);
}

#[test]
fn join_outer_variants() {
    let s = parse_select(
        "SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.a_id \
         RIGHT JOIN c ON c.id = a.c_id FULL OUTER JOIN d ON d.id = a.d_id",
    );
    let types: Vec<_> = s.joins.iter().map(|j| j.join_type).collect();
    assert_eq!(types, vec![JoinType::Left, JoinType::Right, JoinType::Full]);
    round_trip("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.a_id RIGHT JOIN c ON c.id = a.c_id");
}

#[test]
fn join_cross_without_condition() {
    let s = parse_select("SELECT * FROM a CROSS JOIN b");
    assert_eq!(s.joins[0].join_type, JoinType::Cross);
    assert!(s.joins[0].on.is_none());
    round_trip("SELECT * FROM a CROSS JOIN b");
}

#[test]
fn join_using() {
    let s = parse_select("SELECT * FROM a JOIN b USING (id, tenant_id)");
    assert_eq!(s.joins[0].using, vec!["id", "tenant_id"]);
    round_trip("SELECT * FROM a JOIN b USING (id, tenant_id)");
}

#[test]
fn join_comma_list() {
    let s = parse_select("SELECT * FROM a, b x, c WHERE a.id = x.a_id");
    assert_eq!(s.joins.len(), 2);
    assert!(s.joins.iter().all(|j| j.join_type == JoinType::Comma));
    assert_eq!(s.joins[0].table.reference_name(), Some("x"));
    round_trip("SELECT * FROM a, b x, c WHERE a.id = x.a_id");
}

#[test]
fn join_derived_table() {
    let s = parse_select(
        "SELECT * FROM users u LEFT JOIN (SELECT user_id, COUNT(*) AS n FROM orders GROUP BY user_id) o \
         ON o.user_id = u.id",
    );
    assert!(matches!(&s.joins[0].table, TableSource::Subquery { alias: Some(a), .. } if a == "o"));
    round_trip(
        "SELECT * FROM users u LEFT JOIN (SELECT user_id, COUNT(*) AS n FROM orders GROUP BY user_id) o \
         ON o.user_id = u.id",
    );
}

#[test]
fn with_cte() {
    let s = parse_select(
        "WITH active AS (SELECT id FROM users WHERE active = 1), \
         recent (uid) AS (SELECT user_id FROM orders) \
         SELECT * FROM active a JOIN recent r ON r.uid = a.id",
    );
    let with = s.with.as_ref().unwrap();
    assert!(!with.recursive);
    assert_eq!(with.ctes.len(), 2);
    assert_eq!(with.ctes[1].name, "recent");
    assert_eq!(with.ctes[1].columns, vec!["uid"]);
    round_trip(
        "WITH active AS (SELECT id FROM users WHERE active = 1), \
         recent (uid) AS (SELECT user_id FROM orders) \
         SELECT * FROM active a JOIN recent r ON r.uid = a.id",
    );
}

#[test]
fn with_recursive_cte() {
    let s = parse_select(
        "WITH RECURSIVE tree AS (SELECT id FROM nodes WHERE parent_id IS NULL) SELECT * FROM tree",
    );
    assert!(s.with.unwrap().recursive);
}
