//! Cross-cutting properties checked over a corpus of statements.

mod common;
use common::*;

use std::time::{Duration, Instant};

use oxide_sql_rewrite::{
    add_join_and_where, clean_sql, find_tables, parameters, tables, SqlRewriter, Statement,
};

const CORPUS: &[&str] = &[
    "SELECT id, name FROM users WHERE age > ? AND status = ?",
    "SELECT * FROM t WHERE age BETWEEN ? AND ? AND status IN (?, ?, ?)",
    "SELECT u.id, COUNT(o.id) FROM users u LEFT JOIN orders o ON o.user_id = u.id AND o.state = ? \
     WHERE u.created_at > ? GROUP BY u.id HAVING COUNT(o.id) > ? ORDER BY u.id DESC LIMIT ?, ?",
    "SELECT * FROM (SELECT * FROM orders WHERE total > ?) o JOIN users u ON u.id = o.user_id \
     WHERE u.name LIKE ? AND NOT (o.flag = ? OR o.flag IS NULL)",
    "WITH recent AS (SELECT * FROM orders WHERE created_at > ?) SELECT * FROM recent r WHERE r.total < ?",
    "SELECT CASE WHEN a > ? THEN 'x' ELSE 'y' END FROM t WHERE b IN (SELECT c FROM u WHERE d = ?)",
    "INSERT INTO users (name, email, age) VALUES (?, ?, ?), ('bob', ?, 30)",
    "INSERT INTO counters (id, hits) VALUES (?, 1) ON DUPLICATE KEY UPDATE hits = hits + ?",
    "UPDATE users u SET u.name = ?, u.visits = u.visits + 1 WHERE u.id = ? AND u.tenant = ?",
    "UPDATE orders o JOIN users u ON u.id = o.user_id SET o.state = ? WHERE u.banned = ? LIMIT 100",
    "DELETE FROM sessions WHERE expires_at < ? OR user_id IN (?, ?)",
    "DELETE s FROM sessions s JOIN users u ON u.id = s.user_id WHERE u.name = ? ORDER BY s.id LIMIT ?",
    "SELECT '?' AS q, \"col?\" FROM t WHERE a = ? -- trailing ?\n",
    "SELECT * FROM t WHERE ? = owner AND a + ? > 1",
    "SELECT * FROM t WHERE IFNULL(x, ?) = 1 OR (SELECT MAX(v) FROM u WHERE u.k = ?) > ?",
    "DELETE FROM items WHERE price * ? > 100 AND -qty < ?",
    "UPDATE t SET x = 1 WHERE ? = owner",
];

/// Counts `?` outside quotes and comments.
fn count_placeholders(sql: &str) -> usize {
    clean_sql(sql)
        .split('\'')
        .step_by(2)
        .flat_map(|part| part.split('"').step_by(2))
        .map(|part| part.matches('?').count())
        .sum()
}

#[test]
fn parameter_count_matches_text() {
    for sql in CORPUS {
        assert_eq!(
            parameters(sql).unwrap().len(),
            count_placeholders(sql),
            "{sql}"
        );
    }
}

#[test]
fn parameter_positions_are_dense() {
    for sql in CORPUS {
        let positions: Vec<u32> = parameters(sql).unwrap().iter().map(|p| p.position).collect();
        let expected: Vec<u32> = (0..u32::try_from(positions.len()).unwrap()).collect();
        assert_eq!(positions, expected, "{sql}");
    }
}

#[test]
fn corpus_round_trips() {
    for sql in CORPUS {
        round_trip(sql);
    }
}

#[test]
fn rendered_sql_keeps_parameters_and_tables() {
    for sql in CORPUS {
        let rendered = parse(sql).to_string();
        assert_eq!(
            parameters(&rendered).unwrap().len(),
            parameters(sql).unwrap().len(),
            "{sql}"
        );
        assert_eq!(tables(&rendered, true).unwrap(), tables(sql, true).unwrap(), "{sql}");
    }
}

#[test]
fn clean_then_parse_is_equivalent() {
    for sql in CORPUS {
        assert_eq!(parse(sql), parse(&clean_sql(sql)), "{sql}");
    }
}

#[test]
fn shallow_tables_are_subset_of_deep_tables() {
    for sql in CORPUS {
        let stmt = parse(sql);
        let shallow = find_tables(&stmt, false);
        let deep = find_tables(&stmt, true);
        assert!(shallow.is_subset(&deep), "{sql}");
    }
}

#[test]
fn where_merge_adds_one_condition() {
    for sql in CORPUS {
        let stmt = parse(sql);
        if matches!(stmt, Statement::Insert(_)) {
            continue;
        }
        let before = stmt.where_clause().map_or(0, |w| w.leaves().len());
        let merged = add_join_and_where(sql, None, Some("tenant_id = ?")).unwrap();
        let after = parse(&merged);
        assert_eq!(
            after.where_clause().map_or(0, |w| w.leaves().len()),
            before + 1,
            "{sql}"
        );
        assert_eq!(
            parameters(&merged).unwrap().len(),
            parameters(sql).unwrap().len() + 1,
            "{sql}"
        );
    }
}

#[test]
fn join_merge_is_idempotent_over_corpus() {
    let join = "LEFT JOIN audit_log al ON al.ref = 1";
    for sql in CORPUS {
        if matches!(parse(sql), Statement::Insert(_)) {
            continue;
        }
        let once = add_join_and_where(sql, Some(join), None).unwrap();
        let twice = add_join_and_where(&once, Some(join), None).unwrap();
        assert_eq!(once, twice, "{sql}");
    }
}

#[test]
fn shared_rewriter_across_threads() {
    let rewriter = SqlRewriter::default();
    std::thread::scope(|scope| {
        for sql in CORPUS {
            scope.spawn(move || {
                assert_eq!(
                    rewriter.parameters(sql).unwrap().len(),
                    count_placeholders(sql)
                );
            });
        }
    });
}

#[test]
fn oversized_input_fails_fast() {
    let inputs = [
        format!("SELECT {} FROM t", vec!["a"; 100_000].join(" + ")),
        format!("SELECT * FROM t WHERE {}", vec!["c = ?"; 50_000].join(" AND ")),
        format!("SELECT * FROM t WHERE a = {}1", "- ".repeat(10_000)),
        format!("SELECT * FROM t WHERE {}a = 1", "(".repeat(10_000)),
    ];
    for sql in &inputs {
        let started = Instant::now();
        assert!(parameters(sql).is_err());
        assert!(started.elapsed() < Duration::from_secs(1), "{}", &sql[..40]);
    }
}

#[test]
fn long_chain_within_limit_is_usable() {
    let sql = format!(
        "SELECT {} FROM t WHERE {}",
        vec!["a"; 2000].join(" - "),
        vec!["c = ?"; 1000].join(" AND ")
    );
    let started = Instant::now();
    let stmt = parse(&sql);
    assert_eq!(parse(&stmt.to_string()), stmt);
    assert_eq!(parameters(&sql).unwrap().len(), 1000);
    let merged = add_join_and_where(&sql, None, Some("tenant_id = ?")).unwrap();
    assert_eq!(parameters(&merged).unwrap().len(), 1001);
    assert!(started.elapsed() < Duration::from_secs(5));
}
