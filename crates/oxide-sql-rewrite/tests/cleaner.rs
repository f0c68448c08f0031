//! Tests for comment stripping and whitespace normalization.

mod common;
use common::*;

use oxide_sql_rewrite::{clean_and_format_sql, clean_sql, contains_comments, remove_comments_only};

#[test]
fn clean_multiline_query() {
    let sql = "
        -- fetch active users
        SELECT id,
               name   /* display name */
        FROM users
        WHERE active = 1;
    ";
    assert_eq!(clean_sql(sql), "SELECT id, name FROM users WHERE active = 1");
}

#[test]
fn clean_is_idempotent() {
    for sql in [
        "SELECT a -- x\nFROM t",
        "SELECT '--' , \"/*\" FROM t /* c */ ;",
        "  UPDATE t\tSET a = 'x  y'  WHERE b = 1 ; ;",
        "SELECT `a``b` FROM t -- trailing",
    ] {
        let once = clean_sql(sql);
        assert_eq!(clean_sql(&once), once, "{sql}");
    }
}

#[test]
fn clean_preserves_parse_result() {
    let raw = "SELECT u.id /* id */ FROM users u -- users\n WHERE u.age > ? ;";
    assert_eq!(parse(raw), parse(&clean_sql(raw)));
}

#[test]
fn clean_empty_and_comment_only() {
    assert_eq!(clean_sql(""), "");
    assert_eq!(clean_sql("  -- nothing\n /* at all */ "), "");
}

#[test]
fn clean_keeps_hash_and_dashes_inside_literals() {
    assert_eq!(
        clean_sql("SELECT * FROM t WHERE a = '-- not a comment' AND b = 'x /* y */'"),
        "SELECT * FROM t WHERE a = '-- not a comment' AND b = 'x /* y */'"
    );
}

#[test]
fn contains_comments_cases() {
    assert!(contains_comments("SELECT 1 FROM t -- c"));
    assert!(contains_comments("SELECT /**/ 1 FROM t"));
    assert!(contains_comments("SELECT 1 FROM t /* unterminated"));
    assert!(!contains_comments("SELECT '--' FROM t"));
    assert!(!contains_comments("SELECT `/*x*/` FROM t"));
    assert!(!contains_comments("SELECT a / b * c FROM t"));
}

#[test]
fn remove_comments_keeps_line_structure() {
    let sql = "SELECT a,\n  -- note\n  b\nFROM t /* one\ntwo\nthree */ WHERE x = '--'";
    let out = remove_comments_only(sql);
    assert_eq!(out.lines().count(), sql.lines().count());
    assert!(!contains_comments(&out));
    assert!(out.contains("'--'"));
}

#[test]
fn format_select() {
    assert_eq!(
        clean_and_format_sql(
            "select u.id, count(*) from users u inner join orders o on o.uid = u.id \
             where u.active = 1 group by u.id having count(*) > 1 order by u.id limit 5"
        ),
        "SELECT u.id, count(*)\nFROM users u\nINNER JOIN orders o ON o.uid = u.id\n\
         WHERE u.active = 1\nGROUP BY u.id\nHAVING count(*) > 1\nORDER BY u.id\nLIMIT 5"
    );
}

#[test]
fn format_update_and_insert() {
    assert_eq!(
        clean_and_format_sql("update t set a = 1 where b = 2"),
        "UPDATE t\nSET a = 1\nWHERE b = 2"
    );
    assert_eq!(
        clean_and_format_sql("insert into t (a) values (1) on duplicate key update a = values(a)"),
        "INSERT INTO t (a)\nVALUES (1) ON duplicate key UPDATE a = VALUES(a)"
    );
}

#[test]
fn format_output_still_parses() {
    let formatted = clean_and_format_sql(
        "select * from a left join b on a.id = b.a_id where a.x in (select x from c) order by a.id",
    );
    assert_eq!(parse(&formatted), parse(&clean_sql(&formatted)));
}
