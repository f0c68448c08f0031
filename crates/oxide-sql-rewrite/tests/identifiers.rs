//! Tests for identifier comparison.

use oxide_sql_rewrite::identifiers_equal;

#[test]
fn equal_ignoring_quotes() {
    assert!(identifiers_equal("`users`", "users"));
    assert!(identifiers_equal("\"users\"", "`users`"));
    assert!(identifiers_equal("'users'", "users"));
}

#[test]
fn equal_ignoring_case_and_whitespace() {
    assert!(identifiers_equal("Users", "USERS"));
    assert!(identifiers_equal("  users\t", "users"));
    assert!(identifiers_equal("`  Users `", "users"));
}

#[test]
fn nested_quote_layers() {
    assert!(identifiers_equal("\"`users`\"", "users"));
    assert!(identifiers_equal("'\"`users`\"'", "`USERS`"));
}

#[test]
fn different_identifiers() {
    assert!(!identifiers_equal("users", "user"));
    assert!(!identifiers_equal("`users`", "orders"));
    assert!(!identifiers_equal("shop.users", "users"));
}

#[test]
fn empty_identifiers() {
    assert!(identifiers_equal("", "``"));
    assert!(!identifiers_equal("", "a"));
}

#[test]
fn symmetric() {
    let pairs = [("`a`", "A"), ("b", "\"B\""), ("c", "d"), (" 'e' ", "e")];
    for (a, b) in pairs {
        assert_eq!(identifiers_equal(a, b), identifiers_equal(b, a), "{a} / {b}");
    }
}
