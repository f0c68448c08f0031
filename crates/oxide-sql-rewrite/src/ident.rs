//! Quote-, case- and whitespace-insensitive identifier comparison.

const QUOTES: [char; 3] = ['`', '"', '\''];

/// Strips every layer of matching or mismatched surrounding quotes and
/// whitespace from one side of a comparison.
fn normalize(ident: &str) -> String {
    let mut s = ident.trim();
    loop {
        let inner = s.strip_prefix(QUOTES).unwrap_or(s);
        let inner = inner.strip_suffix(QUOTES).unwrap_or(inner).trim();
        if inner.len() == s.len() {
            break;
        }
        s = inner;
    }
    s.to_uppercase()
}

/// Compares two identifiers ignoring quoting style, surrounding whitespace
/// and letter case.
///
/// Structural de-duplication (table sets, merge) compares raw spellings;
/// use this where differently quoted names must match.
///
/// # Example
///
/// ```rust
/// use oxide_sql_rewrite::identifiers_equal;
///
/// assert!(identifiers_equal("`Users`", "USERS"));
/// assert!(identifiers_equal("\"`orders`\"", " orders "));
/// assert!(!identifiers_equal("users", "posts"));
/// ```
#[must_use]
pub fn identifiers_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_and_case() {
        assert!(identifiers_equal("`Users`", "USERS"));
        assert!(identifiers_equal("\"users\"", "'Users'"));
        assert!(!identifiers_equal("users", "posts"));
    }

    #[test]
    fn test_nested_quotes_and_whitespace() {
        assert!(identifiers_equal("\"`users`\"", "users"));
        assert!(identifiers_equal(" ` users ` ", "USERS"));
    }

    #[test]
    fn test_sides_are_independent() {
        assert!(identifiers_equal("`users", "users`"));
    }

    #[test]
    fn test_empty() {
        assert!(identifiers_equal("``", ""));
        assert!(!identifiers_equal("``", "a"));
    }
}
