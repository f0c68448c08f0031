//! Parser and rewriter configuration.

use serde::{Deserialize, Serialize};

/// Default maximum nesting of subqueries and parenthesized groups.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum number of operands in one operator or AND/OR chain.
pub const DEFAULT_MAX_TERMS: usize = 2048;

/// Settings shared by the parser and the rewrite operations.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Maximum nesting of subqueries, parenthesized conditions and
    /// expressions. Deeper input fails with a `TooDeep` parse error.
    pub max_depth: usize,
    /// Maximum number of operands in one chain of binary operators
    /// (`a + b + ...`) or of AND/OR conditions. Longer chains fail with a
    /// `TooDeep` parse error.
    pub max_terms: usize,
    /// Reject unrecognized WHERE/ON/HAVING segments instead of dropping them.
    pub strict_conditions: bool,
}

impl RewriteConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_terms: DEFAULT_MAX_TERMS,
            strict_conditions: false,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum operator chain length.
    #[must_use]
    pub const fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Sets strict condition parsing.
    #[must_use]
    pub const fn with_strict_conditions(mut self, strict: bool) -> Self {
        self.strict_conditions = strict;
        self
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self::new()
    }
}
