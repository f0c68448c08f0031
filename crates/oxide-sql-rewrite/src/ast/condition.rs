//! Condition trees for WHERE, ON and HAVING clauses.

use super::expression::{ColumnRef, Expr};
use super::statement::Statement;

/// Logical connective between two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl LogicalOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Binding strength; `AND` binds tighter than `OR`.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
        }
    }
}

/// Comparison operator of a [`Condition::Comparison`] leaf.
///
/// `<>` and `!=` are kept apart so rendering preserves what was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    LtGt,
    NullSafeEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::LtGt => "<>",
            Self::NullSafeEq => "<=>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Right-hand side of an `IN` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InValues {
    /// `IN (a, b, ?)`
    List(Vec<Expr>),
    /// `IN (SELECT ...)`
    Subquery(Box<Statement>),
}

/// A condition tree.
///
/// Leaves name a single column on their left-hand side, except for
/// [`Condition::Predicate`]. Parents own their children exclusively, so the
/// tree has no sharing and no cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `left AND right` / `left OR right`
    Logical {
        op: LogicalOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },
    /// `NOT (condition)`
    Not(Box<Condition>),
    /// `left op right`
    Comparison {
        left: ColumnRef,
        op: ComparisonOp,
        right: Expr,
    },
    /// `left [NOT] BETWEEN start AND end`
    Between {
        left: ColumnRef,
        start: Expr,
        end: Expr,
        negated: bool,
    },
    /// `left [NOT] IN (...)`
    In {
        left: ColumnRef,
        values: InValues,
        negated: bool,
    },
    /// `left IS [NOT] NULL`
    Null { left: ColumnRef, negated: bool },
    /// `left [NOT] LIKE pattern`
    Like {
        left: ColumnRef,
        pattern: Expr,
        negated: bool,
    },
    /// `[NOT] EXISTS (subquery)`
    Exists {
        subquery: Box<Statement>,
        negated: bool,
    },
    /// A predicate whose left operand holds a placeholder or subquery
    /// (`? = owner`, `a + ? > 1`), kept as a whole expression.
    Predicate(Expr),
}

impl Condition {
    /// Joins two conditions with a logical operator.
    #[must_use]
    pub fn logical(op: LogicalOp, left: Self, right: Self) -> Self {
        Self::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left AND right`
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::logical(LogicalOp::And, left, right)
    }

    /// `left OR right`
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::logical(LogicalOp::Or, left, right)
    }

    /// The column on the left-hand side of a leaf.
    #[must_use]
    pub const fn column(&self) -> Option<&ColumnRef> {
        match self {
            Self::Comparison { left, .. }
            | Self::Between { left, .. }
            | Self::In { left, .. }
            | Self::Null { left, .. }
            | Self::Like { left, .. } => Some(left),
            Self::Logical { .. } | Self::Not(_) | Self::Exists { .. } | Self::Predicate(_) => {
                None
            }
        }
    }

    /// Returns the leaves of the tree in source order.
    ///
    /// Walks with an explicit stack, so long `AND`/`OR` chains do not grow
    /// the call stack.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Logical { left, right, .. } => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
                Self::Not(inner) => stack.push(inner.as_ref()),
                leaf => out.push(leaf),
            }
        }
        out
    }
}
