//! Expression AST types.

use serde::Serialize;

use super::condition::InValues;
use super::statement::Statement;

/// A reference to a column, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnRef {
    /// The qualifier as written (`u` in `u.id`).
    pub table_alias: Option<String>,
    /// The column name as written.
    pub column: String,
}

impl ColumnRef {
    /// Creates an unqualified column reference.
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table_alias: None,
            column: column.into(),
        }
    }

    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(table_alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table_alias: Some(table_alias.into()),
            column: column.into(),
        }
    }
}

/// A literal value, kept in its source spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Numeric literal (`42`, `1.50`, `0x1F`).
    Number(String),
    /// String or blob literal including its quotes (`'it''s'`).
    String(String),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    LtGt,
    NullSafeEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,

    // Bitwise
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::LtGt => "<>",
            Self::NullSafeEq => "<=>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns true for `=`, `!=`, `<>`, `<=>`, `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::LtGt
                | Self::NullSafeEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The function name as written.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

/// An SQL expression.
///
/// Used for operands of conditions, select items, SET/VALUES values,
/// grouping, ordering and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),
    /// A column reference.
    Column(ColumnRef),
    /// A positional `?` placeholder.
    Parameter,
    /// `*` or `table.*`.
    Wildcard {
        /// Qualifier for `table.*`.
        table: Option<String>,
    },
    /// Binary operation.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Parenthesized expression.
    Paren(Box<Expr>),
    /// Function call.
    Function(FunctionCall),
    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },
    /// `CAST(expr AS type)`; the type is kept as written.
    Cast { expr: Box<Expr>, data_type: String },
    /// Scalar subquery.
    Subquery(Box<Statement>),
    /// `[NOT] EXISTS (subquery)`
    Exists {
        subquery: Box<Statement>,
        negated: bool,
    },
    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },
    /// `expr [NOT] IN (...)`
    In {
        expr: Box<Expr>,
        values: InValues,
        negated: bool,
    },
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    /// `expr [NOT] LIKE pattern`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
}

impl Expr {
    /// Creates an unqualified column expression.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    /// Returns true if a `?` placeholder or a subquery occurs anywhere in
    /// this expression.
    #[must_use]
    pub fn has_parameter_or_subquery(&self) -> bool {
        match self {
            Self::Parameter | Self::Subquery(_) | Self::Exists { .. } => true,
            Self::Literal(_) | Self::Column(_) | Self::Wildcard { .. } => false,
            Self::Binary { left, right, .. } => {
                left.has_parameter_or_subquery() || right.has_parameter_or_subquery()
            }
            Self::Unary { operand: expr, .. }
            | Self::Paren(expr)
            | Self::Cast { expr, .. }
            | Self::IsNull { expr, .. } => expr.has_parameter_or_subquery(),
            Self::Function(call) => call.args.iter().any(Self::has_parameter_or_subquery),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                operand.as_ref().is_some_and(|e| e.has_parameter_or_subquery())
                    || when_clauses.iter().any(|(w, t)| {
                        w.has_parameter_or_subquery() || t.has_parameter_or_subquery()
                    })
                    || else_clause
                        .as_ref()
                        .is_some_and(|e| e.has_parameter_or_subquery())
            }
            Self::In { expr, values, .. } => {
                expr.has_parameter_or_subquery()
                    || match values {
                        InValues::List(list) => list.iter().any(Self::has_parameter_or_subquery),
                        InValues::Subquery(_) => true,
                    }
            }
            Self::Between {
                expr, low, high, ..
            } => {
                expr.has_parameter_or_subquery()
                    || low.has_parameter_or_subquery()
                    || high.has_parameter_or_subquery()
            }
            Self::Like { expr, pattern, .. } => {
                expr.has_parameter_or_subquery() || pattern.has_parameter_or_subquery()
            }
        }
    }
}
