//! Abstract Syntax Tree (AST) types for SQL statements.
//!
//! The tree is built once by the [`parser`](crate::parser) and never
//! mutated afterwards; the merge engine produces new trees instead.

mod condition;
mod expression;
mod statement;

pub use condition::{ComparisonOp, Condition, InValues, LogicalOp};
pub use expression::{BinaryOp, ColumnRef, Expr, FunctionCall, Literal, UnaryOp};
pub use statement::{
    Assignment, Cte, DeleteStatement, InsertStatement, JoinClause, JoinType, Limit, LimitStyle,
    OrderBy, OrderDirection, SelectColumn, SelectStatement, Statement, StatementKind,
    TableSource, UpdateStatement, With,
};
