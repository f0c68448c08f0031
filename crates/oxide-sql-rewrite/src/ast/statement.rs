//! SQL statement AST types.

use super::condition::Condition;
use super::expression::{ColumnRef, Expr};

/// The four supported statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
}

/// How a LIMIT clause was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitStyle {
    /// `LIMIT count [OFFSET offset]`
    #[default]
    Offset,
    /// `LIMIT offset, count` (MySQL); the offset comes first.
    Comma,
}

/// A LIMIT clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    /// Maximum number of rows.
    pub count: Expr,
    /// Rows to skip.
    pub offset: Option<Expr>,
    /// Written form, which also fixes the binding order of placeholders.
    pub style: LimitStyle,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN (also plain JOIN).
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
    /// `FROM a, b`
    Comma,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Comma => ",",
        }
    }
}

/// A table reference in a FROM, JOIN, UPDATE, DELETE or INSERT position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    /// A named table.
    Table {
        /// Schema name (optional).
        schema: Option<String>,
        /// Table name.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Box<Statement>,
        /// Alias.
        alias: Option<String>,
    },
}

impl TableSource {
    /// Creates a simple table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Adds an alias to this table reference.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table { schema, name, .. } => Self::Table {
                schema,
                name,
                alias: Some(alias.into()),
            },
            Self::Subquery { query, .. } => Self::Subquery {
                query,
                alias: Some(alias.into()),
            },
        }
    }

    /// The table name, schema-qualified when a schema was written.
    /// `None` for derived tables.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Self::Table {
                schema: Some(schema),
                name,
                ..
            } => Some(format!("{schema}.{name}")),
            Self::Table { name, .. } => Some(name.clone()),
            Self::Subquery { .. } => None,
        }
    }

    /// The alias, if one was written.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Self::Table { alias, .. } | Self::Subquery { alias, .. } => alias.as_deref(),
        }
    }

    /// The name other clauses use to refer to this source: the alias if
    /// present, otherwise the bare table name.
    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Table { name, alias, .. } => Some(alias.as_deref().unwrap_or(name)),
            Self::Subquery { alias, .. } => alias.as_deref(),
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The table to join.
    pub table: TableSource,
    /// The join condition.
    pub on: Option<Condition>,
    /// USING columns (alternative to ON).
    pub using: Vec<String>,
}

/// A named subquery of a WITH clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cte {
    /// The CTE name.
    pub name: String,
    /// Optional column list.
    pub columns: Vec<String>,
    /// The defining query.
    pub query: Box<Statement>,
}

/// A WITH clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct With {
    /// Whether RECURSIVE was specified.
    pub recursive: bool,
    /// The CTEs in declaration order.
    pub ctes: Vec<Cte>,
}

/// A column in SELECT clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<String>,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    /// Leading WITH clause.
    pub with: Option<With>,
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// The main table of the FROM clause.
    pub from: TableSource,
    /// Joined tables, in source order.
    pub joins: Vec<JoinClause>,
    /// The WHERE clause.
    pub where_clause: Option<Condition>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Condition>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Limit>,
}

/// An assignment in UPDATE SET or ON DUPLICATE KEY UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Target column.
    pub column: ColumnRef,
    /// Value expression.
    pub value: Expr,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Target table (never a derived table, never aliased).
    pub table: TableSource,
    /// Column names (optional).
    pub columns: Vec<String>,
    /// VALUES rows.
    pub rows: Vec<Vec<Expr>>,
    /// ON DUPLICATE KEY UPDATE assignments.
    pub on_duplicate: Vec<Assignment>,
}

impl InsertStatement {
    /// Pairs each value with its declared column, row by row.
    pub fn column_values(&self) -> impl Iterator<Item = (Option<&str>, &Expr)> {
        self.rows.iter().flat_map(move |row| {
            row.iter()
                .enumerate()
                .map(move |(i, value)| (self.columns.get(i).map(String::as_str), value))
        })
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: TableSource,
    /// Joined tables (MySQL multi-table UPDATE).
    pub joins: Vec<JoinClause>,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE clause.
    pub where_clause: Option<Condition>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Limit>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStatement {
    /// Tables to delete from in `DELETE t1, t2 FROM ...` (MySQL).
    pub targets: Vec<String>,
    /// The table of the FROM clause.
    pub table: TableSource,
    /// Joined tables.
    pub joins: Vec<JoinClause>,
    /// WHERE clause.
    pub where_clause: Option<Condition>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Limit>,
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// SELECT statement.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
}

impl Statement {
    /// The statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
        }
    }

    /// The main table.
    #[must_use]
    pub const fn table(&self) -> &TableSource {
        match self {
            Self::Select(s) => &s.from,
            Self::Insert(i) => &i.table,
            Self::Update(u) => &u.table,
            Self::Delete(d) => &d.table,
        }
    }

    /// Joined tables in source order; always empty for INSERT.
    #[must_use]
    pub fn joins(&self) -> &[JoinClause] {
        match self {
            Self::Select(s) => &s.joins,
            Self::Insert(_) => &[],
            Self::Update(u) => &u.joins,
            Self::Delete(d) => &d.joins,
        }
    }

    /// The WHERE tree, if any.
    #[must_use]
    pub const fn where_clause(&self) -> Option<&Condition> {
        match self {
            Self::Select(s) => s.where_clause.as_ref(),
            Self::Insert(_) => None,
            Self::Update(u) => u.where_clause.as_ref(),
            Self::Delete(d) => d.where_clause.as_ref(),
        }
    }
}
