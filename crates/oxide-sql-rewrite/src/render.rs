//! SQL text rendering.
//!
//! Every AST node implements [`Display`](fmt::Display). Output is canonical:
//! upper-case keywords, single spaces, operators surrounded by spaces, table
//! aliases without `AS` and column aliases with `AS`. Identifiers, literals
//! and CAST types are written exactly as they were parsed.

use core::fmt;

use crate::ast::{
    Assignment, BinaryOp, ColumnRef, Condition, Cte, DeleteStatement, Expr, FunctionCall,
    InValues, InsertStatement, JoinClause, JoinType, Limit, LimitStyle, Literal, LogicalOp,
    OrderBy, OrderDirection, SelectColumn, SelectStatement, Statement, TableSource, UnaryOp,
    UpdateStatement, With,
};

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

const fn not_prefix(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_alias {
            Some(qualifier) => write!(f, "{qualifier}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(n),
            Self::String(s) => f.write_str(s),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.args)?;
        f.write_str(")")
    }
}

impl fmt::Display for InValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match self {
            Self::List(values) => write_list(f, values)?,
            Self::Subquery(query) => write!(f, "{query}")?,
        }
        f.write_str(")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Parameter => f.write_str("?"),
            Self::Wildcard { table: Some(t) } => write!(f, "{t}.*"),
            Self::Wildcard { table: None } => f.write_str("*"),
            Self::Binary { left, op, right } => {
                // Left-deep chains (`a + b + c`) render without recursing
                // down the spine.
                let mut tail = vec![(op, right.as_ref())];
                let mut leftmost = left.as_ref();
                while let Self::Binary { left, op, right } = leftmost {
                    tail.push((op, right.as_ref()));
                    leftmost = left.as_ref();
                }
                write!(f, "{leftmost}")?;
                for (op, right) in tail.into_iter().rev() {
                    write!(f, " {op} {right}")?;
                }
                Ok(())
            }
            Self::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "NOT {operand}"),
            Self::Unary { op, operand } => write!(f, "{}{operand}", op.as_str()),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Function(call) => write!(f, "{call}"),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {operand}")?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(else_clause) = else_clause {
                    write!(f, " ELSE {else_clause}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Exists { subquery, negated } => {
                write!(f, "{}EXISTS ({subquery})", not_prefix(*negated))
            }
            Self::IsNull { expr, negated } => {
                write!(f, "{expr} IS {}NULL", not_prefix(*negated))
            }
            Self::In {
                expr,
                values,
                negated,
            } => write!(f, "{expr} {}IN {values}", not_prefix(*negated)),
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => write!(
                f,
                "{expr} {}BETWEEN {low} AND {high}",
                not_prefix(*negated)
            ),
            Self::Like {
                expr,
                pattern,
                negated,
            } => write!(f, "{expr} {}LIKE {pattern}", not_prefix(*negated)),
        }
    }
}

impl Condition {
    /// Writes a child of a logical node, parenthesized when it binds
    /// looser than its parent.
    fn fmt_operand(&self, parent: LogicalOp, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical { op, .. } if op.precedence() < parent.precedence() => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical { op, left, right } => {
                // Walk the left spine of same-operator nodes without recursing,
                // so long AND/OR chains render in constant stack depth.
                let mut rights = vec![right.as_ref()];
                let mut leftmost = left.as_ref();
                while let Self::Logical {
                    op: inner_op,
                    left: inner_left,
                    right: inner_right,
                } = leftmost
                {
                    if inner_op != op {
                        break;
                    }
                    rights.push(inner_right.as_ref());
                    leftmost = inner_left.as_ref();
                }

                leftmost.fmt_operand(*op, f)?;
                for operand in rights.into_iter().rev() {
                    write!(f, " {} ", op.as_str())?;
                    match operand {
                        // A same-operator right child must keep its grouping.
                        Self::Logical { op: inner_op, .. } if inner_op == op => {
                            write!(f, "({operand})")?;
                        }
                        _ => operand.fmt_operand(*op, f)?,
                    }
                }
                Ok(())
            }
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::Comparison { left, op, right } => {
                write!(f, "{left} {} {right}", op.as_str())
            }
            Self::Between {
                left,
                start,
                end,
                negated,
            } => write!(
                f,
                "{left} {}BETWEEN {start} AND {end}",
                not_prefix(*negated)
            ),
            Self::In {
                left,
                values,
                negated,
            } => write!(f, "{left} {}IN {values}", not_prefix(*negated)),
            Self::Null { left, negated } => {
                write!(f, "{left} IS {}NULL", not_prefix(*negated))
            }
            Self::Like {
                left,
                pattern,
                negated,
            } => write!(f, "{left} {}LIKE {pattern}", not_prefix(*negated)),
            Self::Exists { subquery, negated } => {
                write!(f, "{}EXISTS ({subquery})", not_prefix(*negated))
            }
            Self::Predicate(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table {
                schema,
                name,
                alias,
            } => {
                if let Some(schema) = schema {
                    write!(f, "{schema}.")?;
                }
                f.write_str(name)?;
                if let Some(alias) = alias {
                    write!(f, " {alias}")?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => {
                write!(f, "({query})")?;
                if let Some(alias) = alias {
                    write!(f, " {alias}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.join_type == JoinType::Comma {
            return write!(f, ", {}", self.table);
        }
        write!(f, " {} {}", self.join_type.as_str(), self.table)?;
        if let Some(on) = &self.on {
            write!(f, " ON {on}")?;
        }
        if !self.using.is_empty() {
            f.write_str(" USING (")?;
            write_list(f, &self.using)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.direction == OrderDirection::Desc {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.offset, self.style) {
            (Some(offset), LimitStyle::Comma) => write!(f, "LIMIT {offset}, {}", self.count),
            (Some(offset), LimitStyle::Offset) => {
                write!(f, "LIMIT {} OFFSET {offset}", self.count)
            }
            (None, _) => write!(f, "LIMIT {}", self.count),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            write_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        write!(f, " AS ({})", self.query)
    }
}

impl fmt::Display for With {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive {
            f.write_str("RECURSIVE ")?;
        }
        write_list(f, &self.ctes)
    }
}

/// Writes the ` WHERE`, ` ORDER BY` and ` LIMIT` tail shared by all
/// statements but INSERT.
fn write_tail(
    f: &mut fmt::Formatter<'_>,
    where_clause: Option<&Condition>,
    order_by: &[OrderBy],
    limit: Option<&Limit>,
) -> fmt::Result {
    if let Some(cond) = where_clause {
        write!(f, " WHERE {cond}")?;
    }
    if !order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        write_list(f, order_by)?;
    }
    if let Some(limit) = limit {
        write!(f, " {limit}")?;
    }
    Ok(())
}

fn write_joins(f: &mut fmt::Formatter<'_>, joins: &[JoinClause]) -> fmt::Result {
    for join in joins {
        write!(f, "{join}")?;
    }
    Ok(())
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.columns)?;
        write!(f, " FROM {}", self.from)?;
        write_joins(f, &self.joins)?;
        if let Some(cond) = &self.where_clause {
            write!(f, " WHERE {cond}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        write_tail(f, None, &self.order_by, self.limit.as_ref())
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            write_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        f.write_str(" VALUES ")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("(")?;
            write_list(f, row)?;
            f.write_str(")")?;
        }
        if !self.on_duplicate.is_empty() {
            f.write_str(" ON DUPLICATE KEY UPDATE ")?;
            write_list(f, &self.on_duplicate)?;
        }
        Ok(())
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}", self.table)?;
        write_joins(f, &self.joins)?;
        f.write_str(" SET ")?;
        write_list(f, &self.assignments)?;
        write_tail(
            f,
            self.where_clause.as_ref(),
            &self.order_by,
            self.limit.as_ref(),
        )
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DELETE ")?;
        if !self.targets.is_empty() {
            write_list(f, &self.targets)?;
            f.write_str(" ")?;
        }
        write!(f, "FROM {}", self.table)?;
        write_joins(f, &self.joins)?;
        write_tail(
            f,
            self.where_clause.as_ref(),
            &self.order_by,
            self.limit.as_ref(),
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(i) => write!(f, "{i}"),
            Self::Update(u) => write!(f, "{u}"),
            Self::Delete(d) => write!(f, "{d}"),
        }
    }
}

impl Statement {
    /// Renders the statement as SQL text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}
