//! SQL Parser implementation.

use tracing::{trace, warn};

use super::error::{ParseError, ParseErrorKind};
use super::pratt::{
    infix_binding_power, prefix_binding_power, token_to_binary_op, token_to_unary_op, OPERAND_BP,
};
use crate::ast::{
    Assignment, ColumnRef, Cte, DeleteStatement, Expr, FunctionCall, InValues, InsertStatement,
    JoinClause, JoinType, Limit, LimitStyle, Literal, OrderBy, OrderDirection, SelectColumn,
    SelectStatement, Statement, TableSource, UpdateStatement, With,
};
use crate::cleaner::{self, ScanState};
use crate::config::RewriteConfig;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Parser position saved for backtracking.
#[derive(Debug, Clone, Copy)]
pub(super) struct Checkpoint {
    pos: usize,
    depth: usize,
}

/// SQL Parser.
///
/// The input is run through the [`cleaner`](crate::cleaner) first, so
/// comments and redundant whitespace never reach the grammar. Spans in
/// errors point into the cleaned text.
pub struct Parser {
    /// Cleaned SQL text.
    pub(super) source: String,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    /// Current subquery/parenthesis nesting.
    pub(super) depth: usize,
    pub(super) config: RewriteConfig,
    /// Problem found by the cleaner (unclosed comment or quote).
    scan_error: Option<ParseError>,
}

impl Parser {
    /// Creates a new parser for the given input with the default configuration.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::with_config(input, RewriteConfig::default())
    }

    /// Creates a new parser for the given input.
    #[must_use]
    pub fn with_config(input: &str, config: RewriteConfig) -> Self {
        let scanned = cleaner::scan_clean(input);
        let end = Span::new(scanned.text.len(), scanned.text.len());
        let scan_error = match scanned.state {
            ScanState::Normal | ScanState::LineComment => None,
            ScanState::SingleQuote => Some(ParseError::unterminated("string literal", end)),
            ScanState::DoubleQuote | ScanState::Backtick => {
                Some(ParseError::unterminated("quoted identifier", end))
            }
            ScanState::BlockComment(_) => Some(ParseError::unterminated("block comment", end)),
        };
        let tokens = Lexer::new(&scanned.text).tokenize();
        Self {
            source: scanned.text,
            tokens,
            pos: 0,
            depth: 0,
            config,
            scan_error,
        }
    }

    /// The cleaned text this parser works on.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parses a single SQL statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a supported statement, a
    /// statement-defining clause is missing, a literal or comment is left
    /// open, or nesting exceeds the configured depth.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        trace!(len = self.source.len(), "parsing statement");
        if let Some(err) = self.scan_error.take() {
            return Err(err);
        }
        if let Some((message, span)) = self.tokens.iter().find_map(|t| match &t.kind {
            TokenKind::Error(message) => Some((message.clone(), t.span)),
            _ => None,
        }) {
            let unterminated = message.starts_with("Unterminated");
            let mut err = ParseError::new(message, span);
            if unterminated {
                err.kind = ParseErrorKind::Unterminated;
            }
            return Err(err);
        }

        let statement = match &self.current().kind {
            TokenKind::Keyword(Keyword::Select | Keyword::With) => {
                Statement::Select(self.parse_select_statement()?)
            }
            TokenKind::Keyword(Keyword::Insert) => {
                Statement::Insert(self.parse_insert_statement()?)
            }
            TokenKind::Keyword(Keyword::Update) => {
                Statement::Update(self.parse_update_statement()?)
            }
            TokenKind::Keyword(Keyword::Delete) => {
                Statement::Delete(self.parse_delete_statement()?)
            }
            TokenKind::Keyword(kw) if kw.is_ddl() => {
                return Err(ParseError::unsupported_statement(
                    kw.as_str(),
                    self.current().span,
                ));
            }
            _ => {
                return Err(ParseError::unexpected(
                    "SELECT, INSERT, UPDATE, or DELETE",
                    self.current().kind.clone(),
                    self.current().span,
                ));
            }
        };

        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.current().is_eof() {
            return Err(ParseError::unexpected(
                "end of statement",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        Ok(statement)
    }

    /// Parses a SELECT statement, including a leading WITH clause.
    fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        let with = if self.check_keyword(Keyword::With) {
            Some(self.parse_with()?)
        } else {
            None
        };

        self.expect_keyword(Keyword::Select)?;

        // DISTINCT or ALL
        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            if self.check_keyword(Keyword::All) {
                self.advance();
            }
            false
        };

        let columns = self.parse_select_columns()?;

        if !self.check_keyword(Keyword::From) {
            return Err(ParseError::missing_clause(
                "FROM",
                "SELECT",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        self.advance();
        let from = self.parse_table_source()?;
        let joins = self.parse_joins()?;

        let where_clause = self.parse_where()?;

        // GROUP BY clause
        let group_by = if self.check_keyword(Keyword::Group) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        // HAVING clause
        let having = if self.check_keyword(Keyword::Having) {
            self.advance();
            self.parse_condition()?
        } else {
            None
        };

        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(SelectStatement {
            with,
            distinct,
            columns,
            from,
            joins,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
        })
    }

    /// Parses `WITH [RECURSIVE] name [(cols)] AS (query), ...`.
    fn parse_with(&mut self) -> Result<With, ParseError> {
        self.expect_keyword(Keyword::With)?;
        let recursive = if self.check_keyword(Keyword::Recursive) {
            self.advance();
            true
        } else {
            false
        };

        let mut ctes = vec![];
        loop {
            let name = self.expect_identifier()?;
            let columns = if self.check(&TokenKind::LeftParen) {
                self.advance();
                let cols = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                cols
            } else {
                vec![]
            };
            self.expect_keyword(Keyword::As)?;
            self.expect(&TokenKind::LeftParen)?;
            let query = self.parse_subquery()?;
            self.expect(&TokenKind::RightParen)?;
            ctes.push(Cte {
                name,
                columns,
                query,
            });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(With { recursive, ctes })
    }

    /// Parses a nested SELECT; the opening parenthesis is already consumed.
    pub(super) fn parse_subquery(&mut self) -> Result<Box<Statement>, ParseError> {
        self.enter()?;
        let query = self.parse_select_statement()?;
        self.leave();
        Ok(Box::new(Statement::Select(query)))
    }

    /// Parses SELECT columns.
    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];

        loop {
            let expr = self.parse_expression(0)?;

            // Check for alias (AS name or just name)
            let alias = if self.check_keyword(Keyword::As) {
                self.advance();
                Some(self.expect_identifier()?)
            } else if matches!(&self.current().kind, TokenKind::Identifier(_)) {
                Some(self.expect_identifier()?)
            } else {
                None
            };

            columns.push(SelectColumn { expr, alias });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(columns)
    }

    /// Parses a table reference: a (schema-qualified) name or a derived table.
    fn parse_table_source(&mut self) -> Result<TableSource, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
                let query = self.parse_subquery()?;
                self.expect(&TokenKind::RightParen)?;
                let alias = self.parse_optional_alias()?;
                return Ok(TableSource::Subquery { query, alias });
            }
            self.enter()?;
            let inner = self.parse_table_source()?;
            self.leave();
            self.expect(&TokenKind::RightParen)?;
            return Ok(inner);
        }

        let first = self.expect_identifier()?;
        let (schema, name) = if self.check(&TokenKind::Dot) {
            self.advance();
            let table_name = self.expect_identifier()?;
            (Some(first), table_name)
        } else {
            (None, first)
        };

        let alias = self.parse_optional_alias()?;

        Ok(TableSource::Table {
            schema,
            name,
            alias,
        })
    }

    /// Parses the JOIN list following a main table, including comma joins.
    fn parse_joins(&mut self) -> Result<Vec<JoinClause>, ParseError> {
        let mut joins = vec![];

        loop {
            let join_type = if self.check(&TokenKind::Comma) {
                self.advance();
                JoinType::Comma
            } else if self.is_join_keyword() {
                self.parse_join_type()?
            } else {
                break;
            };

            let table = self.parse_table_source()?;

            let (on, using) = if matches!(join_type, JoinType::Comma) {
                (None, vec![])
            } else if self.check_keyword(Keyword::On) {
                self.advance();
                (self.parse_condition()?, vec![])
            } else if self.check_keyword(Keyword::Using) {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                (None, cols)
            } else {
                (None, vec![])
            };

            joins.push(JoinClause {
                join_type,
                table,
                on,
                using,
            });
        }

        Ok(joins)
    }

    /// Checks if current token is a join keyword.
    fn is_join_keyword(&self) -> bool {
        matches!(
            &self.current().kind,
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    /// Parses a join type.
    fn parse_join_type(&mut self) -> Result<JoinType, ParseError> {
        let join_type = match &self.current().kind {
            TokenKind::Keyword(Keyword::Join) => {
                self.advance();
                return Ok(JoinType::Inner);
            }
            TokenKind::Keyword(Keyword::Inner) => JoinType::Inner,
            TokenKind::Keyword(Keyword::Left) => JoinType::Left,
            TokenKind::Keyword(Keyword::Right) => JoinType::Right,
            TokenKind::Keyword(Keyword::Full) => JoinType::Full,
            TokenKind::Keyword(Keyword::Cross) => JoinType::Cross,
            _ => {
                return Err(ParseError::unexpected(
                    "JOIN keyword",
                    self.current().kind.clone(),
                    self.current().span,
                ));
            }
        };
        self.advance();
        if matches!(join_type, JoinType::Left | JoinType::Right | JoinType::Full)
            && self.check_keyword(Keyword::Outer)
        {
            self.advance();
        }
        self.expect_keyword(Keyword::Join)?;
        Ok(join_type)
    }

    /// Parses an optional table alias.
    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else if matches!(&self.current().kind, TokenKind::Identifier(_)) {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parses an optional WHERE clause.
    fn parse_where(&mut self) -> Result<Option<crate::ast::Condition>, ParseError> {
        if self.check_keyword(Keyword::Where) {
            self.advance();
            self.parse_condition()
        } else {
            Ok(None)
        }
    }

    /// Parses an INSERT statement.
    fn parse_insert_statement(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        if !self.check_keyword(Keyword::Into) {
            return Err(ParseError::missing_clause(
                "INTO",
                "INSERT",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        self.advance();

        let first = self.expect_identifier()?;
        let (schema, name) = if self.check(&TokenKind::Dot) {
            self.advance();
            (Some(first), self.expect_identifier()?)
        } else {
            (None, first)
        };

        // Column list (optional)
        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
            cols
        } else {
            vec![]
        };

        if !self.check_keyword(Keyword::Values) {
            return Err(ParseError::missing_clause(
                "VALUES",
                "INSERT",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        self.advance();

        let mut rows = vec![];
        loop {
            self.expect(&TokenKind::LeftParen)?;
            let row = if self.check(&TokenKind::RightParen) {
                vec![]
            } else {
                self.parse_expression_list()?
            };
            self.expect(&TokenKind::RightParen)?;
            rows.push(row);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        // ON DUPLICATE KEY UPDATE (MySQL)
        let on_duplicate = if self.check_keyword(Keyword::On) {
            self.advance();
            self.expect_word("DUPLICATE")?;
            self.expect_word("KEY")?;
            self.expect_keyword(Keyword::Update)?;
            self.parse_assignments()?
        } else {
            vec![]
        };

        Ok(InsertStatement {
            table: TableSource::Table {
                schema,
                name,
                alias: None,
            },
            columns,
            rows,
            on_duplicate,
        })
    }

    /// Parses an UPDATE statement.
    fn parse_update_statement(&mut self) -> Result<UpdateStatement, ParseError> {
        self.expect_keyword(Keyword::Update)?;

        let table = self.parse_table_source()?;
        let joins = self.parse_joins()?;

        if !self.check_keyword(Keyword::Set) {
            return Err(ParseError::missing_clause(
                "SET",
                "UPDATE",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        self.advance();
        let assignments = self.parse_assignments()?;

        let where_clause = self.parse_where()?;
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(UpdateStatement {
            table,
            joins,
            assignments,
            where_clause,
            order_by,
            limit,
        })
    }

    /// Parses `col = expr, ...` of SET / ON DUPLICATE KEY UPDATE.
    fn parse_assignments(&mut self) -> Result<Vec<Assignment>, ParseError> {
        let mut assignments = vec![];
        loop {
            let column = self.parse_column_ref()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            assignments.push(Assignment { column, value });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(assignments)
    }

    /// Parses a DELETE statement.
    fn parse_delete_statement(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_keyword(Keyword::Delete)?;

        // DELETE t1, t2 FROM ... (MySQL)
        let mut targets = vec![];
        while let TokenKind::Identifier(name) = &self.current().kind {
            targets.push(name.clone());
            self.advance();
            if self.check(&TokenKind::Dot) && matches!(self.peek_kind(1), TokenKind::Star) {
                self.advance();
                self.advance();
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        if !self.check_keyword(Keyword::From) {
            return Err(ParseError::missing_clause(
                "FROM",
                "DELETE",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        self.advance();

        let table = self.parse_table_source()?;
        let joins = self.parse_joins()?;
        let where_clause = self.parse_where()?;
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(DeleteStatement {
            targets,
            table,
            joins,
            where_clause,
            order_by,
            limit,
        })
    }

    /// Parses an optional ORDER BY list.
    fn parse_order_by(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        if !self.check_keyword(Keyword::Order) {
            return Ok(vec![]);
        }
        self.advance();
        self.expect_keyword(Keyword::By)?;

        let mut items = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let direction = if self.check_keyword(Keyword::Desc) {
                self.advance();
                OrderDirection::Desc
            } else {
                if self.check_keyword(Keyword::Asc) {
                    self.advance();
                }
                OrderDirection::Asc
            };

            items.push(OrderBy { expr, direction });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    /// Parses an optional `LIMIT n`, `LIMIT n OFFSET m` or `LIMIT m, n`.
    fn parse_limit(&mut self) -> Result<Option<Limit>, ParseError> {
        if !self.check_keyword(Keyword::Limit) {
            return Ok(None);
        }
        self.advance();

        let first = self.parse_expression(OPERAND_BP)?;
        let limit = if self.check(&TokenKind::Comma) {
            self.advance();
            let count = self.parse_expression(OPERAND_BP)?;
            Limit {
                count,
                offset: Some(first),
                style: LimitStyle::Comma,
            }
        } else if self.check_keyword(Keyword::Offset) {
            self.advance();
            let offset = self.parse_expression(OPERAND_BP)?;
            Limit {
                count: first,
                offset: Some(offset),
                style: LimitStyle::Offset,
            }
        } else {
            Limit {
                count: first,
                offset: None,
                style: LimitStyle::Offset,
            }
        };
        Ok(Some(limit))
    }

    /// Parses an expression using Pratt parsing.
    pub(super) fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        // Parse prefix (primary expression or unary operator)
        let mut lhs = self.parse_prefix()?;
        let mut terms = 1;

        // Parse infix operators
        while let Some((l_bp, r_bp)) = infix_binding_power(&self.current().kind) {
            if l_bp < min_bp {
                break;
            }
            terms = self.count_term(terms)?;

            match &self.current().kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        true
                    } else {
                        false
                    };
                    self.expect_keyword(Keyword::Null)?;
                    lhs = Expr::IsNull {
                        expr: Box::new(lhs),
                        negated,
                    };
                }
                TokenKind::Keyword(Keyword::Not) => {
                    if !matches!(
                        self.peek_kind(1),
                        TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like)
                    ) {
                        break;
                    }
                    self.advance();
                    lhs = self.parse_predicate_suffix(lhs, true, r_bp)?;
                }
                TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like) => {
                    lhs = self.parse_predicate_suffix(lhs, false, r_bp)?;
                }
                _ => {
                    // Standard binary operator
                    let Some(op) = token_to_binary_op(&self.current().kind) else {
                        break;
                    };
                    self.advance();
                    let rhs = self.parse_expression(r_bp)?;
                    lhs = Expr::Binary {
                        left: Box::new(lhs),
                        op,
                        right: Box::new(rhs),
                    };
                }
            }
        }

        Ok(lhs)
    }

    /// Parses the `IN (...)`, `BETWEEN a AND b` or `LIKE p` tail of a
    /// predicate expression.
    fn parse_predicate_suffix(
        &mut self,
        lhs: Expr,
        negated: bool,
        r_bp: u8,
    ) -> Result<Expr, ParseError> {
        let keyword = self.current().as_keyword();
        self.advance();
        let expr = Box::new(lhs);
        match keyword {
            Some(Keyword::In) => Ok(Expr::In {
                expr,
                values: self.parse_in_values()?,
                negated,
            }),
            Some(Keyword::Between) => {
                let low = self.parse_expression(r_bp)?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expression(r_bp)?;
                Ok(Expr::Between {
                    expr,
                    low: Box::new(low),
                    high: Box::new(high),
                    negated,
                })
            }
            _ => Ok(Expr::Like {
                expr,
                pattern: Box::new(self.parse_expression(r_bp)?),
                negated,
            }),
        }
    }

    /// Parses `( expr, ... )` or `( SELECT ... )` after IN.
    pub(super) fn parse_in_values(&mut self) -> Result<InValues, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let values = if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
            InValues::Subquery(self.parse_subquery()?)
        } else if self.check(&TokenKind::RightParen) {
            InValues::List(vec![])
        } else {
            InValues::List(self.parse_expression_list()?)
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(values)
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if self.check_keyword(Keyword::Not) && matches!(self.peek_kind(1), TokenKind::Keyword(Keyword::Exists)) {
            self.advance();
            return self.parse_exists_expression(true);
        }

        // Check for unary operators
        if let Some(op) = token_to_unary_op(&self.current().kind) {
            let bp = prefix_binding_power(&self.current().kind).unwrap_or(19);
            self.advance();
            self.enter()?;
            let operand = self.parse_expression(bp)?;
            self.leave();
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    /// Parses `EXISTS (subquery)`; a leading NOT is already consumed.
    fn parse_exists_expression(&mut self, negated: bool) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Exists)?;
        self.expect(&TokenKind::LeftParen)?;
        let subquery = self.parse_subquery()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Exists { subquery, negated })
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();

        match token.kind {
            // Literals
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }

            // Parameter placeholder
            TokenKind::Question => {
                self.advance();
                Ok(Expr::Parameter)
            }

            // Wildcard
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { table: None })
            }

            // Parenthesized expression or subquery
            TokenKind::LeftParen => {
                self.advance();
                if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
                    let subquery = self.parse_subquery()?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Subquery(subquery))
                } else {
                    self.enter()?;
                    let expr = self.parse_expression(0)?;
                    self.leave();
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Paren(Box::new(expr)))
                }
            }

            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Exists) => self.parse_exists_expression(false),

            // Reserved words that double as function names: LEFT(s, n), VALUES(col)
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right | Keyword::Values))
                if matches!(self.peek_kind(1), TokenKind::LeftParen) =>
            {
                self.advance();
                self.parse_function_call(kw.as_str().to_string())
            }

            // Identifier (column reference or function call)
            TokenKind::Identifier(name) => {
                self.advance();

                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }

                // Qualified name (table.column, schema.table.column or table.*)
                let mut qualifier: Option<String> = None;
                let mut last = name;
                while self.check(&TokenKind::Dot) {
                    self.advance();
                    if self.check(&TokenKind::Star) {
                        self.advance();
                        let table = match qualifier {
                            Some(q) => format!("{q}.{last}"),
                            None => last,
                        };
                        return Ok(Expr::Wildcard { table: Some(table) });
                    }
                    let next = self.expect_identifier()?;
                    qualifier = Some(match qualifier {
                        Some(q) => format!("{q}.{last}"),
                        None => last,
                    });
                    last = next;
                }

                Ok(Expr::Column(ColumnRef {
                    table_alias: qualifier,
                    column: last,
                }))
            }

            kind => Err(ParseError::unexpected("expression", kind, token.span)),
        }
    }

    /// Parses a function call.
    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;

        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            false
        };

        self.enter()?;
        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.leave();

        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
        }))
    }

    /// Parses a CAST expression; the target type is kept as written.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;

        if self.check(&TokenKind::RightParen) {
            return Err(ParseError::unexpected(
                "data type",
                self.current().kind.clone(),
                self.current().span,
            ));
        }
        let start = self.current().span;
        let mut end = start;
        let mut depth = 0usize;
        loop {
            match &self.current().kind {
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::LeftParen => depth += 1,
                TokenKind::Eof => {
                    return Err(ParseError::unexpected_eof(")", self.current().span));
                }
                _ => {}
            }
            end = self.current().span;
            self.advance();
        }
        let data_type = start.to(end).slice(&self.source).to_string();
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// Parses a CASE expression.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;
        self.enter()?;

        // Check for simple CASE (CASE expr WHEN ...)
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        // Parse WHEN/THEN clauses
        let mut when_clauses = vec![];
        while self.check_keyword(Keyword::When) {
            self.advance();
            let when_expr = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then_expr = self.parse_expression(0)?;
            when_clauses.push((when_expr, then_expr));
        }
        if when_clauses.is_empty() {
            return Err(ParseError::unexpected(
                "WHEN",
                self.current().kind.clone(),
                self.current().span,
            ));
        }

        // Parse ELSE clause
        let else_clause = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        self.expect_keyword(Keyword::End)?;
        self.leave();

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// Parses `name` or `qualifier.name` as a column reference.
    fn parse_column_ref(&mut self) -> Result<ColumnRef, ParseError> {
        let first = self.expect_identifier()?;
        if self.check(&TokenKind::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::new(first))
        }
    }

    /// Parses a comma-separated list of expressions.
    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(exprs)
    }

    /// Parses a comma-separated list of identifiers.
    fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut idents = vec![];
        loop {
            idents.push(self.expect_identifier()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(idents)
    }

    // --- Helper methods ---

    /// The current token.
    pub(super) fn current(&self) -> &Token {
        // The token list always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The kind of the token `offset` positions ahead.
    pub(super) fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    /// Advances to the next token.
    pub(super) fn advance(&mut self) {
        if !self.current().is_eof() {
            self.pos += 1;
        }
    }

    pub(super) const fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            depth: self.depth,
        }
    }

    pub(super) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.depth = checkpoint.depth;
    }

    /// Enters one nesting level, failing past `max_depth`.
    pub(super) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.config.max_depth {
            warn!(max_depth = self.config.max_depth, "statement nesting too deep");
            return Err(ParseError::too_deep(
                self.config.max_depth,
                self.current().span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Counts one more operand of an operator chain, failing past
    /// `max_terms`. Chains are built left-deep, so their length is the
    /// depth of the resulting tree.
    pub(super) fn count_term(&self, terms: usize) -> Result<usize, ParseError> {
        if terms >= self.config.max_terms {
            warn!(max_terms = self.config.max_terms, "operator chain too long");
            return Err(ParseError::too_long(
                self.config.max_terms,
                self.current().span,
            ));
        }
        Ok(terms + 1)
    }

    /// Checks if the current token matches the given kind.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current().kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current().kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Expects the current token to be the given kind.
    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current().kind.clone(),
                self.current().span,
            ))
        }
    }

    /// Expects the current token to be the given keyword.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current().kind.clone(),
                self.current().span,
            ))
        }
    }

    /// Expects an unreserved word such as `DUPLICATE` (case-insensitive).
    fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(s) if s.eq_ignore_ascii_case(word) => {
                self.advance();
                Ok(())
            }
            other => Err(ParseError::unexpected(
                word,
                other.clone(),
                self.current().span,
            )),
        }
    }

    /// Expects and returns an identifier.
    pub(super) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected(
                "identifier",
                self.current().kind.clone(),
                self.current().span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Condition};

    fn parse(sql: &str) -> Result<Statement, ParseError> {
        Parser::new(sql).parse_statement()
    }

    fn select(sql: &str) -> SelectStatement {
        match parse(sql).unwrap() {
            Statement::Select(s) => s,
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_select() {
        let s = select("SELECT id, name FROM users");
        assert_eq!(s.columns.len(), 2);
        assert_eq!(s.from, TableSource::table("users"));
    }

    #[test]
    fn test_select_with_join() {
        let s = select("SELECT u.id, o.amount FROM users u JOIN orders o ON u.id = o.user_id");
        assert_eq!(s.joins.len(), 1);
        assert_eq!(s.joins[0].join_type, JoinType::Inner);
        assert!(s.joins[0].on.is_some());
    }

    #[test]
    fn test_expression_precedence() {
        // 1 + 2 * 3 should be parsed as 1 + (2 * 3)
        let s = select("SELECT 1 + 2 * 3 FROM t");
        if let Expr::Binary { op, right, .. } = &s.columns[0].expr {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(
                right.as_ref(),
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        } else {
            panic!("Expected binary expression");
        }
    }

    #[test]
    fn test_comments_are_cleaned_before_parsing() {
        let s = select("SELECT /* all */ * FROM users -- trailing\nWHERE id = ?");
        assert!(matches!(s.where_clause, Some(Condition::Comparison { .. })));
    }

    #[test]
    fn test_select_requires_from() {
        let err = parse("SELECT 1 + 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingClause);
    }

    #[test]
    fn test_ddl_is_rejected() {
        let err = parse("CREATE TABLE t (id INT)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedStatement);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = parse("SELECT * FROM t /* never closed").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unterminated);
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("SELECT * FROM t WHERE name = 'abc").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unterminated);
    }

    #[test]
    fn test_depth_limit() {
        let config = RewriteConfig {
            max_depth: 2,
            ..RewriteConfig::default()
        };
        let sql = "SELECT * FROM (SELECT * FROM (SELECT * FROM (SELECT * FROM a) x) y) z";
        let err = Parser::with_config(sql, config).parse_statement().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep);
    }

    #[test]
    fn test_limit_forms() {
        let plain = select("SELECT * FROM t LIMIT 10").limit.unwrap();
        assert_eq!(plain.offset, None);

        let offset = select("SELECT * FROM t LIMIT 10 OFFSET 20").limit.unwrap();
        assert_eq!(offset.count, Expr::Literal(Literal::Number(String::from("10"))));
        assert_eq!(offset.style, LimitStyle::Offset);

        let comma = select("SELECT * FROM t LIMIT 20, 10").limit.unwrap();
        assert_eq!(comma.count, Expr::Literal(Literal::Number(String::from("10"))));
        assert_eq!(
            comma.offset,
            Some(Expr::Literal(Literal::Number(String::from("20"))))
        );
        assert_eq!(comma.style, LimitStyle::Comma);
    }

    #[test]
    fn test_cast_keeps_type_text() {
        let s = select("SELECT CAST(price AS DECIMAL(10, 2)) FROM items");
        assert!(matches!(
            &s.columns[0].expr,
            Expr::Cast { data_type, .. } if data_type == "DECIMAL(10, 2)"
        ));
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        assert!(parse("SELECT * FROM t WHERE a = 1 UNION SELECT * FROM u").is_err());
    }

    #[test]
    fn test_trailing_semicolons_are_accepted() {
        assert!(parse("SELECT * FROM t;").is_ok());
    }
}
