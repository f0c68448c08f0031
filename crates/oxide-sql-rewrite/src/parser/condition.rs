//! Condition parsing for WHERE, HAVING and JOIN ... ON.
//!
//! Conditions are parsed into the [`Condition`] tree rather than a plain
//! expression. `OR` binds loosest, then `AND`, then `NOT`. A segment with no
//! predicate operator (a bare column or function call) is skipped up to the
//! next top-level `AND`/`OR` and left out of the tree, unless
//! [`RewriteConfig::strict_conditions`](crate::RewriteConfig) is set.

use tracing::debug;

use super::error::{ParseError, ParseErrorKind};
use super::parser::Parser;
use super::pratt::{infix_binding_power, OPERAND_BP, PREDICATE_BP};
use crate::ast::{ColumnRef, ComparisonOp, Condition, Expr, LogicalOp};
use crate::lexer::{Keyword, TokenKind};

/// Converts a token to a comparison operator.
const fn token_to_comparison_op(kind: &TokenKind) -> Option<ComparisonOp> {
    match kind {
        TokenKind::Eq => Some(ComparisonOp::Eq),
        TokenKind::NotEq => Some(ComparisonOp::NotEq),
        TokenKind::LtGt => Some(ComparisonOp::LtGt),
        TokenKind::NullSafeEq => Some(ComparisonOp::NullSafeEq),
        TokenKind::Lt => Some(ComparisonOp::Lt),
        TokenKind::LtEq => Some(ComparisonOp::LtEq),
        TokenKind::Gt => Some(ComparisonOp::Gt),
        TokenKind::GtEq => Some(ComparisonOp::GtEq),
        _ => None,
    }
}

/// Keywords that end a condition when found outside parentheses.
const fn ends_condition(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Keyword(
                Keyword::And
                    | Keyword::Or
                    | Keyword::Where
                    | Keyword::Group
                    | Keyword::Having
                    | Keyword::Order
                    | Keyword::Limit
                    | Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
                    | Keyword::On
                    | Keyword::Using
                    | Keyword::Union
            )
    )
}

/// Whether `kind` after a closing parenthesis makes the parenthesized
/// part an operand (`(a + b) > 1`) instead of a condition group.
fn continues_operand(kind: &TokenKind) -> bool {
    infix_binding_power(kind).is_some()
        && !matches!(kind, TokenKind::Keyword(Keyword::And | Keyword::Or))
}

fn combine(op: LogicalOp, left: Option<Condition>, right: Option<Condition>) -> Option<Condition> {
    match (left, right) {
        (Some(l), Some(r)) => Some(Condition::logical(op, l, r)),
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// The column a leaf is about. Non-column operands are kept by their
/// rendered text.
fn condition_column(operand: Expr) -> ColumnRef {
    match operand {
        Expr::Column(column) => column,
        other => ColumnRef::new(other.to_string()),
    }
}

/// Whether `expr` is a predicate at its top level.
const fn is_predicate(expr: &Expr) -> bool {
    match expr {
        Expr::Binary { op, .. } => op.is_comparison(),
        Expr::IsNull { .. } | Expr::In { .. } | Expr::Between { .. } | Expr::Like { .. } => true,
        _ => false,
    }
}

impl Parser {
    /// Parses a condition.
    ///
    /// Returns `Ok(None)` when every segment was left out.
    pub(super) fn parse_condition(&mut self) -> Result<Option<Condition>, ParseError> {
        self.parse_or_condition()
    }

    fn parse_or_condition(&mut self) -> Result<Option<Condition>, ParseError> {
        let mut acc = self.parse_and_condition()?;
        let mut terms = 1;
        while self.check_keyword(Keyword::Or) {
            terms = self.count_term(terms)?;
            self.advance();
            let rhs = self.parse_and_condition()?;
            acc = combine(LogicalOp::Or, acc, rhs);
        }
        Ok(acc)
    }

    fn parse_and_condition(&mut self) -> Result<Option<Condition>, ParseError> {
        let mut acc = self.parse_condition_unit()?;
        let mut terms = 1;
        while self.check_keyword(Keyword::And) {
            terms = self.count_term(terms)?;
            self.advance();
            let rhs = self.parse_condition_unit()?;
            acc = combine(LogicalOp::And, acc, rhs);
        }
        Ok(acc)
    }

    /// `NOT unit`, `[NOT] EXISTS (...)`, `( condition )` or a leaf.
    fn parse_condition_unit(&mut self) -> Result<Option<Condition>, ParseError> {
        match self.current().kind {
            TokenKind::Keyword(Keyword::Not) => {
                if matches!(self.peek_kind(1), TokenKind::Keyword(Keyword::Exists)) {
                    self.advance();
                    return self.parse_exists_condition(true).map(Some);
                }
                self.advance();
                self.enter()?;
                let inner = self.parse_condition_unit()?;
                self.leave();
                Ok(inner.map(|c| Condition::Not(Box::new(c))))
            }
            TokenKind::Keyword(Keyword::Exists) => self.parse_exists_condition(false).map(Some),
            TokenKind::LeftParen
                if !matches!(
                    self.peek_kind(1),
                    TokenKind::Keyword(Keyword::Select | Keyword::With)
                ) =>
            {
                self.parse_condition_group()
            }
            _ => self.parse_condition_leaf(),
        }
    }

    /// Tries `( condition )`; falls back to a leaf starting with a
    /// parenthesized operand.
    fn parse_condition_group(&mut self) -> Result<Option<Condition>, ParseError> {
        let checkpoint = self.checkpoint();
        self.advance();
        self.enter()?;
        match self.parse_or_condition() {
            Ok(inner)
                if self.check(&TokenKind::RightParen) && !continues_operand(self.peek_kind(1)) =>
            {
                self.advance();
                self.leave();
                return Ok(inner);
            }
            Err(err) if err.kind == ParseErrorKind::TooDeep => return Err(err),
            _ => {}
        }
        self.restore(checkpoint);
        self.parse_condition_leaf()
    }

    fn parse_exists_condition(&mut self, negated: bool) -> Result<Condition, ParseError> {
        self.expect_keyword(Keyword::Exists)?;
        self.expect(&TokenKind::LeftParen)?;
        let subquery = self.parse_subquery()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Condition::Exists { subquery, negated })
    }

    fn parse_condition_leaf(&mut self) -> Result<Option<Condition>, ParseError> {
        let checkpoint = self.checkpoint();
        match self.parse_leaf_shape() {
            Ok(Some(condition)) => Ok(Some(condition)),
            Ok(None) => {
                self.restore(checkpoint);
                self.drop_segment(None)
            }
            Err(err)
                if matches!(
                    err.kind,
                    ParseErrorKind::TooDeep | ParseErrorKind::Unterminated
                ) =>
            {
                Err(err)
            }
            Err(err) => {
                self.restore(checkpoint);
                self.drop_segment(Some(err))
            }
        }
    }

    /// Parses one leaf; `Ok(None)` means the shape is not one we model.
    fn parse_leaf_shape(&mut self) -> Result<Option<Condition>, ParseError> {
        let start = self.checkpoint();
        let operand = self.parse_expression(OPERAND_BP)?;
        if operand.has_parameter_or_subquery() {
            // `? = owner`, `a + ? > 1`: keep the whole predicate so its
            // placeholders stay bound in place.
            self.restore(start);
            let expr = self.parse_expression(PREDICATE_BP)?;
            return Ok(is_predicate(&expr).then_some(Condition::Predicate(expr)));
        }
        let left = condition_column(operand);

        let negated = if self.check_keyword(Keyword::Not)
            && matches!(
                self.peek_kind(1),
                TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like)
            ) {
            self.advance();
            true
        } else {
            false
        };

        let condition = match &self.current().kind {
            TokenKind::Keyword(Keyword::Is) if !negated => {
                self.advance();
                let negated = if self.check_keyword(Keyword::Not) {
                    self.advance();
                    true
                } else {
                    false
                };
                if !self.check_keyword(Keyword::Null) {
                    return Ok(None);
                }
                self.advance();
                Condition::Null { left, negated }
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.advance();
                let start = self.parse_expression(OPERAND_BP)?;
                self.expect_keyword(Keyword::And)?;
                let end = self.parse_expression(OPERAND_BP)?;
                Condition::Between {
                    left,
                    start,
                    end,
                    negated,
                }
            }
            TokenKind::Keyword(Keyword::In) => {
                self.advance();
                let values = self.parse_in_values()?;
                Condition::In {
                    left,
                    values,
                    negated,
                }
            }
            TokenKind::Keyword(Keyword::Like) => {
                self.advance();
                let pattern = self.parse_expression(OPERAND_BP)?;
                Condition::Like {
                    left,
                    pattern,
                    negated,
                }
            }
            kind if !negated => {
                let Some(op) = token_to_comparison_op(kind) else {
                    return Ok(None);
                };
                self.advance();
                let right = self.parse_expression(OPERAND_BP)?;
                Condition::Comparison { left, op, right }
            }
            _ => return Ok(None),
        };

        Ok(Some(condition))
    }

    /// Skips the current segment and leaves it out of the condition.
    fn drop_segment(&mut self, cause: Option<ParseError>) -> Result<Option<Condition>, ParseError> {
        let start = self.current().span;
        if self.config.strict_conditions {
            return Err(cause.unwrap_or_else(|| {
                ParseError::new("Unrecognized condition", start)
            }));
        }

        let from = self.pos;
        let mut end = start;
        let mut depth = 0usize;
        loop {
            let kind = &self.current().kind;
            match kind {
                TokenKind::Eof if depth > 0 => {
                    return Err(ParseError::unexpected_eof(")", self.current().span));
                }
                TokenKind::Eof => break,
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::LeftParen => depth += 1,
                _ if depth == 0 && ends_condition(kind) => break,
                _ => {}
            }
            end = self.current().span;
            self.advance();
        }

        if self.pos > from {
            debug!(
                segment = start.to(end).slice(&self.source),
                "dropping unrecognized condition segment"
            );
        }
        Ok(None)
    }
}
