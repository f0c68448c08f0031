//! Pratt expression parser for operator precedence.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Minimum binding power of a condition operand.
///
/// Sits just above the comparison operators, so parsing an operand stops at
/// `=`, `IS`, `IN`, `BETWEEN`, `LIKE` and at `AND`/`OR`.
pub const OPERAND_BP: u8 = 9;

/// Minimum binding power of a whole predicate: takes in comparisons and
/// `IS`/`IN`/`BETWEEN`/`LIKE`, stops at `AND`/`OR`.
pub const PREDICATE_BP: u8 = 5;

/// Returns the prefix binding power for a unary operator token.
#[must_use]
pub const fn prefix_binding_power(kind: &TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Minus | TokenKind::BitNot => Some(19),
        // NOT binds looser than comparisons but tighter than AND
        TokenKind::Keyword(Keyword::Not) => Some(5),
        _ => None,
    }
}

/// Precedence level of an infix operator, loosest first.
const fn infix_level(kind: &TokenKind) -> Option<u8> {
    let level = match kind {
        TokenKind::Keyword(Keyword::Or) => 1,
        TokenKind::Keyword(Keyword::And) => 2,
        // NOT only appears infix as NOT IN / NOT BETWEEN / NOT LIKE
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::LtGt
        | TokenKind::NullSafeEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq
        | TokenKind::Keyword(
            Keyword::Is | Keyword::In | Keyword::Between | Keyword::Like | Keyword::Not,
        ) => 4,
        TokenKind::BitOr => 5,
        TokenKind::BitAnd => 6,
        TokenKind::LeftShift | TokenKind::RightShift => 7,
        // `||` concatenates (MySQL PIPES_AS_CONCAT) at additive precedence
        TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => 8,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 9,
        _ => return None,
    };
    Some(level)
}

/// Returns `(left_bp, right_bp)` for an infix operator token, or `None`.
///
/// All infix operators are left associative, so `left_bp < right_bp`.
/// Level 3 is left free for prefix `NOT`.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match infix_level(kind) {
        Some(level) => Some((level * 2 - 1, level * 2)),
        None => None,
    }
}

/// Converts a token to a binary operator.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::LtGt => Some(BinaryOp::LtGt),
        TokenKind::NullSafeEq => Some(BinaryOp::NullSafeEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

/// Converts a token to a unary operator.
#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
        TokenKind::BitNot => Some(UnaryOp::BitNot),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(kind: &TokenKind) -> (u8, u8) {
        infix_binding_power(kind).unwrap()
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(bp(&TokenKind::Star).0 > bp(&TokenKind::Plus).0);

        let and_bp = bp(&TokenKind::Keyword(Keyword::And));
        let or_bp = bp(&TokenKind::Keyword(Keyword::Or));
        assert!(and_bp.0 > or_bp.0);
        assert!(bp(&TokenKind::Eq).0 > and_bp.0);
    }

    #[test]
    fn test_operand_stops_at_comparisons() {
        assert!(bp(&TokenKind::Eq).0 < OPERAND_BP);
        assert!(bp(&TokenKind::Keyword(Keyword::Like)).0 < OPERAND_BP);
        assert!(bp(&TokenKind::BitOr).0 >= OPERAND_BP);
    }

    #[test]
    fn test_predicate_takes_comparisons_not_and() {
        assert!(bp(&TokenKind::Eq).0 >= PREDICATE_BP);
        assert!(bp(&TokenKind::Keyword(Keyword::Between)).0 >= PREDICATE_BP);
        assert!(bp(&TokenKind::Keyword(Keyword::And)).0 < PREDICATE_BP);
        assert!(bp(&TokenKind::Keyword(Keyword::Or)).0 < PREDICATE_BP);
    }

    #[test]
    fn test_not_binds_between_and_and_comparison() {
        let not_bp = prefix_binding_power(&TokenKind::Keyword(Keyword::Not)).unwrap();
        assert!(not_bp > bp(&TokenKind::Keyword(Keyword::And)).0);
        assert!(not_bp < bp(&TokenKind::Eq).0);
    }

    #[test]
    fn test_token_to_ops() {
        assert_eq!(token_to_binary_op(&TokenKind::LtGt), Some(BinaryOp::LtGt));
        assert_eq!(token_to_binary_op(&TokenKind::LeftParen), None);
        assert_eq!(token_to_unary_op(&TokenKind::Minus), Some(UnaryOp::Neg));
        assert_eq!(token_to_unary_op(&TokenKind::Plus), None);
    }
}
