//! Expression parsing with precedence climbing and constant folding.
//!
//! Integer arithmetic folds at parse time, so `/` and `^` with constant
//! operands never reach synthesis. Chains of the associative-commutative
//! operators merge into single n-ary nodes, preserving source order.

use super::Parser;
use crate::ast::{Expr, ExprKind, Operand, Sign};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

/// Binary operators, for the precedence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Or,
    And,
    Lt,
    Gt,
    Eq,
    NotEq,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

const PREC_NOT: u8 = 3;
const PREC_NEG: u8 = 8;

/// Get operator precedence (low binds loosest).
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        // unary `not` sits at 3
        BinOp::Lt | BinOp::Gt => 4,
        BinOp::Eq | BinOp::NotEq => 5,
        BinOp::Add | BinOp::Sub => 6,
        BinOp::Mul | BinOp::Div => 7,
        // unary `-` sits at 8
        BinOp::Pow => 9,
    }
}

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Operand> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Operand> {
        let mut left = self.parse_prefix_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            let line = self.line();
            self.advance();

            // `^` is right-associative, everything else left-associative.
            let next_min = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary_expr(next_min)?;
            left = merge(line, left, op, right)?;
        }

        Ok(left)
    }

    /// Parse prefix operators (`not`, unary `-`) and primaries.
    fn parse_prefix_expr(&mut self) -> ParseResult<Operand> {
        if self.check(&Token::Not) {
            let line = self.line();
            self.advance();
            let operand = self.parse_binary_expr(PREC_NOT + 1)?;
            return Ok(match operand {
                Operand::Const(v) => Operand::Const(1 - v.rem_euclid(2)),
                Operand::Expr(e) => Operand::expr(Expr {
                    line,
                    kind: ExprKind::Not(e),
                }),
            });
        }

        if self.check(&Token::Minus) {
            let line = self.line();
            self.advance();
            let operand = self.parse_binary_expr(PREC_NEG)?;
            return Ok(match operand {
                Operand::Const(v) => Operand::Const(
                    v.checked_neg()
                        .ok_or(ParseError::ConstantOverflow { line })?,
                ),
                Operand::Expr(e) => Operand::expr(Expr {
                    line,
                    kind: ExprKind::Neg(e),
                }),
            });
        }

        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Operand> {
        let line = self.line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;

        match token {
            Token::Number(v) => {
                self.advance();
                let v = i64::try_from(v).map_err(|_| ParseError::ConstantOverflow { line })?;
                Ok(Operand::Const(v))
            }
            Token::True => {
                self.advance();
                Ok(Operand::Const(1))
            }
            Token::False => {
                self.advance();
                Ok(Operand::Const(0))
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(Operand::expr(Expr {
                    line,
                    kind: ExprKind::Identifier(name),
                }))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(match inner {
                    Operand::Const(v) => Operand::Const(v),
                    Operand::Expr(e) => Operand::expr(Expr {
                        line,
                        kind: ExprKind::Paren(e),
                    }),
                })
            }
            _ => Err(ParseError::UnexpectedToken {
                line,
                expected: "expression".into(),
                found: format!("'{token}'"),
            }),
        }
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Or => Some(BinOp::Or),
            Token::And => Some(BinOp::And),
            Token::Lt => Some(BinOp::Lt),
            Token::Gt => Some(BinOp::Gt),
            Token::Equal => Some(BinOp::Eq),
            Token::NotEqual => Some(BinOp::NotEq),
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }
}

/// Combine two parsed operands, folding constants where possible.
fn merge(line: usize, left: Operand, op: BinOp, right: Operand) -> ParseResult<Operand> {
    match op {
        BinOp::Or | BinOp::And => merge_logic(line, left, op, right),
        BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::Gt => {
            merge_relational(line, left, op, right)
        }
        BinOp::Add | BinOp::Sub => merge_summation(line, left, op, right),
        BinOp::Mul => merge_product(line, left, right),
        BinOp::Div => merge_division(line, left, right),
        BinOp::Pow => merge_power(line, left, right),
    }
}

fn merge_logic(line: usize, left: Operand, op: BinOp, right: Operand) -> ParseResult<Operand> {
    let truth = |v: i64| v.rem_euclid(2) == 1;

    Ok(match (left, right) {
        (Operand::Const(l), Operand::Const(r)) => {
            let folded = match op {
                BinOp::And => truth(l) && truth(r),
                _ => truth(l) || truth(r),
            };
            Operand::Const(i64::from(folded))
        }
        // A constant on one side makes the operator transparent or absorbing.
        (Operand::Const(k), Operand::Expr(e)) | (Operand::Expr(e), Operand::Const(k)) => {
            match (op, truth(k)) {
                (BinOp::And, true) | (BinOp::Or, false) => Operand::Expr(e),
                (BinOp::And, false) => Operand::Const(0),
                _ => Operand::Const(1),
            }
        }
        (Operand::Expr(l), Operand::Expr(r)) => {
            let Expr {
                line: left_line,
                kind,
            } = *l;
            let mut operands = match kind {
                ExprKind::And { operands } if op == BinOp::And => operands,
                ExprKind::Or { operands } if op == BinOp::Or => operands,
                other => vec![Expr {
                    line: left_line,
                    kind: other,
                }],
            };
            operands.push(*r);
            let kind = match op {
                BinOp::And => ExprKind::And { operands },
                _ => ExprKind::Or { operands },
            };
            Operand::expr(Expr { line, kind })
        }
    })
}

fn merge_relational(
    line: usize,
    left: Operand,
    op: BinOp,
    right: Operand,
) -> ParseResult<Operand> {
    if let (Some(l), Some(r)) = (left.as_const(), right.as_const()) {
        let folded = match op {
            BinOp::Eq => l == r,
            BinOp::NotEq => l != r,
            BinOp::Lt => l < r,
            _ => l > r,
        };
        return Ok(Operand::Const(i64::from(folded)));
    }

    let kind = match op {
        BinOp::Eq => ExprKind::Equal { left, right },
        BinOp::NotEq => ExprKind::NotEqual { left, right },
        BinOp::Lt => ExprKind::LessThan { left, right },
        _ => ExprKind::GreaterThan { left, right },
    };
    Ok(Operand::expr(Expr { line, kind }))
}

fn merge_summation(
    line: usize,
    left: Operand,
    op: BinOp,
    right: Operand,
) -> ParseResult<Operand> {
    let right_sign = match op {
        BinOp::Add => Sign::Pos,
        _ => Sign::Neg,
    };

    if let (Some(l), Some(r)) = (left.as_const(), right.as_const()) {
        let folded = match right_sign {
            Sign::Pos => l.checked_add(r),
            Sign::Neg => l.checked_sub(r),
        };
        return folded
            .map(Operand::Const)
            .ok_or(ParseError::ConstantOverflow { line });
    }

    let (mut operands, mut signs) = match left {
        Operand::Expr(e) => {
            let Expr {
                line: left_line,
                kind,
            } = *e;
            match kind {
                ExprKind::Summation { operands, signs } => (operands, signs),
                other => (
                    vec![Operand::expr(Expr {
                        line: left_line,
                        kind: other,
                    })],
                    vec![Sign::Pos],
                ),
            }
        }
        Operand::Const(v) => (vec![Operand::Const(v)], vec![Sign::Pos]),
    };
    operands.push(right);
    signs.push(right_sign);

    Ok(Operand::expr(Expr {
        line,
        kind: ExprKind::Summation { operands, signs },
    }))
}

fn merge_product(line: usize, left: Operand, right: Operand) -> ParseResult<Operand> {
    if let (Some(l), Some(r)) = (left.as_const(), right.as_const()) {
        return l
            .checked_mul(r)
            .map(Operand::Const)
            .ok_or(ParseError::ConstantOverflow { line });
    }

    let mut operands = match left {
        Operand::Expr(e) => {
            let Expr {
                line: left_line,
                kind,
            } = *e;
            match kind {
                ExprKind::Product { operands } => operands,
                other => vec![Operand::expr(Expr {
                    line: left_line,
                    kind: other,
                })],
            }
        }
        Operand::Const(v) => vec![Operand::Const(v)],
    };
    operands.push(right);

    Ok(Operand::expr(Expr {
        line,
        kind: ExprKind::Product { operands },
    }))
}

fn merge_division(line: usize, left: Operand, right: Operand) -> ParseResult<Operand> {
    match (left.as_const(), right.as_const()) {
        (Some(_), Some(0)) => Err(ParseError::DivisionByZero { line }),
        (Some(l), Some(r)) => Ok(Operand::Const(l.div_euclid(r))),
        _ => Err(ParseError::NonConstantDivision { line }),
    }
}

fn merge_power(line: usize, left: Operand, right: Operand) -> ParseResult<Operand> {
    let Some(exponent) = right.as_const() else {
        return Err(ParseError::NonConstantExponent { line });
    };
    if exponent < 0 {
        return Err(ParseError::NegativeExponent { line });
    }
    let exponent = u32::try_from(exponent).map_err(|_| ParseError::ConstantOverflow { line })?;

    match left {
        Operand::Const(base) => base
            .checked_pow(exponent)
            .map(Operand::Const)
            .ok_or(ParseError::ConstantOverflow { line }),
        Operand::Expr(base) => Ok(Operand::expr(Expr {
            line,
            kind: ExprKind::Power { base, exponent },
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::ast::Definition;

    fn rhs(source: &str) -> Expr {
        let program = parse(source).unwrap();
        match program.definitions.last().unwrap() {
            Definition::Expression(def) => def.expr.clone(),
            Definition::Set(_) => panic!("expected expression definition"),
        }
    }

    #[test]
    fn test_nary_summation_merge() {
        let expr = rhs("a[2] in {0};\nr[4] := a + 1 - a + 2;\namplify r 0 times");
        match expr.kind {
            ExprKind::Summation { operands, signs } => {
                assert_eq!(operands.len(), 4);
                assert_eq!(signs, vec![Sign::Pos, Sign::Pos, Sign::Neg, Sign::Pos]);
            }
            other => panic!("expected summation, got {other:?}"),
        }
    }

    #[test]
    fn test_nary_product_merge() {
        let expr = rhs("a[2] in {0};\nr[6] := 2 * a * a * 3;\namplify r 0 times");
        match expr.kind {
            ExprKind::Product { operands } => {
                assert_eq!(operands.len(), 4);
                assert_eq!(operands[0].as_const(), Some(2));
                assert_eq!(operands[3].as_const(), Some(3));
            }
            other => panic!("expected product, got {other:?}"),
        }
    }

    #[test]
    fn test_parentheses_block_merging() {
        let expr = rhs("a[2] in {0};\nr[6] := (a * a) * a;\namplify r 0 times");
        match expr.kind {
            ExprKind::Product { operands } => {
                assert_eq!(operands.len(), 2);
                match &operands[0] {
                    Operand::Expr(e) => assert!(matches!(e.kind, ExprKind::Paren(_))),
                    Operand::Const(_) => panic!("expected parenthesised expression"),
                }
            }
            other => panic!("expected product, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = rhs("a[2] in {0};\nr[6] := a + a * a;\namplify r 0 times");
        match expr.kind {
            ExprKind::Summation { operands, .. } => {
                assert_eq!(operands.len(), 2);
                match &operands[1] {
                    Operand::Expr(e) => assert!(matches!(e.kind, ExprKind::Product { .. })),
                    Operand::Const(_) => panic!("expected product operand"),
                }
            }
            other => panic!("expected summation, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_relational_over_logic() {
        let expr = rhs("a[2] in {0};\nb[2] in {0};\nr[1] := a = 1 and b != 2;\namplify r 0 times");
        match expr.kind {
            ExprKind::And { operands } => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(operands[0].kind, ExprKind::Equal { .. }));
                assert!(matches!(operands[1].kind, ExprKind::NotEqual { .. }));
            }
            other => panic!("expected and, got {other:?}"),
        }
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        let expr = rhs("a[2] in {0};\nb[2] in {0};\nr[1] := not a = 1 and b = 2;\namplify r 0 times");
        match expr.kind {
            ExprKind::And { operands } => {
                assert!(matches!(operands[0].kind, ExprKind::Not(_)));
            }
            other => panic!("expected and, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_minus_below_power() {
        // -a^2 parses as -(a^2)
        let expr = rhs("a[2] in {0};\nr[5] := 1 - (-a^2);\namplify r 0 times");
        match expr.kind {
            ExprKind::Summation { operands, .. } => match &operands[1] {
                Operand::Expr(e) => match &e.kind {
                    ExprKind::Paren(inner) => match &inner.kind {
                        ExprKind::Neg(negated) => {
                            assert!(matches!(negated.kind, ExprKind::Power { .. }));
                        }
                        other => panic!("expected negation, got {other:?}"),
                    },
                    other => panic!("expected parentheses, got {other:?}"),
                },
                Operand::Const(_) => panic!("expected expression operand"),
            },
            other => panic!("expected summation, got {other:?}"),
        }
    }

    #[test]
    fn test_power_right_associative() {
        // a^2^3 parses as a^(2^3) = a^8
        let expr = rhs("a[1] in {0};\nr[8] := a^2^3 + 0 * a;\namplify r 0 times");
        match expr.kind {
            ExprKind::Summation { operands, .. } => match &operands[0] {
                Operand::Expr(e) => match &e.kind {
                    ExprKind::Power { exponent, .. } => assert_eq!(*exponent, 8),
                    other => panic!("expected power, got {other:?}"),
                },
                Operand::Const(_) => panic!("expected expression operand"),
            },
            other => panic!("expected summation, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_folding() {
        // true/false, relational and arithmetic folds collapse to constants
        let program = parse("a[4] in {2 ^ 3, 7 / 2, 1 + 2 * 3};\namplify a 0 times").unwrap();
        match &program.definitions[0] {
            Definition::Set(def) => {
                assert_eq!(def.values.iter().copied().collect::<Vec<_>>(), vec![3, 7, 8]);
            }
            Definition::Expression(_) => panic!("expected set definition"),
        }
    }

    #[test]
    fn test_logic_folding_with_constant() {
        // `x and true` is x itself
        let expr = rhs("a[2] in {0};\nr[1] := (a = 1) and true;\namplify r 0 times");
        assert!(matches!(expr.kind, ExprKind::Paren(_)));
    }

    #[test]
    fn test_division_with_register_rejected() {
        let result = parse("a[2] in {0};\nr[2] := a / 2;\namplify r 0 times");
        assert!(matches!(
            result,
            Err(ParseError::NonConstantDivision { line: 2 })
        ));
    }

    #[test]
    fn test_non_constant_exponent_rejected() {
        let result = parse("a[2] in {0};\nr[4] := a ^ a;\namplify r 0 times");
        assert!(matches!(
            result,
            Err(ParseError::NonConstantExponent { line: 2 })
        ));
    }

    #[test]
    fn test_division_by_zero_rejected() {
        let result = parse("a[2] in {4 / 0};\namplify a 0 times");
        assert!(matches!(result, Err(ParseError::DivisionByZero { line: 1 })));
    }
}
