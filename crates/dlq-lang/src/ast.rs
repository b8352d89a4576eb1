//! Abstract syntax tree for DLQ programs.
//!
//! The parser folds integer arithmetic eagerly, so constants surface as
//! [`Operand::Const`] rather than as expression nodes. N-ary operators
//! (`+/-`, `*`, `and`, `or`) are merged into single nodes with their
//! operands in source order; the synthesis walk relies on that order being
//! stable.

use serde::Serialize;
use std::collections::BTreeSet;

/// Sign of a summation operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    Pos,
    Neg,
}

impl Sign {
    /// The opposite sign.
    pub fn flipped(self) -> Sign {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }
}

/// An expression operand: a sub-expression or a folded integer constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    Expr(Box<Expr>),
    Const(i64),
}

impl Operand {
    /// Wrap an expression.
    pub fn expr(expr: Expr) -> Self {
        Operand::Expr(Box::new(expr))
    }

    /// The constant value, if this operand is one.
    pub fn as_const(&self) -> Option<i64> {
        match self {
            Operand::Const(v) => Some(*v),
            Operand::Expr(_) => None,
        }
    }
}

/// An expression with its source line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    /// 1-based source line.
    pub line: usize,
    pub kind: ExprKind,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    /// Reference to a named register.
    Identifier(String),
    /// Parenthesised expression; normalised away before synthesis.
    Paren(Box<Expr>),
    /// Unary minus; absorbed by the enclosing summation.
    Neg(Box<Expr>),
    /// Power with a constant non-negative exponent.
    Power { base: Box<Expr>, exponent: u32 },
    /// N-ary product.
    Product { operands: Vec<Operand> },
    /// N-ary signed sum.
    Summation {
        operands: Vec<Operand>,
        signs: Vec<Sign>,
    },
    /// Relational operators.
    Equal { left: Operand, right: Operand },
    NotEqual { left: Operand, right: Operand },
    LessThan { left: Operand, right: Operand },
    GreaterThan { left: Operand, right: Operand },
    /// Logical operators. Constant operands were folded during parsing.
    Not(Box<Expr>),
    And { operands: Vec<Expr> },
    Or { operands: Vec<Expr> },
}

impl Expr {
    /// Collect every identifier referenced in the expression.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers(&self, out: &mut BTreeSet<String>) {
        match &self.kind {
            ExprKind::Identifier(name) => {
                out.insert(name.clone());
            }
            ExprKind::Paren(inner) | ExprKind::Neg(inner) | ExprKind::Not(inner) => {
                inner.collect_identifiers(out);
            }
            ExprKind::Power { base, .. } => base.collect_identifiers(out),
            ExprKind::Product { operands }
            | ExprKind::Summation { operands, .. } => {
                for op in operands {
                    if let Operand::Expr(e) = op {
                        e.collect_identifiers(out);
                    }
                }
            }
            ExprKind::Equal { left, right }
            | ExprKind::NotEqual { left, right }
            | ExprKind::LessThan { left, right }
            | ExprKind::GreaterThan { left, right } => {
                if let Operand::Expr(e) = left {
                    e.collect_identifiers(out);
                }
                if let Operand::Expr(e) = right {
                    e.collect_identifiers(out);
                }
            }
            ExprKind::And { operands } | ExprKind::Or { operands } => {
                for e in operands {
                    e.collect_identifiers(out);
                }
            }
        }
    }
}

/// A register definition statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    /// `name[size] := expr`
    Expression(ExpressionDef),
    /// `name[size] in { v, ... }`
    Set(SetDef),
}

impl Definition {
    /// The defined register's name.
    pub fn name(&self) -> &str {
        match self {
            Definition::Expression(d) => &d.name,
            Definition::Set(d) => &d.name,
        }
    }

    /// The defined register's size in qubits.
    pub fn size(&self) -> u32 {
        match self {
            Definition::Expression(d) => d.size,
            Definition::Set(d) => d.size,
        }
    }

    /// The statement's source line.
    pub fn line(&self) -> usize {
        match self {
            Definition::Expression(d) => d.line,
            Definition::Set(d) => d.line,
        }
    }
}

/// Declares a register whose initial value is a computed expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionDef {
    pub line: usize,
    pub name: String,
    pub size: u32,
    pub expr: Expr,
}

/// Declares a register in uniform superposition over a set of naturals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetDef {
    pub line: usize,
    pub name: String,
    pub size: u32,
    pub values: BTreeSet<u64>,
}

/// The `amplify` terminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amplify {
    pub line: usize,
    /// Target register holding the predicate.
    pub target: String,
    /// Number of Grover iterations.
    pub iterations: u32,
}

/// A complete DLQ program: register definitions plus one terminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub definitions: Vec<Definition>,
    pub terminator: Amplify,
}
