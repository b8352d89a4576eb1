//! DLQ language frontend.
//!
//! DLQ is a small declarative language describing classical arithmetic,
//! relational and logical expressions over sized integer registers, closed
//! by a Grover-style `amplify` terminator. This crate scans and parses DLQ
//! source into the [`ast::Program`] consumed by the synthesis pipeline.
//!
//! ```text
//! a[3] in {0, 1, 2, 3, 4, 5, 6, 7};
//! r[1] := a = 5;
//! amplify r 2 times
//! ```
//!
//! Integer arithmetic folds at parse time; `/` and `^` are therefore only
//! legal where the folded operands are constants. Diagnostics carry the
//! offending source line.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Amplify, Definition, Expr, ExprKind, ExpressionDef, Operand, Program, SetDef, Sign};
pub use error::{ParseError, ParseResult};
pub use parser::parse;
