//! Parser for DLQ source programs.

mod expression;

use std::collections::BTreeSet;

use crate::ast::{Amplify, Definition, Expr, ExprKind, ExpressionDef, Operand, Program, SetDef};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a DLQ source string into a [`Program`].
pub fn parse(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Parser state.
pub(crate) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let token_results = tokenize(source);
        let mut tokens = Vec::new();

        for result in token_results {
            match result {
                Ok(t) => tokens.push(t),
                Err((line, text)) => {
                    return Err(ParseError::Lexical { line, text });
                }
            }
        }

        Ok(Self { tokens, pos: 0 })
    }

    /// Check if we've reached the end.
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current token, or of the last token at EOF.
    pub(crate) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Peek at the current token.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(crate) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    pub(crate) fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("'{expected}'")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: format!("'{expected}'"),
                found: format!("'{found}'"),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(crate) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse an identifier.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: format!("'{other}'"),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal.
    pub(crate) fn parse_number(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::Number(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: format!("'{other}'"),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }

    /// Parse the entire program: a definition sequence and one terminator.
    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut definitions = Vec::new();

        loop {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof("'amplify' terminator".into()));
            }
            if self.check(&Token::Amplify) {
                break;
            }
            definitions.push(self.parse_definition()?);
        }

        if definitions.is_empty() {
            return Err(ParseError::UnexpectedToken {
                line: self.line(),
                expected: "register definition".into(),
                found: "'amplify'".into(),
            });
        }

        let terminator = self.parse_amplify()?;

        if !self.is_eof() {
            return Err(ParseError::UnexpectedToken {
                line: self.line(),
                expected: "end of input".into(),
                found: format!("'{}'", self.peek().expect("not eof")),
            });
        }

        Ok(Program {
            definitions,
            terminator,
        })
    }

    /// Parse one register definition, either `:=` or `in {..}` form.
    fn parse_definition(&mut self) -> ParseResult<Definition> {
        let line = self.line();
        let name = self.parse_identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_number()?;
        self.expect(&Token::RBracket)?;

        if size == 0 {
            return Err(ParseError::RegisterSizeNotPositive { line });
        }
        let size = u32::try_from(size).map_err(|_| ParseError::ConstantOverflow { line })?;

        let def = if self.consume(&Token::Assign) {
            let expr = self.parse_expression_statement(line)?;
            Definition::Expression(ExpressionDef {
                line,
                name,
                size,
                expr,
            })
        } else {
            self.expect(&Token::In)?;
            self.expect(&Token::LBrace)?;
            let values = self.parse_value_set(line)?;
            self.expect(&Token::RBrace)?;
            Definition::Set(SetDef {
                line,
                name,
                size,
                values,
            })
        };

        self.expect(&Token::Semicolon)?;
        Ok(def)
    }

    /// Parse the right-hand side of `:=`, rejecting trivial assignments.
    fn parse_expression_statement(&mut self, line: usize) -> ParseResult<Expr> {
        match self.parse_expression()? {
            Operand::Const(_) => Err(ParseError::DirectAssignment { line }),
            Operand::Expr(expr) => {
                if matches!(expr.kind, ExprKind::Identifier(_)) {
                    return Err(ParseError::DirectAssignment { line });
                }
                Ok(*expr)
            }
        }
    }

    /// Parse the value set of an `in` definition. Every element must fold
    /// to a non-negative constant.
    fn parse_value_set(&mut self, line: usize) -> ParseResult<BTreeSet<u64>> {
        let mut values = BTreeSet::new();
        loop {
            match self.parse_expression()? {
                Operand::Const(v) => {
                    let v = u64::try_from(v).map_err(|_| ParseError::NegativeSetValue { line })?;
                    values.insert(v);
                }
                Operand::Expr(_) => {
                    return Err(ParseError::NonConstantSetValue { line });
                }
            }
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        Ok(values)
    }

    /// Parse the `amplify ID INT times` terminator.
    fn parse_amplify(&mut self) -> ParseResult<Amplify> {
        let line = self.line();
        self.expect(&Token::Amplify)?;
        let target = self.parse_identifier()?;
        let iterations = self.parse_number()?;
        let iterations =
            u32::try_from(iterations).map_err(|_| ParseError::ConstantOverflow { line })?;
        self.expect(&Token::Times)?;
        Ok(Amplify {
            line,
            target,
            iterations,
        })
    }
}
