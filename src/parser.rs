//! Recursive-descent parser turning formula text into an [`Expr`].
//!
//! Grammar, lowest to highest precedence. Every binary level is a left-to-right chain:
//!
//! ```text
//! expression     := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := power (('*' | '/' | '%') power)*
//! power          := unary (('^' | '^^') unary)*
//! unary          := ('+' | '-') unary | primary
//! primary        := number | name | name '(' expression ')' | '(' expression ')'
//! ```
//!
//! Parsing stops at the first error, which carries the 1-based column it was found at.

use crate::errors::ParseError;
use crate::expr::{BinaryOp, Expr};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::operators::MathFunction;

/// Depth limit of the tree: nested parentheses, calls and unary signs plus chained operators.
const MAX_DEPTH: usize = 200;

/// Parses formula text into an expression tree.
///
/// # Example
/// ```
/// # use plotexpr::parser::parse;
/// let expr = parse("-(x^2) + 1").unwrap();
/// assert_eq!(expr.to_string(), "-(x ^ 2) + 1");
/// ```
///
/// # Errors
/// Returns `ParseError::EmptyExpression` for blank input and the other `ParseError`
/// variants for malformed or unsupported text.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end_column: text.chars().count() + 1,
    };

    let expr = parser.expression()?;
    match parser.peek() {
        Some(token) => Err(unexpected(token)),
        None => Ok(expr),
    }
}

struct Parser<'source> {
    tokens: Vec<Token<'source>>,
    pos: usize,
    depth: usize,
    end_column: usize,
}

impl<'source> Parser<'source> {
    fn peek(&self) -> Option<&Token<'source>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn advance(&mut self) -> Option<Token<'source>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end_of_input(&self) -> ParseError {
        ParseError::Syntax {
            column: self.end_column,
            message: "unexpected end of expression".to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'source>, ParseError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(match token.kind.unsupported_construct() {
                Some(_) => unexpected(&token),
                None => ParseError::Syntax {
                    column: token.column,
                    message: format!("expected {what}, found `{}`", token.lexeme),
                },
            }),
            None => Err(ParseError::Syntax {
                column: self.end_column,
                message: format!("expected {what}"),
            }),
        }
    }

    /// Runs `f` one nesting level deeper, failing once the limit is exceeded.
    fn nested<T>(
        &mut self,
        column: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::Syntax {
                column,
                message: "expression is nested too deeply".to_string(),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Consumes a binary operator, counting it toward the depth limit.
    ///
    /// Every operator of a chain adds one level to the left-leaning tree, so long flat
    /// chains are bounded the same way as nested parentheses.
    fn operator(&mut self) -> Result<(), ParseError> {
        let column = self.peek().map_or(self.end_column, |token| token.column);
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::Syntax {
                column,
                message: "expression is too long".to_string(),
            });
        }
        self.depth += 1;
        self.pos += 1;
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Add) => BinaryOp::Add,
                Some(TokenKind::Sub) => BinaryOp::Sub,
                _ => break,
            };
            self.operator()?;
            let rhs = self.multiplicative()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = self.power()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Mul) => BinaryOp::Mul,
                Some(TokenKind::Div) => BinaryOp::Div,
                Some(TokenKind::Mod) => BinaryOp::Mod,
                _ => break,
            };
            self.operator()?;
            let rhs = self.power()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = self.unary()?;
        while self.peek_kind() == Some(TokenKind::Pow) {
            self.operator()?;
            let rhs = self.unary()?;
            lhs = Expr::binary(BinaryOp::Pow, lhs, rhs);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let Some((kind, column)) = self.peek().map(|token| (token.kind, token.column)) else {
            return Err(self.end_of_input());
        };
        match kind {
            TokenKind::Sub => {
                self.pos += 1;
                self.nested(column, |p| p.unary().map(Expr::neg))
            }
            TokenKind::Add => {
                self.pos += 1;
                self.nested(column, |p| p.unary().map(Expr::pos))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input());
        };

        match token.kind {
            TokenKind::Number => parse_number(&token),
            TokenKind::Name => {
                if self.peek_kind() == Some(TokenKind::OpenParen) {
                    self.nested(token.column, |p| p.call(&token))
                } else {
                    Ok(Expr::Identifier(token.lexeme.to_string()))
                }
            }
            TokenKind::OpenParen => self.nested(token.column, |p| {
                let inner = p.expression()?;
                p.expect(TokenKind::CloseParen, "`)`")?;
                Ok(Expr::group(inner))
            }),
            _ => Err(unexpected(&token)),
        }
    }

    /// Parses the argument list of a call whose name token has already been consumed.
    fn call(&mut self, name: &Token<'source>) -> Result<Expr, ParseError> {
        let Some(function) = MathFunction::from_name(name.lexeme) else {
            return Err(ParseError::UnknownFunction {
                column: name.column,
                name: name.lexeme.to_string(),
                supported: MathFunction::supported_names(),
            });
        };

        self.expect(TokenKind::OpenParen, "`(`")?;

        let mut args = Vec::with_capacity(1);
        if self.peek_kind() != Some(TokenKind::CloseParen) {
            args.push(self.expression()?);
            while self.peek_kind() == Some(TokenKind::Comma) {
                self.pos += 1;
                args.push(self.expression()?);
            }
        }
        self.expect(TokenKind::CloseParen, "`)` or `,`")?;

        if args.len() != 1 {
            return Err(ParseError::Arity {
                column: name.column,
                name: function.name().to_string(),
                got: args.len(),
            });
        }

        let arg = args.swap_remove(0);
        Ok(Expr::Call(name.lexeme.to_string(), Box::new(arg)))
    }
}

fn parse_number(token: &Token<'_>) -> Result<Expr, ParseError> {
    match token.lexeme.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Expr::Literal(value)),
        _ => Err(ParseError::Syntax {
            column: token.column,
            message: format!("number `{}` is out of range", token.lexeme),
        }),
    }
}

/// Builds the error for a token that cannot appear where it was found.
fn unexpected(token: &Token<'_>) -> ParseError {
    match token.kind.unsupported_construct() {
        Some(construct) => ParseError::UnsupportedConstruct {
            column: token.column,
            construct: format!("{construct} `{}`", token.lexeme),
        },
        None => ParseError::Syntax {
            column: token.column,
            message: format!("unexpected `{}`", token.lexeme),
        },
    }
}
