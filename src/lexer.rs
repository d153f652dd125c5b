//! Tokenizer for formula text.
//!
//! Besides the tokens the grammar uses, the tokenizer recognizes operators and punctuation
//! from richer expression languages (logical, relational, bitwise, assignment, ternary,
//! brackets, member access) so the parser can reject them as unsupported instead of
//! reporting a confusing syntax error.

use std::ops::Range;

use logos::Logos;

use crate::errors::ParseError;

/// The different kinds of tokens that can be produced by the tokenizer.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("%")]
    Mod,

    #[token("^")]
    #[token("^^")]
    Pow,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token(",")]
    Comma,

    #[token("&&")]
    #[token("||")]
    #[token("!")]
    Logical,

    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    Relational,

    #[token("&")]
    #[token("|")]
    #[token("~")]
    #[token("<<")]
    #[token(">>")]
    Bitwise,

    #[token("=")]
    Assign,

    #[token("?")]
    #[token(":")]
    Ternary,

    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    Bracket,

    #[token(".")]
    Dot,

    #[token("\"")]
    #[token("'")]
    Quote,
}

impl TokenKind {
    /// Describes a token from outside the supported grammar, or `None` if the grammar uses it.
    pub fn unsupported_construct(self) -> Option<&'static str> {
        match self {
            TokenKind::Logical => Some("logical operator"),
            TokenKind::Relational => Some("relational operator"),
            TokenKind::Bitwise => Some("bitwise operator"),
            TokenKind::Assign => Some("assignment"),
            TokenKind::Ternary => Some("conditional expression"),
            TokenKind::Bracket => Some("array or struct syntax"),
            TokenKind::Dot => Some("member access"),
            TokenKind::Quote => Some("string or character literal"),
            _ => None,
        }
    }
}

/// A token with its position in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'source> {
    pub kind: TokenKind,
    /// Byte range in the source text
    pub span: Range<usize>,
    /// 1-based character column of the first character
    pub column: usize,
    pub lexeme: &'source str,
}

/// Returns the 1-based character column of a byte offset.
pub fn column_at(input: &str, offset: usize) -> usize {
    input[..offset].chars().count() + 1
}

/// Tokenizes the complete input, stopping at the first character no token starts with.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let column = column_at(input, span.start);
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span,
                column,
                lexeme: lexer.slice(),
            }),
            Err(()) => {
                return Err(ParseError::Syntax {
                    column,
                    message: format!("unexpected character `{}`", lexer.slice()),
                })
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the tokens produced by the tokenizer to the expected kinds and lexemes.
    fn compare_tokens<const N: usize>(input: &str, expected: [(TokenKind, &str); N]) {
        let tokens = tokenize(input).unwrap();
        let actual: Vec<(TokenKind, &str)> = tokens.iter().map(|t| (t.kind, t.lexeme)).collect();
        assert_eq!(actual, expected.to_vec());
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "2 * x + 1",
            [
                (TokenKind::Number, "2"),
                (TokenKind::Mul, "*"),
                (TokenKind::Name, "x"),
                (TokenKind::Add, "+"),
                (TokenKind::Number, "1"),
            ],
        );
    }

    #[test]
    fn number_forms() {
        compare_tokens(
            "1 1.5 .5 2. 1e-3 2.5E+4",
            [
                (TokenKind::Number, "1"),
                (TokenKind::Number, "1.5"),
                (TokenKind::Number, ".5"),
                (TokenKind::Number, "2."),
                (TokenKind::Number, "1e-3"),
                (TokenKind::Number, "2.5E+4"),
            ],
        );
    }

    #[test]
    fn both_power_spellings() {
        compare_tokens(
            "x^2^^3",
            [
                (TokenKind::Name, "x"),
                (TokenKind::Pow, "^"),
                (TokenKind::Number, "2"),
                (TokenKind::Pow, "^^"),
                (TokenKind::Number, "3"),
            ],
        );
    }

    #[test]
    fn unsupported_operators_are_recognized() {
        compare_tokens(
            "x && 1 <= y",
            [
                (TokenKind::Name, "x"),
                (TokenKind::Logical, "&&"),
                (TokenKind::Number, "1"),
                (TokenKind::Relational, "<="),
                (TokenKind::Name, "y"),
            ],
        );
        assert_eq!(
            TokenKind::Logical.unsupported_construct(),
            Some("logical operator")
        );
        assert_eq!(TokenKind::Mul.unsupported_construct(), None);
    }

    #[test]
    fn columns_count_characters() {
        let tokens = tokenize("  sin(x)").unwrap();
        assert_eq!(tokens[0].column, 3);
        assert_eq!(tokens[1].column, 6);

        // Multi-byte characters count as one column
        assert_eq!(column_at("π+x", "π+".len()), 3);
    }

    #[test]
    fn unknown_character() {
        let err = tokenize("x + $").unwrap_err();
        assert_eq!(
            err,
            ParseError::Syntax {
                column: 5,
                message: "unexpected character `$`".to_string()
            }
        );
    }
}
