//! Formula normalization and tokenization using logos
//!
//! Kinetic laws arrive as infix strings such as `k1 * A / (Km + A)` or
//! `Vmax*S/(Km+S)`. Supported tokens:
//! - Identifiers: A, k1, Km_glc
//! - Numbers: 1, 2.5, .5, 1e-3
//! - Operators: +, -, *, /, ^, =
//! - Punctuation: (, ), ,

use std::ops::Range;

use logos::Logos;

use crate::error::{CompileError, CompileResult};

/// Token types for kinetic-law formulas
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // Literals keep their source text so they can be emitted verbatim
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Operators
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("=")]
    Equals,

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,
}

impl Token {
    /// Identifiers and numbers; everything else is structural
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Ident(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Equals => write!(f, "="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// A token together with its byte range in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Surround every bracket with single spaces and collapse whitespace runs.
pub fn normalize(raw: &str) -> String {
    raw.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize a formula, rejecting bad characters, malformed numbers and unbalanced brackets
pub fn tokenize(source: &str) -> CompileResult<Vec<Lexeme>> {
    let mut lexer = Token::lexer(source);
    let mut lexemes: Vec<Lexeme> = Vec::new();
    let mut depth = 0usize;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = result.map_err(|_| {
            CompileError::lexer(span.start, format!("unexpected input '{}'", lexer.slice()))
        })?;

        // `2x` or `1.2.3` lex as a number glued to another operand
        if let Some(prev) = lexemes.last() {
            if matches!(prev.token, Token::Number(_))
                && token.is_operand()
                && prev.span.end == span.start
            {
                return Err(CompileError::lexer(
                    prev.span.start,
                    format!(
                        "malformed numeric literal '{}'",
                        &source[prev.span.start..span.end]
                    ),
                ));
            }
        }

        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                if depth == 0 {
                    return Err(CompileError::lexer(span.start, "unbalanced ')'"));
                }
                depth -= 1;
            }
            _ => {}
        }

        lexemes.push(Lexeme { token, span });
    }

    if depth > 0 {
        return Err(CompileError::lexer(
            source.len(),
            format!("{} unclosed '('", depth),
        ));
    }

    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|lexeme| lexeme.token)
            .collect()
    }

    #[test]
    fn test_normalize_brackets() {
        assert_eq!(normalize("QRest*(CArt /VArt)"), "QRest* ( CArt /VArt )");
        assert_eq!(normalize("  k1   *  A "), "k1 * A");
        assert_eq!(normalize("f(x)"), "f ( x )");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            tokens("k1 * A"),
            vec![
                Token::Ident("k1".to_string()),
                Token::Star,
                Token::Ident("A".to_string()),
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens_split() {
        assert_eq!(
            tokens("Vmax*S/(Km+S)"),
            vec![
                Token::Ident("Vmax".to_string()),
                Token::Star,
                Token::Ident("S".to_string()),
                Token::Slash,
                Token::LParen,
                Token::Ident("Km".to_string()),
                Token::Plus,
                Token::Ident("S".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_numbers_keep_text() {
        assert_eq!(
            tokens("1e-3 * .5 ^ 2.0"),
            vec![
                Token::Number("1e-3".to_string()),
                Token::Star,
                Token::Number(".5".to_string()),
                Token::Caret,
                Token::Number("2.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_function_call_tokens() {
        assert_eq!(
            tokens("hill(S, 2)"),
            vec![
                Token::Ident("hill".to_string()),
                Token::LParen,
                Token::Ident("S".to_string()),
                Token::Comma,
                Token::Number("2".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_malformed_number() {
        assert!(matches!(
            tokenize("2x * A"),
            Err(CompileError::LexerError { position: 0, .. })
        ));
        assert!(tokenize("1.2.3").is_err());
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert!(tokenize("( k1 * A").is_err());
        assert!(tokenize("k1 * A )").is_err());
        assert!(tokenize("( ( k1 ) * A )").is_ok());
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("k1 $ A").unwrap_err();
        assert!(matches!(err, CompileError::LexerError { position: 3, .. }));
    }
}
