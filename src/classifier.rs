//! Token classification against the entity catalog
//!
//! Both compiler passes scan formulas through the same [`Scanner`], so a
//! token always lands in the same [`Category`] no matter which pass asks.

use std::collections::HashMap;

use crate::catalog::{Entity, EntityCatalog};
use crate::error::{CompileError, CompileResult};
use crate::lexer::{normalize, tokenize, Lexeme, Token};

/// Maximum nesting of inline function expansions
pub const MAX_EXPANSION_DEPTH: usize = 32;

/// The category of one formula token
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    Species(String),
    Compartment { id: String, size: f64 },
    Parameter { id: String, value: f64 },
    /// A defined-function call resolved to a stored value; arguments are not evaluated
    FunctionCall { head: String, value: f64 },
    /// Numeric literal, kept as written
    Literal(String),
    /// Operator, bracket or comma
    Operator(Token),
    Unresolved(String),
}

/// What a defined-function call turns into
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(f64),
    /// Formula text spliced in place of the call, bracketed
    Expression(String),
}

/// Resolves defined-function heads
pub trait FunctionResolver {
    fn resolve(&self, head: &str, args: &[String], catalog: &EntityCatalog) -> Option<Resolution>;
}

/// Resolves a function head through the parameter table, ignoring its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterLookup;

impl FunctionResolver for ParameterLookup {
    fn resolve(&self, head: &str, _args: &[String], catalog: &EntityCatalog) -> Option<Resolution> {
        catalog.parameter(head).map(Resolution::Value)
    }
}

impl FunctionResolver for HashMap<String, Resolution> {
    fn resolve(&self, head: &str, _args: &[String], _catalog: &EntityCatalog) -> Option<Resolution> {
        self.get(head).cloned()
    }
}

/// Splits formulas into classified tokens
pub struct Scanner<'a> {
    catalog: &'a EntityCatalog,
    resolver: &'a dyn FunctionResolver,
}

impl<'a> Scanner<'a> {
    pub fn new(catalog: &'a EntityCatalog, resolver: &'a dyn FunctionResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        self.catalog
    }

    /// Classify a bare identifier
    pub fn classify(&self, ident: &str) -> Category {
        match self.catalog.classify(ident) {
            Entity::Compartment { size } => Category::Compartment {
                id: ident.to_string(),
                size,
            },
            Entity::Species => Category::Species(ident.to_string()),
            Entity::Parameter { value } => Category::Parameter {
                id: ident.to_string(),
                value,
            },
            Entity::Unresolved => Category::Unresolved(ident.to_string()),
        }
    }

    /// Tokenize and classify a whole formula
    pub fn scan(&self, formula: &str) -> CompileResult<Vec<Category>> {
        let mut out = Vec::new();
        self.scan_into(formula, 0, &mut out)?;
        Ok(out)
    }

    fn scan_into(&self, formula: &str, depth: usize, out: &mut Vec<Category>) -> CompileResult<()> {
        let lexemes = tokenize(formula)?;
        let mut i = 0;

        while i < lexemes.len() {
            match &lexemes[i].token {
                Token::Number(text) => {
                    out.push(Category::Literal(text.clone()));
                    i += 1;
                }
                Token::Ident(name) => {
                    let opens_call = matches!(
                        lexemes.get(i + 1).map(|l| &l.token),
                        Some(Token::LParen)
                    );

                    if opens_call && self.catalog.is_function(name) {
                        let close = matching_paren(&lexemes, i + 1)?;
                        let args = split_args(&lexemes[i + 2..close]);
                        self.push_call(name, &args, depth, out)?;
                        i = close + 1;
                    } else {
                        out.push(self.classify(name));
                        i += 1;
                    }
                }
                other => {
                    out.push(Category::Operator(other.clone()));
                    i += 1;
                }
            }
        }

        Ok(())
    }

    fn push_call(
        &self,
        head: &str,
        args: &[String],
        depth: usize,
        out: &mut Vec<Category>,
    ) -> CompileResult<()> {
        match self.resolver.resolve(head, args, self.catalog) {
            Some(Resolution::Value(value)) => {
                out.push(Category::FunctionCall {
                    head: head.to_string(),
                    value,
                });
            }
            Some(Resolution::Expression(body)) => {
                if depth >= MAX_EXPANSION_DEPTH {
                    return Err(CompileError::expansion(
                        head,
                        format!("nested deeper than {} levels", MAX_EXPANSION_DEPTH),
                    ));
                }
                out.push(Category::Operator(Token::LParen));
                self.scan_into(&normalize(&body), depth + 1, out)
                    .map_err(|e| match e {
                        CompileError::LexerError { message, .. } => {
                            CompileError::expansion(head, message)
                        }
                        other => other,
                    })?;
                out.push(Category::Operator(Token::RParen));
            }
            None => out.push(Category::Unresolved(head.to_string())),
        }
        Ok(())
    }
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(lexemes: &[Lexeme], open: usize) -> CompileResult<usize> {
    let mut depth = 0usize;
    for (offset, lexeme) in lexemes[open..].iter().enumerate() {
        match lexeme.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(CompileError::lexer(lexemes[open].span.start, "unclosed '('"))
}

/// Split call arguments on top-level commas
fn split_args(lexemes: &[Lexeme]) -> Vec<String> {
    let mut args = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut depth = 0usize;

    for lexeme in lexemes {
        match lexeme.token {
            Token::Comma if depth == 0 => {
                args.push(current.join(" "));
                current.clear();
                continue;
            }
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        current.push(lexeme.token.to_string());
    }

    if !current.is_empty() {
        args.push(current.join(" "));
    }
    args
}
