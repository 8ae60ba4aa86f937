//! Expression code generation
//!
//! Second pass over an accumulated formula. The formula is scanned again,
//! independently of the binding pass, and every token is rewritten into the
//! body of a target-language lambda.

use std::collections::HashSet;

use crate::accumulator::AccumulatedOde;
use crate::bindings::InputBindings;
use crate::classifier::{Category, Scanner};
use crate::config::UnresolvedPolicy;
use crate::error::{CompileError, CompileResult, Diagnostic};

/// A generated lambda: `fn(input1, input2) -> body end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: String,
}

impl std::fmt::Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            write!(f, "fn({}) -> end", self.params.join(", "))
        } else {
            write!(f, "fn({}) -> {} end", self.params.join(", "), self.body)
        }
    }
}

/// Render a substituted number; negatives are bracketed so they survive
/// next to a binary operator.
pub fn format_value(value: f64) -> String {
    if value.is_sign_negative() {
        format!("( {} )", value)
    } else {
        format!("{}", value)
    }
}

/// Result of generating one species' lambda
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLambda {
    pub lambda: Lambda,
    pub diagnostics: Vec<Diagnostic>,
}

/// Code generator for species derivative lambdas
pub struct CodeGenerator<'a> {
    scanner: &'a Scanner<'a>,
    unresolved: UnresolvedPolicy,
    scale_by_volume: bool,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(scanner: &'a Scanner<'a>, unresolved: UnresolvedPolicy, scale_by_volume: bool) -> Self {
        Self {
            scanner,
            unresolved,
            scale_by_volume,
        }
    }

    /// Rewrite an accumulated ODE using the bindings built from the same formula.
    ///
    /// Scans term by term so unresolved tokens carry their own reaction; the
    /// formula is the rendered terms joined by single spaces.
    pub fn generate(
        &self,
        ode: &AccumulatedOde,
        bindings: &InputBindings,
    ) -> CompileResult<GeneratedLambda> {
        let mut parts: Vec<String> = Vec::new();
        let mut diagnostics = Vec::new();
        let mut used: HashSet<String> = HashSet::new();

        for term in &ode.terms {
            for category in self.scanner.scan(&term.render())? {
                match category {
                    Category::Operator(token) => parts.push(token.to_string()),
                    Category::Literal(text) => parts.push(text),
                    Category::Species(id) => {
                        let name = bindings.lookup(&id).ok_or_else(|| {
                            CompileError::mismatch(
                                &ode.species,
                                format!("species '{}' was never bound", id),
                            )
                        })?;
                        parts.push(name.to_string());
                        used.insert(id);
                    }
                    Category::Compartment { size, .. } => {
                        if self.scale_by_volume {
                            parts.push(format_value(size));
                        } else {
                            parts.push("1".to_string());
                        }
                    }
                    Category::Parameter { value, .. } | Category::FunctionCall { value, .. } => {
                        parts.push(format_value(value));
                    }
                    Category::Unresolved(token) => {
                        if let Some(diagnostic) =
                            self.handle_unresolved(&ode.species, &term.reaction, token)?
                        {
                            diagnostics.push(diagnostic);
                        }
                    }
                }
            }
        }

        if used.len() != bindings.len() {
            return Err(CompileError::mismatch(
                &ode.species,
                format!(
                    "{} bindings built but {} referenced by the generated body",
                    bindings.len(),
                    used.len()
                ),
            ));
        }

        Ok(GeneratedLambda {
            lambda: Lambda {
                params: bindings.names(),
                body: parts.join(" "),
            },
            diagnostics,
        })
    }

    fn handle_unresolved(
        &self,
        species: &str,
        reaction: &str,
        token: String,
    ) -> CompileResult<Option<Diagnostic>> {
        match self.unresolved {
            UnresolvedPolicy::Drop => Ok(None),
            UnresolvedPolicy::Warn => {
                let diagnostic = Diagnostic {
                    species: species.to_string(),
                    reaction: Some(reaction.to_string()),
                    token,
                };
                log::warn!("{}", diagnostic);
                Ok(Some(diagnostic))
            }
            UnresolvedPolicy::Fail => Err(CompileError::UnresolvedToken {
                species: species.to_string(),
                reaction: Some(reaction.to_string()),
                token,
            }),
        }
    }
}
