//! Error types for the reaction-network compiler

use serde::Serialize;
use thiserror::Error;

/// Result type for compilation operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at position {position}: {message}")]
    LexerError { position: usize, message: String },

    #[error("Malformed kinetic law in reaction '{reaction}' ({formula}): {message}")]
    MalformedFormula {
        reaction: String,
        formula: String,
        message: String,
    },

    #[error("Unresolved token '{token}' in the ODE for species '{species}'{}", reaction_suffix(.reaction))]
    UnresolvedToken {
        species: String,
        reaction: Option<String>,
        token: String,
    },

    #[error("Binding mismatch for species '{species}': {message}")]
    BindingMismatch { species: String, message: String },

    #[error("Reaction '{reaction}' references undeclared species '{species}'")]
    UnknownSpecies { reaction: String, species: String },

    #[error("Species '{species}' lives in undeclared compartment '{compartment}'")]
    UnknownCompartment { species: String, compartment: String },

    #[error("Cannot expand function '{function}': {message}")]
    FunctionExpansion { function: String, message: String },

    #[error("{} species failed to compile: {}", .0.len(), failure_list(.0))]
    SpeciesFailures(Vec<SpeciesFailure>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn reaction_suffix(reaction: &Option<String>) -> String {
    match reaction {
        Some(id) => format!(" (reaction '{}')", id),
        None => String::new(),
    }
}

fn failure_list(failures: &[SpeciesFailure]) -> String {
    failures
        .iter()
        .map(|f| f.species.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CompileError {
    pub fn lexer(position: usize, msg: impl Into<String>) -> Self {
        CompileError::LexerError {
            position,
            message: msg.into(),
        }
    }

    pub fn malformed(
        reaction: impl Into<String>,
        formula: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        CompileError::MalformedFormula {
            reaction: reaction.into(),
            formula: formula.into(),
            message: msg.into(),
        }
    }

    pub fn mismatch(species: impl Into<String>, msg: impl Into<String>) -> Self {
        CompileError::BindingMismatch {
            species: species.into(),
            message: msg.into(),
        }
    }

    pub fn expansion(function: impl Into<String>, msg: impl Into<String>) -> Self {
        CompileError::FunctionExpansion {
            function: function.into(),
            message: msg.into(),
        }
    }

    /// Errors that abort the whole run instead of failing a single species.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompileError::BindingMismatch { .. }
                | CompileError::UnknownSpecies { .. }
                | CompileError::UnknownCompartment { .. }
                | CompileError::SpeciesFailures(_)
                | CompileError::Io(_)
                | CompileError::Json(_)
        )
    }
}

/// A species whose ODE could not be compiled
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesFailure {
    pub species: String,
    pub message: String,
}

impl SpeciesFailure {
    pub fn new(species: impl Into<String>, error: &CompileError) -> Self {
        Self {
            species: species.into(),
            message: error.to_string(),
        }
    }
}

/// A recoverable warning raised while compiling one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub species: String,
    pub reaction: Option<String>,
    pub token: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unresolved token '{}' dropped from the ODE for '{}'{}",
            self.token,
            self.species,
            reaction_suffix(&self.reaction)
        )
    }
}
