//! Compiler configuration

use serde::{Deserialize, Serialize};

/// What to do with a token that matches no known entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop the token without a trace, like the legacy compiler
    Drop,
    /// Drop the token and report a diagnostic
    #[default]
    Warn,
    /// Fail the owning species
    Fail,
}

/// Solver settings for the single partition every edge belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    pub id: u32,
    pub solver_type: String,
    pub start_step_size: f64,
    pub local_error_maximum: f64,
    pub local_error_minimum: f64,
    pub explicit_implicit_switch_step_size_tolerance: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            id: 1,
            solver_type: "ODE".to_string(),
            start_step_size: 0.01,
            local_error_maximum: 1.0e-6,
            local_error_minimum: 1.0e-12,
            explicit_implicit_switch_step_size_tolerance: 1.0e-3,
        }
    }
}

/// Options for one compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub unresolved: UnresolvedPolicy,
    /// Emit the species that compiled when others fail
    pub partial_output: bool,
    /// Compile compartments to their size and divide each term by the
    /// species' compartment volume. Off by default: compartments compile
    /// to `1` and terms are not scaled.
    pub scale_by_compartment_volume: bool,
    pub partition: PartitionConfig,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Warn,
            partial_output: true,
            scale_by_compartment_volume: false,
            partition: PartitionConfig::default(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unresolved tokens and species failures both abort the run
    pub fn strict() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Fail,
            partial_output: false,
            ..Self::default()
        }
    }

    /// Drops unresolved tokens silently, as the legacy compiler did
    pub fn legacy() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Drop,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
