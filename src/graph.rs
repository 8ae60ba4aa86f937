//! Dataflow-graph output types
//!
//! The graph is what the downstream simulation engine consumes: one node per
//! species holding its initial value, one edge per species holding the
//! generated derivative lambda, and the solver partition the edges run in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::accumulator::process_variable;
use crate::config::PartitionConfig;

/// Colon-prefixed reference to a node or process variable, e.g. `:A`
pub fn entity_ref(id: &str) -> String {
    format!(":{}", id)
}

/// A state variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub initial_value: f64,
}

/// How an edge's value is combined into its output node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Added into the node's derivative
    Add,
}

/// The generated derivative function for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledEdge {
    /// Positional name -> entity reference, in binding order
    pub inputs: IndexMap<String, String>,
    pub lambda: String,
    pub outputs: IndexMap<String, OutputMode>,
    pub partition: u32,
}

/// Numerical solver settings for a group of edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub solver_type: String,
    pub start_step_size: f64,
    pub local_error_maximum: f64,
    pub local_error_minimum: f64,
    pub explicit_implicit_switch_step_size_tolerance: f64,
}

impl From<&PartitionConfig> for Partition {
    fn from(config: &PartitionConfig) -> Self {
        Self {
            solver_type: config.solver_type.clone(),
            start_step_size: config.start_step_size,
            local_error_maximum: config.local_error_maximum,
            local_error_minimum: config.local_error_minimum,
            explicit_implicit_switch_step_size_tolerance: config
                .explicit_implicit_switch_step_size_tolerance,
        }
    }
}

/// The complete compiled configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: IndexMap<String, Node>,
    pub edges: IndexMap<String, CompiledEdge>,
    pub partitions: IndexMap<u32, Partition>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, species: &str) -> Option<&Node> {
        self.nodes.get(&entity_ref(species))
    }

    /// Look up an edge by species id
    pub fn edge(&self, species: &str) -> Option<&CompiledEdge> {
        self.edges.get(&entity_ref(&process_variable(species)))
    }

    /// Export to JSON format
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dataflow Graph")?;
        writeln!(f, "==============")?;
        writeln!(f, "Nodes: {}", self.nodes.len())?;
        writeln!(f, "Edges: {}", self.edges.len())?;
        writeln!(f, "Partitions: {}", self.partitions.len())?;
        writeln!(f)?;

        for (name, node) in &self.nodes {
            writeln!(f, "Node {} = {}", name, node.initial_value)?;
        }
        writeln!(f)?;

        for (name, edge) in &self.edges {
            writeln!(f, "Edge {}:", name)?;
            let inputs: Vec<String> = edge
                .inputs
                .iter()
                .map(|(slot, entity)| format!("{} <- {}", slot, entity))
                .collect();
            writeln!(f, "  Inputs: {}", inputs.join(", "))?;
            writeln!(f, "  Lambda: {}", edge.lambda)?;
            for (target, mode) in &edge.outputs {
                writeln!(f, "  Output: {} ({:?})", target, mode)?;
            }
            writeln!(f, "  Partition: {}", edge.partition)?;
        }

        Ok(())
    }
}
