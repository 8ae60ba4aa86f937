//! Reaction Network to Dataflow Graph Compiler
//!
//! This library compiles a biochemical reaction network (compartments,
//! species, parameters and reactions with kinetic-law formulas) into a
//! dataflow graph: one node per species and one generated derivative lambda
//! per species, ready for a downstream ODE solver.
//!
//! # Example
//!
//! ```rust
//! use reaction_graph::{compile, CompileOptions, Reaction, ReactionNetwork};
//!
//! let network = ReactionNetwork::new()
//!     .compartment("cell", 1.0)
//!     .species("A", 10.0, "cell")
//!     .species("B", 0.0, "cell")
//!     .parameter("k1", 0.5)
//!     .reaction(Reaction::new("r1", "k1 * A").reactant("A", 1.0).product("B", 1.0));
//!
//! let result = compile(&network, &CompileOptions::default()).unwrap();
//! let edge = result.graph.edge("A").unwrap();
//! assert_eq!(edge.lambda, "fn(input1) -> - ( 1 * ( 0.5 * input1 ) ) end");
//! ```

pub mod model;
pub mod catalog;
pub mod lexer;
pub mod classifier;
pub mod accumulator;
pub mod bindings;
pub mod codegen;
pub mod graph;
pub mod assembler;
pub mod config;
pub mod error;

pub use model::*;
pub use catalog::{Entity, EntityCatalog};
pub use classifier::{Category, FunctionResolver, ParameterLookup, Resolution, Scanner};
pub use accumulator::{AccumulatedOde, OdeAccumulator};
pub use bindings::{InputBinding, InputBindings};
pub use codegen::{CodeGenerator, Lambda};
pub use graph::{CompiledEdge, Graph, Node, OutputMode, Partition};
pub use assembler::GraphAssembler;
pub use config::{CompileOptions, PartitionConfig, UnresolvedPolicy};
pub use error::{CompileError, CompileResult, Diagnostic, SpeciesFailure};

use accumulator::AccumulatedSystem;
use codegen::GeneratedLambda;

/// Output of a compilation run
#[derive(Debug, Clone)]
pub struct Compilation {
    pub graph: Graph,
    /// Unresolved-token warnings
    pub diagnostics: Vec<Diagnostic>,
    /// Species left out of the graph; empty unless partial output is enabled
    pub failures: Vec<SpeciesFailure>,
}

/// Main compilation function, resolving defined functions through the parameter table
pub fn compile(network: &ReactionNetwork, options: &CompileOptions) -> CompileResult<Compilation> {
    compile_with_resolver(network, options, &ParameterLookup)
}

/// Compile with a custom function resolver
pub fn compile_with_resolver(
    network: &ReactionNetwork,
    options: &CompileOptions,
    resolver: &dyn FunctionResolver,
) -> CompileResult<Compilation> {
    let catalog = EntityCatalog::from_network(network)?;
    let scanner = Scanner::new(&catalog, resolver);

    // Accumulate signed terms per species
    let mut accumulator = OdeAccumulator::new(
        &catalog,
        network.species.iter().map(|s| s.id.as_str()),
        options.scale_by_compartment_volume,
    );
    accumulator.accumulate_all(&network.reactions)?;
    let AccumulatedSystem { odes, failures } = accumulator.finish();

    let codegen = CodeGenerator::new(
        &scanner,
        options.unresolved,
        options.scale_by_compartment_volume,
    );

    let mut assembler = GraphAssembler::new(&options.partition);
    for species in &network.species {
        assembler.add_node(species);
    }

    let mut diagnostics = Vec::new();
    let mut species_failures = Vec::new();

    for ode in &odes {
        if let Some(error) = failures.get(&ode.species) {
            species_failures.push(SpeciesFailure::new(&ode.species, error));
            continue;
        }

        match compile_species(ode, &scanner, &codegen) {
            Ok((bindings, generated)) => {
                log::debug!(
                    "{}: {} inputs, {} terms",
                    ode.process_variable,
                    bindings.len(),
                    ode.terms.len()
                );
                assembler.add_edge(ode, &bindings, &generated.lambda);
                diagnostics.extend(generated.diagnostics);
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => species_failures.push(SpeciesFailure::new(&ode.species, &error)),
        }
    }

    if !species_failures.is_empty() {
        if !options.partial_output {
            return Err(CompileError::SpeciesFailures(species_failures));
        }
        for failure in &species_failures {
            log::warn!("species '{}' omitted: {}", failure.species, failure.message);
        }
    }

    Ok(Compilation {
        graph: assembler.finish(),
        diagnostics,
        failures: species_failures,
    })
}

/// Run both passes over one species' formula
fn compile_species(
    ode: &AccumulatedOde,
    scanner: &Scanner<'_>,
    codegen: &CodeGenerator<'_>,
) -> CompileResult<(InputBindings, GeneratedLambda)> {
    let bindings = InputBindings::build(&ode.formula, scanner)?;
    let generated = codegen.generate(ode, &bindings)?;
    Ok((bindings, generated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn a_to_b() -> ReactionNetwork {
        ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 10.0, "cell")
            .species("B", 0.0, "cell")
            .parameter("k1", 0.5)
            .reaction(
                Reaction::new("r1", "k1 * A")
                    .reactant("A", 1.0)
                    .product("B", 1.0),
            )
    }

    #[test]
    fn test_single_reaction_edges() {
        let result = compile(&a_to_b(), &CompileOptions::default()).unwrap();
        let graph = &result.graph;

        let a = graph.edge("A").unwrap();
        assert_eq!(a.lambda, "fn(input1) -> - ( 1 * ( 0.5 * input1 ) ) end");
        assert_eq!(a.inputs.get("input1").map(String::as_str), Some(":A"));
        assert_eq!(a.outputs.get(":A"), Some(&OutputMode::Add));

        let b = graph.edge("B").unwrap();
        assert_eq!(b.lambda, "fn(input1) -> + ( 1 * ( 0.5 * input1 ) ) end");
        assert_eq!(b.inputs.get("input1").map(String::as_str), Some(":A"));
        assert_eq!(b.outputs.get(":B"), Some(&OutputMode::Add));

        assert_eq!(graph.node("A").unwrap().initial_value, 10.0);
        assert_eq!(graph.node("B").unwrap().initial_value, 0.0);
        assert_eq!(graph.partitions.len(), 1);
        assert!(result.diagnostics.is_empty());
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_no_reactions_gives_empty_edges() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 1.0, "cell")
            .species("B", 2.0, "cell");
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        assert_eq!(graph.edges.len(), 2);
        for edge in graph.edges.values() {
            assert_eq!(edge.lambda, "fn() -> end");
            assert!(edge.inputs.is_empty());
            assert_eq!(edge.outputs.len(), 1);
        }
    }

    #[test]
    fn test_species_squared_bound_once() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 1.0, "cell")
            .species("D", 0.0, "cell")
            .reaction(
                Reaction::new("dimerize", "A * A")
                    .reactant("A", 2.0)
                    .product("D", 1.0),
            );
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        let edge = graph.edge("A").unwrap();
        assert_eq!(edge.inputs.len(), 1);
        assert_eq!(edge.lambda, "fn(input1) -> - ( 2 * ( input1 * input1 ) ) end");
    }

    #[test]
    fn test_parameter_only_law() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("B", 0.0, "cell")
            .parameter("k1", 0.5)
            .reaction(Reaction::new("inflow", "k1").product("B", 1.0));
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        let edge = graph.edge("B").unwrap();
        assert!(edge.inputs.is_empty());
        assert_eq!(edge.lambda, "fn() -> + ( 1 * ( 0.5 ) ) end");
    }

    #[test]
    fn test_bindings_span_reactions() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 1.0, "cell")
            .species("B", 1.0, "cell")
            .species("C", 0.0, "cell")
            .parameter("k1", 0.5)
            .parameter("k2", 2.0)
            .reaction(Reaction::new("r1", "k1 * B").product("C", 1.0))
            .reaction(Reaction::new("r2", "k2 * A * B").product("C", 1.0));
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        let edge = graph.edge("C").unwrap();
        let inputs: Vec<_> = edge
            .inputs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(inputs, vec![("input1", ":B"), ("input2", ":A")]);
        assert_eq!(
            edge.lambda,
            "fn(input1, input2) -> + ( 1 * ( 0.5 * input1 ) ) + ( 1 * ( 2 * input2 * input1 ) ) end"
        );
    }

    #[test]
    fn test_compartment_is_one_regardless_of_size() {
        let network = ReactionNetwork::new()
            .compartment("cyto", 4.5)
            .species("A", 1.0, "cyto")
            .parameter("k1", 0.5)
            .reaction(Reaction::new("r1", "cyto * k1 * A").reactant("A", 1.0));
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        assert_eq!(
            graph.edge("A").unwrap().lambda,
            "fn(input1) -> - ( 1 * ( 1 * 0.5 * input1 ) ) end"
        );
    }

    #[test]
    fn test_volume_scaling_flag() {
        let network = ReactionNetwork::new()
            .compartment("cyto", 4.5)
            .species("A", 1.0, "cyto")
            .parameter("k1", 0.5)
            .reaction(Reaction::new("r1", "cyto * k1 * A").reactant("A", 1.0));
        let options = CompileOptions {
            scale_by_compartment_volume: true,
            ..CompileOptions::default()
        };
        let graph = compile(&network, &options).unwrap().graph;

        assert_eq!(
            graph.edge("A").unwrap().lambda,
            "fn(input1) -> - ( 1 * ( 4.5 * 0.5 * input1 ) / 4.5 ) end"
        );
    }

    #[test]
    fn test_unresolved_token_warns_by_default() {
        let network = a_to_b().reaction(Reaction::new("r2", "kx * B").reactant("B", 1.0));
        let result = compile(&network, &CompileOptions::default()).unwrap();

        assert_eq!(
            result.diagnostics,
            vec![Diagnostic {
                species: "B".into(),
                reaction: Some("r2".into()),
                token: "kx".into(),
            }]
        );
        assert_eq!(
            result.graph.edge("B").unwrap().lambda,
            "fn(input1, input2) -> + ( 1 * ( 0.5 * input1 ) ) - ( 1 * ( * input2 ) ) end"
        );
    }

    #[test]
    fn test_unresolved_tokens_report_their_own_reaction() {
        let network = a_to_b()
            .reaction(Reaction::new("r2", "kx * B").reactant("B", 1.0))
            .reaction(Reaction::new("r3", "ky + kx * B").reactant("B", 1.0));
        let result = compile(&network, &CompileOptions::default()).unwrap();

        let reported: Vec<(&str, &str)> = result
            .diagnostics
            .iter()
            .map(|d| (d.token.as_str(), d.reaction.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(reported, vec![("kx", "r2"), ("ky", "r3"), ("kx", "r3")]);
    }

    #[test]
    fn test_numeric_literal_in_law() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 4.0, "cell")
            .reaction(Reaction::new("decay", "2 * A").reactant("A", 1.0));
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        assert_eq!(
            graph.edge("A").unwrap().lambda,
            "fn(input1) -> - ( 1 * ( 2 * input1 ) ) end"
        );
    }

    #[test]
    fn test_strict_mode_fails_on_unresolved() {
        let network = a_to_b().reaction(Reaction::new("r2", "kx * B").reactant("B", 1.0));
        let err = compile(&network, &CompileOptions::strict()).unwrap_err();

        match err {
            CompileError::SpeciesFailures(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].species, "B");
            }
            other => panic!("Expected SpeciesFailures, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_output_skips_failed_species() {
        let network = a_to_b()
            .species("C", 0.0, "cell")
            .reaction(Reaction::new("broken", "k1 * (A").product("C", 1.0));
        let result = compile(&network, &CompileOptions::default()).unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].species, "C");
        assert!(result.failures[0].message.contains("broken"));
        assert!(result.graph.edge("C").is_none());
        assert!(result.graph.node("C").is_some());
        assert!(result.graph.edge("A").is_some());
    }

    #[test]
    fn test_all_or_nothing_collects_every_failure() {
        let network = a_to_b()
            .species("C", 0.0, "cell")
            .reaction(Reaction::new("broken", "2x").reactant("A", 1.0).product("C", 1.0));
        let options = CompileOptions {
            partial_output: false,
            ..CompileOptions::default()
        };

        match compile(&network, &options).unwrap_err() {
            CompileError::SpeciesFailures(failures) => {
                let species: Vec<_> = failures.iter().map(|f| f.species.as_str()).collect();
                assert_eq!(species, vec!["A", "C"]);
            }
            other => panic!("Expected SpeciesFailures, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_species_is_fatal() {
        let network = a_to_b().reaction(Reaction::new("r2", "k1").product("Z", 1.0));
        assert!(matches!(
            compile(&network, &CompileOptions::default()),
            Err(CompileError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_function_call_resolves_through_parameters() {
        let network = a_to_b()
            .function("activation")
            .parameter("activation", 3.0)
            .reaction(Reaction::new("r2", "activation(A, k1) * B").reactant("B", 1.0));
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        assert_eq!(
            graph.edge("B").unwrap().lambda,
            "fn(input1, input2) -> + ( 1 * ( 0.5 * input1 ) ) - ( 1 * ( 3 * input2 ) ) end"
        );
    }

    #[test]
    fn test_custom_resolver_inlines_expression() {
        let network = a_to_b()
            .function("mm")
            .parameter("Km", 2.0)
            .reaction(Reaction::new("r2", "mm(B)").reactant("B", 1.0));
        let mut table = HashMap::new();
        table.insert("mm".to_string(), Resolution::Expression("B / (Km + B)".to_string()));

        let graph = compile_with_resolver(&network, &CompileOptions::default(), &table)
            .unwrap()
            .graph;

        assert_eq!(
            graph.edge("B").unwrap().lambda,
            "fn(input1, input2) -> + ( 1 * ( 0.5 * input1 ) ) - ( 1 * ( ( input2 / ( 2 + input2 ) ) ) ) end"
        );
    }

    #[test]
    fn test_legacy_options_match_default_on_clean_models() {
        let default = compile(&a_to_b(), &CompileOptions::default()).unwrap().graph;
        let legacy = compile(&a_to_b(), &CompileOptions::legacy()).unwrap().graph;
        assert_eq!(default, legacy);
    }

    #[test]
    fn test_every_input_appears_in_body() {
        let network = a_to_b()
            .species("C", 0.0, "cell")
            .parameter("k2", 0.25)
            .reaction(
                Reaction::new("r2", "k2 * B * A")
                    .reactant("B", 1.0)
                    .product("C", 2.0),
            );
        let graph = compile(&network, &CompileOptions::default()).unwrap().graph;

        for edge in graph.edges.values() {
            for (name, _) in &edge.inputs {
                assert!(edge.lambda.contains(name.as_str()), "{} missing in {}", name, edge.lambda);
            }
        }
    }
}
