//! Example: Michaelis-Menten enzyme kinetics
//!
//! Compiles a small enzyme network (E + S <-> ES -> E + P) into a dataflow
//! graph and prints the generated lambdas.
//!
//! Run with: cargo run --example mass_action

use reaction_graph::{compile, CompileOptions, Reaction, ReactionNetwork};

fn main() {
    println!("=== Enzyme Kinetics Example ===\n");

    let network = ReactionNetwork::new()
        .compartment("cell", 1.0)
        .species("E", 1.0, "cell")
        .species("S", 10.0, "cell")
        .species("ES", 0.0, "cell")
        .species("P", 0.0, "cell")
        .parameter("kon", 2.0)
        .parameter("koff", 0.5)
        .parameter("kcat", 1.5)
        .reaction(
            Reaction::new("binding", "kon * E * S")
                .reactant("E", 1.0)
                .reactant("S", 1.0)
                .product("ES", 1.0),
        )
        .reaction(
            Reaction::new("unbinding", "koff * ES")
                .reactant("ES", 1.0)
                .product("E", 1.0)
                .product("S", 1.0),
        )
        .reaction(
            Reaction::new("catalysis", "kcat*ES")
                .reactant("ES", 1.0)
                .product("E", 1.0)
                .product("P", 1.0),
        );

    let result = compile(&network, &CompileOptions::default()).unwrap();

    println!("{}", result.graph);

    println!("JSON output:");
    println!("{}", result.graph.to_json().unwrap());
}
