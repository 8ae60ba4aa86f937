//! Reaction Network to Dataflow Graph Compiler CLI
//!
//! Usage:
//!   rxn2graph model.json
//!   rxn2graph model.json -o graph.json --strict
//!   cat model.json | rxn2graph - --scale-by-volume -v

use clap::Parser as ClapParser;
use colored::Colorize;
use std::fs;
use std::io::{self, Read};

use reaction_graph::{compile, Compilation, CompileOptions, ReactionNetwork, UnresolvedPolicy};

#[derive(ClapParser, Debug)]
#[command(name = "rxn2graph")]
#[command(author = "Systems Biology Team")]
#[command(version = "0.1.0")]
#[command(about = "Compiles reaction networks into dataflow-graph ODE configurations")]
struct Args {
    /// JSON model snapshot to compile ("-" reads stdin)
    #[arg(value_name = "MODEL")]
    model: String,

    /// Write the graph to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Load compile options from a JSON file
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Fail on unresolved tokens and on any species failure
    #[arg(long = "strict", conflicts_with = "drop_unresolved")]
    strict: bool,

    /// Drop unresolved tokens without warnings
    #[arg(long = "drop-unresolved")]
    drop_unresolved: bool,

    /// Fail the whole run if any species fails to compile
    #[arg(long = "all-or-nothing")]
    all_or_nothing: bool,

    /// Scale kinetic-law terms by compartment volume
    #[arg(long = "scale-by-volume")]
    scale_by_volume: bool,

    /// Emit compact JSON
    #[arg(long = "compact")]
    compact: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context.red(), error);
    std::process::exit(1);
}

fn build_options(args: &Args) -> CompileOptions {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(&format!("Failed to read config '{}'", path), e));
            CompileOptions::from_json(&text)
                .unwrap_or_else(|e| fail("Invalid config", e))
        }
        None => CompileOptions::default(),
    };

    if args.strict {
        options.unresolved = UnresolvedPolicy::Fail;
        options.partial_output = false;
    }
    if args.drop_unresolved {
        options.unresolved = UnresolvedPolicy::Drop;
    }
    if args.all_or_nothing {
        options.partial_output = false;
    }
    if args.scale_by_volume {
        options.scale_by_compartment_volume = true;
    }

    options
}

fn main() {
    let args = Args::parse();

    let source = read_source(&args.model)
        .unwrap_or_else(|e| fail(&format!("Failed to read model '{}'", args.model), e));
    let network =
        ReactionNetwork::from_json(&source).unwrap_or_else(|e| fail("Invalid model", e));
    let options = build_options(&args);

    if args.verbose {
        eprintln!("{}", "Reaction Network Compiler".bold().blue());
        eprintln!("{}", "=".repeat(25));
        eprintln!(
            "{}: {} species, {} reactions, {} parameters",
            "Input".green(),
            network.species.len(),
            network.reactions.len(),
            network.parameters.len()
        );
        eprintln!(
            "{}: unresolved={:?}, partial={}, scale_by_volume={}",
            "Options".green(),
            options.unresolved,
            options.partial_output,
            options.scale_by_compartment_volume
        );
        eprintln!();
    }

    let result = compile(&network, &options).unwrap_or_else(|e| fail("Compilation error", e));

    report(&result, args.verbose);

    let json = if args.compact {
        result.graph.to_json_compact()
    } else {
        result.graph.to_json()
    }
    .unwrap_or_else(|e| fail("Failed to serialize graph", e));

    match &args.output {
        Some(path) => fs::write(path, json)
            .unwrap_or_else(|e| fail(&format!("Failed to write '{}'", path), e)),
        None => println!("{}", json),
    }
}

fn report(result: &Compilation, verbose: bool) {
    for diagnostic in &result.diagnostics {
        eprintln!("{}: {}", "Warning".yellow(), diagnostic);
    }
    for failure in &result.failures {
        eprintln!(
            "{}: species '{}' omitted: {}",
            "Error".red(),
            failure.species,
            failure.message
        );
    }

    if verbose {
        eprintln!();
        eprintln!("{}", "Compilation Results".bold().green());
        eprintln!("{}", "-".repeat(50));
        eprintln!("{}: {}", "Nodes".cyan(), result.graph.nodes.len());
        eprintln!("{}: {}", "Edges".cyan(), result.graph.edges.len());
        for (name, edge) in &result.graph.edges {
            eprintln!("  {} {}", name.bold(), edge.lambda);
        }
        eprintln!();
    }
}
