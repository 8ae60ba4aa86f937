//! Graph assembly
//!
//! Combines each species' bindings and generated lambda into a compiled edge
//! writing into that species' node, all under one solver partition.

use indexmap::IndexMap;

use crate::accumulator::AccumulatedOde;
use crate::bindings::InputBindings;
use crate::codegen::Lambda;
use crate::config::PartitionConfig;
use crate::graph::{entity_ref, CompiledEdge, Graph, Node, OutputMode, Partition};
use crate::model::Species;

/// Incrementally builds the output graph
pub struct GraphAssembler {
    graph: Graph,
    partition: u32,
}

impl GraphAssembler {
    pub fn new(partition: &PartitionConfig) -> Self {
        let mut graph = Graph::new();
        graph
            .partitions
            .insert(partition.id, Partition::from(partition));

        Self {
            graph,
            partition: partition.id,
        }
    }

    pub fn add_node(&mut self, species: &Species) {
        self.graph.nodes.insert(
            entity_ref(&species.id),
            Node {
                initial_value: species.initial_concentration,
            },
        );
    }

    pub fn add_edge(&mut self, ode: &AccumulatedOde, bindings: &InputBindings, lambda: &Lambda) {
        let inputs: IndexMap<String, String> = bindings
            .iter()
            .map(|binding| (binding.name.clone(), binding.reference()))
            .collect();

        let mut outputs = IndexMap::new();
        outputs.insert(entity_ref(&ode.species), OutputMode::Add);

        self.graph.edges.insert(
            entity_ref(&ode.process_variable),
            CompiledEdge {
                inputs,
                lambda: lambda.to_string(),
                outputs,
                partition: self.partition,
            },
        );
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_edge() {
        let mut assembler = GraphAssembler::new(&PartitionConfig::default());
        assembler.add_node(&Species {
            id: "A".into(),
            initial_concentration: 10.0,
            compartment: "cell".into(),
        });

        let mut bindings = InputBindings::new();
        bindings.bind("A");
        let lambda = Lambda {
            params: bindings.names(),
            body: "- ( 1 * ( 0.5 * input1 ) )".into(),
        };
        assembler.add_edge(&AccumulatedOde::new("A"), &bindings, &lambda);
        let graph = assembler.finish();

        let edge = graph.edge("A").unwrap();
        assert_eq!(edge.inputs.get("input1").map(String::as_str), Some(":A"));
        assert_eq!(edge.outputs.len(), 1);
        assert_eq!(edge.outputs.get(":A"), Some(&OutputMode::Add));
        assert_eq!(edge.partition, 1);
        assert_eq!(edge.lambda, "fn(input1) -> - ( 1 * ( 0.5 * input1 ) ) end");
        assert_eq!(graph.node("A").unwrap().initial_value, 10.0);
        assert!(graph.partitions.contains_key(&1));
    }

    #[test]
    fn test_custom_partition_id() {
        let config = PartitionConfig {
            id: 4,
            ..PartitionConfig::default()
        };
        let mut assembler = GraphAssembler::new(&config);
        assembler.add_edge(
            &AccumulatedOde::new("B"),
            &InputBindings::new(),
            &Lambda {
                params: Vec::new(),
                body: String::new(),
            },
        );
        let graph = assembler.finish();

        assert_eq!(graph.edge("B").unwrap().partition, 4);
        assert_eq!(graph.edge("B").unwrap().lambda, "fn() -> end");
        assert!(graph.edge("B").unwrap().inputs.is_empty());
    }
}
