//! In-memory snapshot of a reaction-network model
//!
//! These types mirror what the model-access layer exposes: compartments,
//! species, parameters, function definitions and reactions with their
//! kinetic-law formulas already converted to infix strings.

use serde::{Deserialize, Serialize};

/// A complete reaction network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionNetwork {
    #[serde(default)]
    pub compartments: Vec<Compartment>,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

/// A physical container for species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: String,
    pub size: f64,
}

/// A chemical entity with a concentration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub initial_concentration: f64,
    pub compartment: String,
}

/// A named numeric constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub value: f64,
}

/// A user-defined function usable inside kinetic laws; only its identity is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub id: String,
}

/// A species participating in a reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesReference {
    pub species: String,
    #[serde(default = "unit_stoichiometry")]
    pub stoichiometry: f64,
}

fn unit_stoichiometry() -> f64 {
    1.0
}

/// A transformation with a rate law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    /// Kinetic law as an infix formula string
    pub kinetic_law: String,
    #[serde(default)]
    pub reactants: Vec<SpeciesReference>,
    #[serde(default)]
    pub products: Vec<SpeciesReference>,
}

impl ReactionNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compartment(mut self, id: &str, size: f64) -> Self {
        self.compartments.push(Compartment {
            id: id.to_string(),
            size,
        });
        self
    }

    pub fn species(mut self, id: &str, initial_concentration: f64, compartment: &str) -> Self {
        self.species.push(Species {
            id: id.to_string(),
            initial_concentration,
            compartment: compartment.to_string(),
        });
        self
    }

    pub fn parameter(mut self, id: &str, value: f64) -> Self {
        self.parameters.push(Parameter {
            id: id.to_string(),
            value,
        });
        self
    }

    pub fn function(mut self, id: &str) -> Self {
        self.functions.push(FunctionDefinition { id: id.to_string() });
        self
    }

    pub fn reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    /// Load a network snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Reaction {
    pub fn new(id: &str, kinetic_law: &str) -> Self {
        Self {
            id: id.to_string(),
            kinetic_law: kinetic_law.to_string(),
            reactants: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn reactant(mut self, species: &str, stoichiometry: f64) -> Self {
        self.reactants.push(SpeciesReference {
            species: species.to_string(),
            stoichiometry,
        });
        self
    }

    pub fn product(mut self, species: &str, stoichiometry: f64) -> Self {
        self.products.push(SpeciesReference {
            species: species.to_string(),
            stoichiometry,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let network = ReactionNetwork::new()
            .compartment("cell", 1.0)
            .species("A", 10.0, "cell")
            .parameter("k1", 0.5)
            .reaction(Reaction::new("r1", "k1 * A").reactant("A", 1.0));

        assert_eq!(network.species.len(), 1);
        assert_eq!(network.reactions[0].reactants[0].species, "A");
        assert!(network.reactions[0].products.is_empty());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "compartments": [{"id": "cell", "size": 2.0}],
            "species": [{"id": "A", "initial_concentration": 1.5, "compartment": "cell"}],
            "reactions": [{"id": "r1", "kinetic_law": "A", "reactants": [{"species": "A"}]}]
        }"#;
        let network = ReactionNetwork::from_json(json).unwrap();

        assert!(network.parameters.is_empty());
        assert!(network.functions.is_empty());
        assert_eq!(network.reactions[0].reactants[0].stoichiometry, 1.0);
    }
}
