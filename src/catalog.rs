//! Entity catalog: read-only lookup tables built once per network

use std::collections::{HashMap, HashSet};

use crate::error::{CompileError, CompileResult};
use crate::model::ReactionNetwork;

/// What a bare identifier refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity {
    Compartment { size: f64 },
    Species,
    Parameter { value: f64 },
    Unresolved,
}

/// Lookup tables over one reaction network
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    compartment_sizes: HashMap<String, f64>,
    /// Species id -> owning compartment id
    species: HashMap<String, String>,
    parameters: HashMap<String, f64>,
    functions: HashSet<String>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog, checking that every species lives in a declared compartment
    pub fn from_network(network: &ReactionNetwork) -> CompileResult<Self> {
        let mut catalog = Self::new();

        for compartment in &network.compartments {
            catalog.define_compartment(&compartment.id, compartment.size);
        }

        for species in &network.species {
            if !catalog.compartment_sizes.contains_key(&species.compartment) {
                return Err(CompileError::UnknownCompartment {
                    species: species.id.clone(),
                    compartment: species.compartment.clone(),
                });
            }
            catalog.define_species(&species.id, &species.compartment);
        }

        for parameter in &network.parameters {
            catalog.define_parameter(&parameter.id, parameter.value);
        }

        for function in &network.functions {
            catalog.define_function(&function.id);
        }

        log::debug!(
            "catalog: {} compartments, {} species, {} parameters, {} functions",
            catalog.compartment_sizes.len(),
            catalog.species.len(),
            catalog.parameters.len(),
            catalog.functions.len()
        );

        Ok(catalog)
    }

    pub fn define_compartment(&mut self, id: &str, size: f64) {
        self.compartment_sizes.insert(id.to_string(), size);
    }

    pub fn define_species(&mut self, id: &str, compartment: &str) {
        self.species.insert(id.to_string(), compartment.to_string());
    }

    pub fn define_parameter(&mut self, id: &str, value: f64) {
        self.parameters.insert(id.to_string(), value);
    }

    pub fn define_function(&mut self, id: &str) {
        self.functions.insert(id.to_string());
    }

    /// Classify an identifier: compartments first, then species, then parameters.
    pub fn classify(&self, ident: &str) -> Entity {
        if let Some(&size) = self.compartment_sizes.get(ident) {
            Entity::Compartment { size }
        } else if self.species.contains_key(ident) {
            Entity::Species
        } else if let Some(&value) = self.parameters.get(ident) {
            Entity::Parameter { value }
        } else {
            Entity::Unresolved
        }
    }

    pub fn is_function(&self, ident: &str) -> bool {
        self.functions.contains(ident)
    }

    pub fn parameter(&self, id: &str) -> Option<f64> {
        self.parameters.get(id).copied()
    }

    pub fn is_species(&self, id: &str) -> bool {
        self.species.contains_key(id)
    }

    /// Size of the compartment that owns a species
    pub fn species_volume(&self, species: &str) -> Option<f64> {
        self.species
            .get(species)
            .and_then(|compartment| self.compartment_sizes.get(compartment))
            .copied()
    }
}
