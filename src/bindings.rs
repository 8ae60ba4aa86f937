//! Positional input bindings
//!
//! First pass over an accumulated formula: every distinct species gets the
//! next `inputN` name, in order of first appearance.

use std::collections::HashMap;

use crate::classifier::{Category, Scanner};
use crate::error::CompileResult;

/// One positional input of a generated lambda
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    /// Positional name, e.g. `input1`
    pub name: String,
    /// Species identifier the input carries
    pub entity: String,
}

impl InputBinding {
    /// Reference form used in the graph, e.g. `:A`
    pub fn reference(&self) -> String {
        format!(":{}", self.entity)
    }
}

/// Ordered bindings for one formula, keyed by entity id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputBindings {
    entries: Vec<InputBinding>,
    by_entity: HashMap<String, usize>,
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a formula and bind every species it references
    pub fn build(formula: &str, scanner: &Scanner<'_>) -> CompileResult<Self> {
        let mut bindings = Self::new();

        for category in scanner.scan(formula)? {
            if let Category::Species(id) = category {
                bindings.bind(&id);
            }
        }

        Ok(bindings)
    }

    /// Bind an entity if it has no input yet; returns its positional name
    pub fn bind(&mut self, entity: &str) -> &str {
        let index = match self.by_entity.get(entity) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries.push(InputBinding {
                    name: format!("input{}", index + 1),
                    entity: entity.to_string(),
                });
                self.by_entity.insert(entity.to_string(), index);
                index
            }
        };
        &self.entries[index].name
    }

    pub fn lookup(&self, entity: &str) -> Option<&str> {
        self.by_entity
            .get(entity)
            .map(|&index| self.entries[index].name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputBinding> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|b| b.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
