//! ODE accumulation
//!
//! Walks every reaction in model order and appends a signed, stoichiometry
//! weighted copy of its kinetic law to the running formula of each reactant
//! (`-`) and product (`+`).

use indexmap::IndexMap;

use crate::catalog::EntityCatalog;
use crate::codegen::format_value;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{normalize, tokenize};
use crate::model::{Reaction, SpeciesReference};

/// Name of the process variable that carries a species' derivative
pub fn process_variable(species: &str) -> String {
    format!("pv_{}", species)
}

/// Direction of a species' participation in a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Consumed,
    Produced,
}

impl Sign {
    pub fn symbol(&self) -> &'static str {
        match self {
            Sign::Consumed => "-",
            Sign::Produced => "+",
        }
    }
}

/// One reaction's contribution to a species' derivative
#[derive(Debug, Clone, PartialEq)]
pub struct OdeTerm {
    pub reaction: String,
    pub sign: Sign,
    pub stoichiometry: f64,
    /// Normalized kinetic law
    pub law: String,
    /// Divisor applied when scaling by compartment volume
    pub volume: Option<f64>,
}

impl OdeTerm {
    pub fn render(&self) -> String {
        match self.volume {
            Some(volume) => format!(
                "{} ( {} * ( {} ) / {} )",
                self.sign.symbol(),
                format_value(self.stoichiometry),
                self.law,
                format_value(volume)
            ),
            None => format!(
                "{} ( {} * ( {} ) )",
                self.sign.symbol(),
                format_value(self.stoichiometry),
                self.law
            ),
        }
    }
}

/// The signed sum of reaction terms for one species
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedOde {
    pub species: String,
    pub process_variable: String,
    pub terms: Vec<OdeTerm>,
    pub formula: String,
}

impl AccumulatedOde {
    pub fn new(species: &str) -> Self {
        Self {
            species: species.to_string(),
            process_variable: process_variable(species),
            terms: Vec::new(),
            formula: String::new(),
        }
    }

    fn push(&mut self, term: OdeTerm) {
        let rendered = term.render();
        if !self.formula.is_empty() {
            self.formula.push(' ');
        }
        self.formula.push_str(&rendered);
        self.terms.push(term);
    }
}

/// Accumulated ODEs in species order, plus species poisoned by malformed laws
#[derive(Debug)]
pub struct AccumulatedSystem {
    pub odes: Vec<AccumulatedOde>,
    pub failures: IndexMap<String, CompileError>,
}

/// Builds one accumulated ODE per species
pub struct OdeAccumulator<'a> {
    catalog: &'a EntityCatalog,
    scale_by_volume: bool,
    odes: IndexMap<String, AccumulatedOde>,
    failures: IndexMap<String, CompileError>,
}

impl<'a> OdeAccumulator<'a> {
    /// Start with an empty formula for every species, in the order given
    pub fn new<'s>(
        catalog: &'a EntityCatalog,
        species: impl IntoIterator<Item = &'s str>,
        scale_by_volume: bool,
    ) -> Self {
        let odes = species
            .into_iter()
            .map(|id| (id.to_string(), AccumulatedOde::new(id)))
            .collect();

        Self {
            catalog,
            scale_by_volume,
            odes,
            failures: IndexMap::new(),
        }
    }

    pub fn accumulate_all(&mut self, reactions: &[Reaction]) -> CompileResult<()> {
        for reaction in reactions {
            self.accumulate(reaction)?;
        }
        Ok(())
    }

    /// Add one reaction's terms. Only undeclared species are an error here;
    /// a malformed law poisons the participating species instead.
    pub fn accumulate(&mut self, reaction: &Reaction) -> CompileResult<()> {
        for reference in reaction.reactants.iter().chain(&reaction.products) {
            if !self.odes.contains_key(&reference.species) {
                return Err(CompileError::UnknownSpecies {
                    reaction: reaction.id.clone(),
                    species: reference.species.clone(),
                });
            }
        }

        let law = normalize(&reaction.kinetic_law);

        if let Err(message) = validate_law(&law) {
            log::debug!("reaction '{}' rejected: {}", reaction.id, message);
            for reference in reaction.reactants.iter().chain(&reaction.products) {
                self.failures
                    .entry(reference.species.clone())
                    .or_insert_with(|| CompileError::malformed(&reaction.id, &law, &message));
            }
            return Ok(());
        }

        for reference in &reaction.reactants {
            self.push_term(reaction, reference, Sign::Consumed, &law);
        }
        for reference in &reaction.products {
            self.push_term(reaction, reference, Sign::Produced, &law);
        }

        Ok(())
    }

    fn push_term(&mut self, reaction: &Reaction, reference: &SpeciesReference, sign: Sign, law: &str) {
        let volume = if self.scale_by_volume {
            self.catalog.species_volume(&reference.species)
        } else {
            None
        };

        if let Some(ode) = self.odes.get_mut(&reference.species) {
            ode.push(OdeTerm {
                reaction: reaction.id.clone(),
                sign,
                stoichiometry: reference.stoichiometry,
                law: law.to_string(),
                volume,
            });
        }
    }

    pub fn finish(self) -> AccumulatedSystem {
        AccumulatedSystem {
            odes: self.odes.into_values().collect(),
            failures: self.failures,
        }
    }
}

fn validate_law(law: &str) -> Result<(), String> {
    if law.is_empty() {
        return Err("empty kinetic law".to_string());
    }
    tokenize(law).map(|_| ()).map_err(|e| e.to_string())
}
