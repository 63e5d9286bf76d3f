//! In-memory ModelPhy model
//!
//! A [`Model`] is the aggregate produced by the builder: variables in
//! declaration order, keyed by unique name, plus the constraints. Once the
//! builder hands it out it is only read.

mod constraint;
pub mod graph;
mod value;
mod variable;

pub use constraint::Constraint;
pub use graph::{DependencyGraph, UnresolvedReference};
pub use value::{
    Argument, ArrayValue, Callable, Distribution, FunctionCall, Number, Value, VariableReference,
};
pub use variable::{Observation, Variable, VariableKind};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type names that count as a tree for completeness checks
pub const TREE_TYPES: &[&str] = &["tree", "timetree"];
/// Type names that count as a substitution model
pub const SUBSTITUTION_MODEL_TYPES: &[&str] = &["qmatrix", "substmodel"];
/// Type names that count as an alignment
pub const ALIGNMENT_TYPES: &[&str] = &["alignment"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    variables: IndexMap<String, Variable>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any variable with the same name.
    ///
    /// A replaced variable keeps its original position. The old variable is
    /// returned.
    pub fn add_variable(&mut self, variable: Variable) -> Option<Variable> {
        self.variables.insert(variable.name.clone(), variable)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub(crate) fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    /// All variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn stochastic_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables().filter(|v| v.is_stochastic())
    }

    pub fn deterministic_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables().filter(|v| v.is_deterministic())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn observed_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables().filter(|v| v.is_observed())
    }

    /// Variables whose type matches any of `types`, ignoring case
    pub fn variables_of_type<'a>(
        &'a self,
        types: &'a [&'a str],
    ) -> impl Iterator<Item = &'a Variable> + 'a {
        self.variables()
            .filter(move |v| types.iter().any(|ty| v.has_type(ty)))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.constraints.is_empty()
    }

    /// Coarse completeness check: a tree, a substitution model and an
    /// alignment are all present.
    pub fn is_valid(&self) -> bool {
        self.variables_of_type(TREE_TYPES).next().is_some()
            && self.variables_of_type(SUBSTITUTION_MODEL_TYPES).next().is_some()
            && self.variables_of_type(ALIGNMENT_TYPES).next().is_some()
    }

    /// Which of the required type categories are absent
    pub fn missing_components(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.variables_of_type(TREE_TYPES).next().is_none() {
            missing.push("tree");
        }
        if self.variables_of_type(SUBSTITUTION_MODEL_TYPES).next().is_none() {
            missing.push("substitution model");
        }
        if self.variables_of_type(ALIGNMENT_TYPES).next().is_none() {
            missing.push("alignment");
        }
        missing
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_model(self)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelPhy Model:")?;

        let stochastic: Vec<_> = self.stochastic_variables().collect();
        writeln!(f, "  Stochastic Variables ({}):", stochastic.len())?;
        for var in stochastic {
            writeln!(f, "    {var}")?;
        }

        let deterministic: Vec<_> = self.deterministic_variables().collect();
        writeln!(f, "  Deterministic Variables ({}):", deterministic.len())?;
        for var in deterministic {
            writeln!(f, "    {var}")?;
        }

        writeln!(f, "  Constraints ({}):", self.constraints.len())?;
        for constraint in &self.constraints {
            writeln!(f, "    {constraint}")?;
        }

        writeln!(f, "  Observations:")?;
        for var in self.observed_variables() {
            if let Some(obs) = &var.observation {
                writeln!(f, "    {}: {obs}", var.name)?;
            }
        }
        Ok(())
    }
}
