//! Structural constraints and calibrations

use super::value::{Callable, Distribution, FunctionCall};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constraint over the model.
///
/// With a distribution it is a stochastic calibration such as
/// `mrca(taxa=[a, b]) ~ LogNormal(...)`; without one it is a hard constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// `None` for anonymous calibrations
    pub name: Option<String>,
    pub function: FunctionCall,
    pub distribution: Option<Distribution>,
}

impl Constraint {
    pub fn named(name: impl Into<String>, function: FunctionCall) -> Self {
        Self {
            name: Some(name.into()),
            function,
            distribution: None,
        }
    }

    pub fn calibration(function: FunctionCall, distribution: Distribution) -> Self {
        Self {
            name: None,
            function,
            distribution: Some(distribution),
        }
    }

    pub fn has_distribution(&self) -> bool {
        self.distribution.is_some()
    }

    /// Name under which the builder registers this constraint
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(self.function.name.as_str())
    }

    pub fn dependencies(&self) -> Vec<String> {
        let mut deps = self.function.dependencies();
        if let Some(dist) = &self.distribution {
            deps.extend(dist.dependencies());
        }
        deps
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} = ")?;
        }
        write!(f, "{}", self.function)?;
        if let Some(dist) = &self.distribution {
            write!(f, " ~ {dist}")?;
        }
        Ok(())
    }
}
