//! Model variables and their observations

use super::value::{Callable, Distribution, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a variable gets its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Declared only, possibly with a literal initializer
    Plain,
    /// Drawn from a distribution
    Stochastic(Distribution),
    /// Computed from an expression, usually a call or a reference
    Deterministic(Value),
}

/// Named, typed model variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: String,
    pub kind: VariableKind,
    pub value: Option<Value>,
    pub observation: Option<Observation>,
}

impl Variable {
    pub fn plain(name: impl Into<String>, ty: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: VariableKind::Plain,
            value,
            observation: None,
        }
    }

    pub fn stochastic(
        name: impl Into<String>,
        ty: impl Into<String>,
        distribution: Distribution,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: VariableKind::Stochastic(distribution),
            value: None,
            observation: None,
        }
    }

    pub fn deterministic(name: impl Into<String>, ty: impl Into<String>, expression: Value) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: VariableKind::Deterministic(expression),
            value: None,
            observation: None,
        }
    }

    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.observation = Some(observation);
        self
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.kind {
            VariableKind::Stochastic(dist) => Some(dist),
            _ => None,
        }
    }

    pub fn expression(&self) -> Option<&Value> {
        match &self.kind {
            VariableKind::Deterministic(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self.kind, VariableKind::Stochastic(_))
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self.kind, VariableKind::Deterministic(_))
    }

    pub fn is_observed(&self) -> bool {
        self.observation.is_some()
    }

    /// Case-insensitive comparison against the declared type
    pub fn has_type(&self, ty: &str) -> bool {
        self.ty.eq_ignore_ascii_case(ty)
    }

    /// Names this variable's distribution or expression refers to
    pub fn dependencies(&self) -> Vec<String> {
        match &self.kind {
            VariableKind::Plain => Vec::new(),
            VariableKind::Stochastic(dist) => dist.dependencies(),
            VariableKind::Deterministic(Value::Call(call)) => call.dependencies(),
            VariableKind::Deterministic(Value::Reference(r)) => vec![r.name.clone()],
            VariableKind::Deterministic(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)?;
        match &self.kind {
            VariableKind::Stochastic(dist) => write!(f, " ~ {dist}"),
            VariableKind::Deterministic(expr) => write!(f, " = {expr}"),
            VariableKind::Plain => match &self.value {
                Some(value) => write!(f, " = {value}"),
                None => Ok(()),
            },
        }
    }
}

/// Data attached to a variable by an `observe` statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// Data lives in a file
    File { filename: String },
    /// Data given in place, keyed in source order
    Inline { entries: IndexMap<String, Value> },
}

impl Observation {
    pub fn file(filename: impl Into<String>) -> Self {
        Observation::File {
            filename: filename.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Observation::File { .. })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Observation::File { .. } => None,
            Observation::Inline { entries } => entries.get(key),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::File { filename } => write!(f, "observe from \"{filename}\""),
            Observation::Inline { entries } => {
                f.write_str("observe [ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                f.write_str(" ]")
            }
        }
    }
}
