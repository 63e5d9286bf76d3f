//! Conversion from a [`Model`] to the CodePhy interchange document
//!
//! The conversion is a pure function of the model except for the
//! `created`/`modified` metadata, which default to the current time and can be
//! pinned with [`Converter::timestamp`].

pub mod tables;

use crate::config::ConvertConfig;
use crate::diagnostics::ModelError;
use crate::model::{
    ALIGNMENT_TYPES, Callable, Constraint, Distribution, FunctionCall, Model, Number,
    Observation, SUBSTITUTION_MODEL_TYPES, TREE_TYPES, Value, Variable,
};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json, json};
use tables::ParameterRule;

/// Tags every document carries
pub const DOMAIN_TAGS: &[&str] = &["phylogenetics", "modelphy", "converted"];

/// Argument map keyed by parameter name, in source order
pub type Arguments = IndexMap<String, Json>;

// ==================== DOCUMENT ====================

/// Top-level interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub format_version: String,
    pub model: String,
    pub metadata: Metadata,
    pub random_variables: IndexMap<String, RandomVariable>,
    pub deterministic_functions: IndexMap<String, DeterministicFunction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub created: String,
    pub modified: String,
    pub version: String,
    pub software: Software,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Software {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomVariable {
    pub distribution: DistributionEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    #[serde(rename = "type")]
    pub ty: String,
    pub generates: String,
    pub parameters: Arguments,
}

/// Deterministic function; both fields are absent when the variable's
/// expression is neither a call nor a reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeterministicFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<ConstraintTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTarget {
    pub distribution: String,
}

impl Document {
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Conversion {
            message: e.to_string(),
        })
    }

    pub fn to_json_value(&self) -> Result<Json, ModelError> {
        serde_json::to_value(self).map_err(|e| ModelError::Conversion {
            message: e.to_string(),
        })
    }
}

// ==================== CONVERTER ====================

/// Convert with the default configuration and the current time
pub fn convert(model: &Model) -> Document {
    Converter::new().convert(model)
}

#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
    timestamp: Option<DateTime<Utc>>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self {
            config,
            timestamp: None,
        }
    }

    /// Use a fixed creation time instead of the current one
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn convert(&self, model: &Model) -> Document {
        let random_variables: IndexMap<_, _> = model
            .variables()
            .filter_map(|var| {
                let dist = var.distribution()?;
                Some((var.name.clone(), self.random_variable(var, dist)))
            })
            .collect();

        let deterministic_functions: IndexMap<_, _> = model
            .variables()
            .filter_map(|var| {
                let expr = var.expression()?;
                Some((var.name.clone(), deterministic_function(expr)))
            })
            .collect();

        let constraints: Vec<_> = model.constraints().iter().map(constraint_entry).collect();

        tracing::debug!(
            random = random_variables.len(),
            deterministic = deterministic_functions.len(),
            constraints = constraints.len(),
            "converted model"
        );

        Document {
            format_version: self.config.format_version.clone(),
            model: self.model_name(model),
            metadata: self.metadata(model),
            random_variables,
            deterministic_functions,
            constraints,
        }
    }

    /// First alignment wins, then the first tree
    fn model_name(&self, model: &Model) -> String {
        model
            .variables_of_type(ALIGNMENT_TYPES)
            .next()
            .or_else(|| model.variables_of_type(TREE_TYPES).next())
            .map(|var| format!("{}_model", var.name))
            .unwrap_or_else(|| self.config.fallback_model_name.clone())
    }

    fn metadata(&self, model: &Model) -> Metadata {
        let timestamp = self
            .timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut tags: Vec<String> = DOMAIN_TAGS.iter().map(|t| t.to_string()).collect();
        tags.extend(self.config.extra_tags.iter().cloned());
        tags.extend(
            model
                .variables_of_type(SUBSTITUTION_MODEL_TYPES)
                .filter_map(|var| var.expression()?.as_call())
                .map(|call| call.name.to_lowercase()),
        );

        Metadata {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            created: timestamp.clone(),
            modified: timestamp,
            version: self.config.version.clone(),
            software: Software {
                name: self.config.software.name.clone(),
                version: self.config.software.version.clone(),
            },
            tags,
        }
    }

    fn random_variable(&self, var: &Variable, dist: &Distribution) -> RandomVariable {
        RandomVariable {
            distribution: distribution_entry(dist, &var.ty),
            observed_value: var
                .observation
                .as_ref()
                .map(|obs| observed_value(var, obs)),
        }
    }
}

// ==================== RANDOM VARIABLES ====================

pub fn distribution_entry(dist: &Distribution, var_type: &str) -> DistributionEntry {
    let ty = dist.canonical_type().to_string();
    let generates = tables::generates_for_type(var_type).unwrap_or_else(|| dist.default_generates());

    let mut parameters = Arguments::new();
    for (name, value) in dist.named_arguments() {
        match tables::parameter_rule(&ty, name) {
            ParameterRule::Keep => {
                parameters.insert(name.to_string(), value_to_json(value));
            }
            ParameterRule::Rename(to) => {
                parameters.insert(to.to_string(), value_to_json(value));
            }
            ParameterRule::Reciprocal(to) => {
                parameters.insert(to.to_string(), reciprocal(value));
            }
            ParameterRule::Drop => {}
        }
    }

    DistributionEntry {
        ty,
        generates: generates.to_string(),
        parameters,
    }
}

/// `1 / value` for numbers, a symbolic expression otherwise
fn reciprocal(value: &Value) -> Json {
    match value.as_number() {
        Some(n) => real_to_json(1.0 / n.as_f64()),
        None => json!({ "expression": format!("1.0 / {value}") }),
    }
}

fn observed_value(var: &Variable, observation: &Observation) -> Json {
    match observation {
        Observation::File { filename } => json!({ "file": filename }),
        Observation::Inline { entries } if ALIGNMENT_TYPES.iter().any(|t| var.has_type(t)) => {
            let sequences: Map<String, Json> = entries
                .iter()
                .filter_map(|(key, value)| {
                    let text = value.sequence_text().or_else(|| value.as_text())?;
                    Some((key.clone(), Json::String(text.to_string())))
                })
                .collect();
            json!({ "sequences": sequences })
        }
        Observation::Inline { entries } => Json::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
    }
}

// ==================== DETERMINISTIC FUNCTIONS ====================

pub fn deterministic_function(expr: &Value) -> DeterministicFunction {
    match expr {
        Value::Call(call) => DeterministicFunction {
            function: Some(call.name.clone()),
            arguments: Some(named_arguments(call)),
        },
        Value::Reference(r) => DeterministicFunction {
            function: Some("reference".to_string()),
            arguments: Some(Arguments::from([(
                "source".to_string(),
                json!({ "variable": r.name }),
            )])),
        },
        _ => DeterministicFunction::default(),
    }
}

// ==================== CONSTRAINTS ====================

pub fn constraint_entry(constraint: &Constraint) -> ConstraintEntry {
    let function = &constraint.function;
    match function.name.as_str() {
        "mrca" => {
            // The calibration target is only written for a well-formed taxon list
            let has_taxa = function
                .argument("taxa")
                .is_some_and(|arg| arg.value.as_array().is_some());
            calibration_entry(constraint, "mrca_node", has_taxa)
        }
        "root" => calibration_entry(constraint, "root_age", true),
        _ => ConstraintEntry {
            ty: "custom".to_string(),
            left: None,
            right: None,
            function: Some(function.name.clone()),
            arguments: Some(named_arguments(function)),
        },
    }
}

fn calibration_entry(constraint: &Constraint, default_left: &str, emit_right: bool) -> ConstraintEntry {
    let right = match &constraint.distribution {
        Some(dist) if emit_right => Some(ConstraintTarget {
            distribution: dist.name.clone(),
        }),
        _ => None,
    };

    ConstraintEntry {
        ty: "equals".to_string(),
        left: Some(
            constraint
                .name
                .clone()
                .unwrap_or_else(|| default_left.to_string()),
        ),
        right,
        function: None,
        arguments: None,
    }
}

// ==================== VALUES ====================

/// Named arguments only; positional ones are never written
pub fn named_arguments(call: &FunctionCall) -> Arguments {
    call.named_arguments()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect()
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Number(Number::Integer(i)) => json!(i),
        Value::Number(Number::Real(r)) => real_to_json(*r),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Text(s) => Json::String(s.clone()),
        Value::Reference(r) => json!({ "variable": r.name }),
        Value::Array(array) => Json::Array(array.iter().map(value_to_json).collect()),
        Value::Call(call) => json!({
            "function": call.name,
            "arguments": named_arguments(call),
        }),
    }
}

/// Non-finite reals have no JSON form and become `null`
fn real_to_json(r: f64) -> Json {
    serde_json::Number::from_f64(r)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Argument, ArrayValue};
    use pretty_assertions::assert_eq;

    fn params(dist: Distribution, ty: &str) -> Json {
        serde_json::to_value(distribution_entry(&dist, ty).parameters).unwrap()
    }

    #[test]
    fn test_exponential_symbolic_rate() {
        let dist = Distribution::new("Exponential", vec![Argument::named("mean", Value::reference("mu"))]);
        assert_eq!(params(dist, "Real"), json!({ "rate": { "expression": "1.0 / mu" } }));
    }

    #[test]
    fn test_exponential_zero_mean_is_null() {
        let dist = Distribution::new("exponential", vec![Argument::named("mean", Value::integer(0))]);
        assert_eq!(params(dist, "Real"), json!({ "rate": null }));
    }

    #[test]
    fn test_unknown_distribution_passes_through() {
        let dist = Distribution::new(
            "Poisson",
            vec![
                Argument::named("lambda", Value::real(2.0)),
                Argument::positional(Value::integer(3)),
            ],
        );
        let entry = distribution_entry(&dist, "Count");
        assert_eq!(entry.ty, "Poisson");
        assert_eq!(entry.generates, "REAL");
        assert_eq!(serde_json::to_value(entry.parameters).unwrap(), json!({ "lambda": 2.0 }));
    }

    #[test]
    fn test_generates_prefers_variable_type() {
        let dist = Distribution::new("Dirichlet", vec![]);
        assert_eq!(distribution_entry(&dist, "Simplex").generates, "REAL_VECTOR");
        assert_eq!(distribution_entry(&dist, "Real").generates, "REAL");
        assert_eq!(distribution_entry(&dist, "Frequencies").generates, "REAL_VECTOR");
    }

    #[test]
    fn test_nested_call_value() {
        let value = Value::Call(FunctionCall::new(
            "HKY",
            vec![
                Argument::named("kappa", Value::reference("kappa")),
                Argument::positional(Value::integer(1)),
                Argument::named("pi", Value::Array(ArrayValue::new(vec![Value::real(0.25), Value::Boolean(true)]))),
            ],
        ));
        assert_eq!(
            value_to_json(&value),
            json!({
                "function": "HKY",
                "arguments": { "kappa": { "variable": "kappa" }, "pi": [0.25, true] }
            })
        );
    }

    #[test]
    fn test_custom_constraint() {
        let constraint = Constraint::named(
            "mono",
            FunctionCall::new(
                "monophyly",
                vec![Argument::named("taxa", Value::Array(ArrayValue::new(vec![Value::reference("a")])))],
            ),
        );
        let entry = serde_json::to_value(constraint_entry(&constraint)).unwrap();
        assert_eq!(
            entry,
            json!({
                "type": "custom",
                "function": "monophyly",
                "arguments": { "taxa": [{ "variable": "a" }] }
            })
        );
    }

    #[test]
    fn test_mrca_without_array_taxa_has_no_right() {
        let constraint = Constraint::calibration(
            FunctionCall::new("mrca", vec![Argument::named("taxa", Value::reference("clade"))]),
            Distribution::new("LogNormal", vec![]),
        );
        let entry = constraint_entry(&constraint);
        assert_eq!(entry.left.as_deref(), Some("mrca_node"));
        assert!(entry.right.is_none());
    }

    #[test]
    fn test_deterministic_literal_is_empty_object() {
        let entry = serde_json::to_value(deterministic_function(&Value::integer(3))).unwrap();
        assert_eq!(entry, json!({}));
    }
}
