//! Model construction from the syntax tree
//!
//! One [`ModelBuilder`] walks one [`Program`] in source order. Observations
//! on undeclared names abort the build. A bad key/value pair inside an inline
//! observation is logged and skipped.

use crate::ast::{self, Expr, LiteralKind, ObservationSource, Program, Stmt, StochasticTarget};
use crate::common::Span;
use crate::diagnostics::ModelError;
use crate::model::{
    Argument, ArrayValue, Constraint, Distribution, FunctionCall, Model, Number, Observation,
    Value, Variable,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Build a model from a parsed program
pub fn build_model(program: &Program) -> Result<Model, ModelError> {
    ModelBuilder::new().build(program)
}

/// Single-use model builder
pub struct ModelBuilder {
    model: Model,
    /// Where each variable name was last declared
    declared: HashMap<String, Span>,
    /// Index into the model's constraints by registered name
    constraints: HashMap<String, usize>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            model: Model::new(),
            declared: HashMap::new(),
            constraints: HashMap::new(),
        }
    }

    pub fn build(mut self, program: &Program) -> Result<Model, ModelError> {
        for stmt in &program.statements {
            self.build_stmt(stmt)?;
        }

        tracing::debug!(
            variables = self.model.len(),
            constraints = self.model.constraints().len(),
            "built model"
        );
        Ok(self.model)
    }

    // ==================== STATEMENTS ====================

    fn build_stmt(&mut self, stmt: &Stmt) -> Result<(), ModelError> {
        match stmt {
            Stmt::Declaration { ty, id, init, span } => {
                tracing::debug!(name = %id.name, ty = %ty.name, "declaration");
                let value = init.as_ref().map(|expr| self.eval(expr)).transpose()?;
                self.register(Variable::plain(&id.name, &ty.name, value), *span);
            }

            Stmt::Stochastic {
                target: StochasticTarget::Variable { ty, id },
                distribution,
                span,
            } => {
                tracing::debug!(name = %id.name, distribution = %distribution.name.name, "stochastic assignment");
                let dist = self.distribution(distribution)?;
                self.register(Variable::stochastic(&id.name, &ty.name, dist), *span);
            }

            Stmt::Stochastic {
                target: StochasticTarget::Call(call),
                distribution,
                ..
            } => {
                tracing::debug!(function = %call.name.name, "calibration");
                let function = self.call(call)?;
                let dist = self.distribution(distribution)?;
                self.register_constraint(Constraint::calibration(function, dist));
            }

            Stmt::Deterministic { ty, id, expr, span } => {
                tracing::debug!(name = %id.name, ty = %ty.name, "deterministic assignment");
                let expr = self.eval(expr)?;
                self.register(Variable::deterministic(&id.name, &ty.name, expr), *span);
            }

            Stmt::Observe { id, source, .. } => {
                tracing::debug!(name = %id.name, "observation");
                self.observe(id, source)?;
            }

            Stmt::Constraint { id, call, .. } => {
                tracing::debug!(name = %id.name, function = %call.name.name, "constraint");
                let function = self.call(call)?;
                self.register_constraint(Constraint::named(&id.name, function));
            }
        }
        Ok(())
    }

    /// Add a variable; a redeclared name replaces the earlier variable
    fn register(&mut self, variable: Variable, span: Span) {
        if let Some(previous) = self.declared.insert(variable.name.clone(), span) {
            tracing::warn!(
                name = %variable.name,
                previous = previous.start,
                "variable redeclared, replacing earlier declaration"
            );
        }
        self.model.add_variable(variable);
    }

    fn register_constraint(&mut self, constraint: Constraint) {
        let key = constraint.key().to_string();
        let index = self.model.constraints().len();
        if self.constraints.insert(key.clone(), index).is_some() {
            tracing::warn!(name = %key, "constraint name registered more than once");
        }
        self.model.add_constraint(constraint);
    }

    fn observe(&mut self, id: &ast::Ident, source: &ObservationSource) -> Result<(), ModelError> {
        if !self.model.contains(&id.name) {
            return Err(ModelError::UnresolvedVariable {
                name: id.name.clone(),
                span: id.span.into(),
            });
        }

        let observation = match source {
            ObservationSource::File { literal, .. } => Observation::file(strip_quotes(literal)),
            ObservationSource::KeyValues(pairs) => {
                let mut entries = IndexMap::new();
                for pair in pairs {
                    match self.observed_pair(pair) {
                        Ok(value) => {
                            entries.insert(pair.key.name.clone(), value);
                        }
                        Err(error) => {
                            tracing::warn!(
                                variable = %id.name,
                                key = %pair.key.name,
                                %error,
                                "skipping observation value"
                            );
                        }
                    }
                }
                Observation::Inline { entries }
            }
        };

        if let Some(var) = self.model.variable_mut(&id.name) {
            if var.observation.is_some() {
                tracing::warn!(name = %id.name, "variable observed again, replacing observation");
            }
            var.observation = Some(observation);
        }
        Ok(())
    }

    /// Evaluate one inline pair; `sequence(str = "...")` collapses to its text
    fn observed_pair(&self, pair: &ast::KeyValue) -> Result<Value, ModelError> {
        let value = self.eval(&pair.value)?;
        match &value {
            Value::Call(call) if call.name == "sequence" => match value.sequence_text() {
                Some(text) => Ok(Value::text(text)),
                None => Err(ModelError::InvalidSequence {
                    key: pair.key.name.clone(),
                    span: pair.value.span().into(),
                }),
            },
            _ => Ok(value),
        }
    }

    // ==================== EXPRESSIONS ====================

    fn eval(&self, expr: &Expr) -> Result<Value, ModelError> {
        match expr {
            Expr::Literal { kind, text, span } => literal(*kind, text, *span),
            Expr::Ident(ident) => Ok(Value::reference(&ident.name)),
            Expr::Call(call) => Ok(Value::Call(self.call(call)?)),
            Expr::Array { elements, .. } => {
                let elements = elements
                    .iter()
                    .map(|e| self.eval(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(ArrayValue::new(elements)))
            }
            Expr::Paren { inner, .. } => self.eval(inner),
        }
    }

    fn arguments(&self, call: &ast::Call) -> Result<Vec<Argument>, ModelError> {
        call.args
            .iter()
            .map(|arg| {
                Ok(Argument {
                    name: arg.name.as_ref().map(|n| n.name.clone()),
                    value: self.eval(&arg.value)?,
                })
            })
            .collect()
    }

    fn call(&self, call: &ast::Call) -> Result<FunctionCall, ModelError> {
        Ok(FunctionCall::new(&call.name.name, self.arguments(call)?))
    }

    fn distribution(&self, call: &ast::Call) -> Result<Distribution, ModelError> {
        Ok(Distribution::new(&call.name.name, self.arguments(call)?))
    }
}

fn literal(kind: LiteralKind, text: &str, span: Span) -> Result<Value, ModelError> {
    let invalid = |kind: &'static str| ModelError::InvalidLiteral {
        kind,
        text: text.to_string(),
        span: span.into(),
    };

    match kind {
        LiteralKind::Integer => text
            .parse::<i64>()
            .map(|i| Value::Number(Number::Integer(i)))
            .map_err(|_| invalid("integer")),
        LiteralKind::Float => match text.parse::<f64>() {
            Ok(r) if r.is_finite() => Ok(Value::Number(Number::Real(r))),
            _ => Err(invalid("float")),
        },
        LiteralKind::String => Ok(Value::text(strip_quotes(text))),
        LiteralKind::Boolean => match text {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(invalid("boolean")),
        },
    }
}

/// Drop the surrounding double quotes of a string literal
fn strip_quotes(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal)
}
