//! Per-line diagnostics for editor-style consumers
//!
//! [`analyze`] never fails: syntax errors, build errors and model warnings all
//! come back as [`Diagnostic`] values with 1-based positions.

use crate::ast::Program;
use crate::builder::build_model;
use crate::common::{LineIndex, Span};
use crate::diagnostics::{ModelError, SyntaxError};
use crate::lexer::lex_with_sink;
use crate::model::Model;
use crate::parser::parse_with_sink;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A message anchored to a source range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn at(index: &LineIndex, span: Span, severity: Severity, message: impl Into<String>) -> Self {
        let start = index.line_col(span.start);
        let end = index.line_col(span.end);
        Self {
            line: start.line,
            column: start.column,
            end_line: end.line,
            end_column: end.column,
            severity,
            message: message.into(),
        }
    }

    fn from_syntax(index: &LineIndex, error: &SyntaxError) -> Self {
        let span = Span::new(error.span.offset(), error.span.offset() + error.span.len());
        Self::at(index, span, Severity::Error, error.message.clone())
    }
}

/// Diagnose `source` without stopping at the first problem
pub fn analyze(source: &str) -> Vec<Diagnostic> {
    let index = LineIndex::new(source);

    let mut syntax_errors = Vec::new();
    let tokens = lex_with_sink(source, &mut syntax_errors);
    let program = parse_with_sink(&tokens, source, &mut syntax_errors);

    if !syntax_errors.is_empty() {
        return syntax_errors
            .iter()
            .map(|e| Diagnostic::from_syntax(&index, e))
            .collect();
    }

    match build_model(&program) {
        Ok(model) => model_warnings(&index, source, &program, &model),
        Err(error) => vec![build_error(&index, source, &error)],
    }
}

fn build_error(index: &LineIndex, source: &str, error: &ModelError) -> Diagnostic {
    let span = match error {
        ModelError::InvalidLiteral { span, .. }
        | ModelError::UnresolvedVariable { span, .. }
        | ModelError::InvalidSequence { span, .. } => {
            Span::new(span.offset(), span.offset() + span.len())
        }
        _ => whole_file(source),
    };
    Diagnostic::at(index, span, Severity::Error, error.to_string())
}

fn model_warnings(index: &LineIndex, source: &str, program: &Program, model: &Model) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // A redeclared name is anchored at its last declaration, the one the model keeps
    let declarations: HashMap<&str, Span> = program
        .statements
        .iter()
        .filter_map(|stmt| stmt.declared_variable())
        .map(|id| (id.name.as_str(), id.span))
        .collect();

    let graph = model.dependency_graph();
    for reference in graph.unresolved() {
        let span = declarations
            .get(reference.owner.as_str())
            .copied()
            .unwrap_or_else(|| whole_file(source));
        diagnostics.push(Diagnostic::at(
            index,
            span,
            Severity::Warning,
            format!(
                "`{}` refers to undeclared variable `{}`",
                reference.owner, reference.name
            ),
        ));
    }

    if let Err(error) = graph.evaluation_order() {
        diagnostics.push(Diagnostic::at(
            index,
            whole_file(source),
            Severity::Warning,
            error.to_string(),
        ));
    }

    if !model.is_empty() && !model.is_valid() {
        diagnostics.push(Diagnostic::at(
            index,
            Span::new(0, 0),
            Severity::Warning,
            format!(
                "incomplete model: missing {}",
                model.missing_components().join(", ")
            ),
        ));
    }

    diagnostics
}

fn whole_file(source: &str) -> Span {
    Span::new(0, source.len())
}
