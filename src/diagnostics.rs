//! Diagnostic reporting with source locations
//!
//! This module provides rich error messages with source locations using miette.
//! Errors carry spans only; the source text is attached when a report is
//! rendered (see [`SourceFile::report`]).

use crate::common::{LineIndex, Span};
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }

    /// Wrap an error into a renderable report that shows this file's text
    pub fn report(&self, error: ModelError) -> miette::Report {
        miette::Report::new(error).with_source_code(self.to_named_source())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// A single syntax error with its position
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
#[diagnostic(code(parse::syntax))]
pub struct SyntaxError {
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    #[label("{message}")]
    pub span: SourceSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, index: &LineIndex) -> Self {
        let pos = index.line_col(span.start);
        Self {
            message: message.into(),
            line: pos.line,
            column: pos.column,
            span: span.into(),
        }
    }
}

/// Receives syntax errors as the lexer and parser find them
pub trait SyntaxErrorSink {
    fn syntax_error(&mut self, error: SyntaxError);
}

impl SyntaxErrorSink for Vec<SyntaxError> {
    fn syntax_error(&mut self, error: SyntaxError) {
        self.push(error);
    }
}

/// ModelPhy diagnostic
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ModelError {
    // === Parse Errors ===
    #[error("{} syntax error(s)", .errors.len())]
    #[diagnostic(code(parse::failed))]
    Syntax {
        #[related]
        errors: Vec<SyntaxError>,
    },

    #[error("Invalid {kind} literal `{text}`")]
    #[diagnostic(code(build::invalid_literal))]
    InvalidLiteral {
        kind: &'static str,
        text: String,
        #[label("cannot be represented")]
        span: SourceSpan,
    },

    // === Build Errors ===
    #[error("Unresolved variable `{name}`")]
    #[diagnostic(
        code(build::unresolved_variable),
        help("declare `{name}` before observing it")
    )]
    UnresolvedVariable {
        name: String,
        #[label("observed here but never declared")]
        span: SourceSpan,
    },

    #[error("`sequence` for `{key}` has no text `str` argument")]
    #[diagnostic(code(build::invalid_sequence))]
    InvalidSequence {
        key: String,
        #[label("expected `sequence(str=\"...\")`")]
        span: SourceSpan,
    },

    // === Model Errors ===
    #[error("Dependency cycle through `{name}`")]
    #[diagnostic(
        code(model::dependency_cycle),
        help("a variable cannot depend on itself, directly or indirectly")
    )]
    DependencyCycle { name: String },

    // === Output Errors ===
    #[error("Failed to serialize document: {message}")]
    #[diagnostic(code(convert::serialize))]
    Conversion { message: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(config::invalid))]
    Config { message: String },

    #[error("{message}")]
    #[diagnostic(code(io))]
    Io { message: String },
}
