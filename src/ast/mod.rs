//! Syntax tree for the ModelPhy language
//!
//! This module defines the node types produced by the parser. Nodes keep the
//! raw literal text and a span for diagnostics; turning them into model values
//! is the builder's job.

use crate::common::Span;
use serde::{Deserialize, Serialize};

/// Top-level syntax tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Identifier with its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `Type id;` or `Type id = <literal>;`
    Declaration {
        ty: Ident,
        id: Ident,
        init: Option<Expr>,
        span: Span,
    },
    /// `Type id ~ Dist(...);` or `call(...) ~ Dist(...);`
    Stochastic {
        target: StochasticTarget,
        distribution: Call,
        span: Span,
    },
    /// `Type id = expr;`
    Deterministic {
        ty: Ident,
        id: Ident,
        expr: Expr,
        span: Span,
    },
    /// `observe id from "file";` or `observe id [ k = v, ... ];`
    Observe {
        id: Ident,
        source: ObservationSource,
        span: Span,
    },
    /// `constraint id = call(...);`
    Constraint { id: Ident, call: Call, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Declaration { span, .. }
            | Stmt::Stochastic { span, .. }
            | Stmt::Deterministic { span, .. }
            | Stmt::Observe { span, .. }
            | Stmt::Constraint { span, .. } => *span,
        }
    }

    /// The variable this statement declares, if any
    pub fn declared_variable(&self) -> Option<&Ident> {
        match self {
            Stmt::Declaration { id, .. }
            | Stmt::Deterministic { id, .. }
            | Stmt::Stochastic {
                target: StochasticTarget::Variable { id, .. },
                ..
            } => Some(id),
            _ => None,
        }
    }
}

/// Left-hand side of `~`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StochasticTarget {
    Variable { ty: Ident, id: Ident },
    Call(Call),
}

/// Right-hand side of an observation statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObservationSource {
    /// Raw string literal text, quotes included
    File { literal: String, span: Span },
    KeyValues(Vec<KeyValue>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Ident,
    pub value: Expr,
}

/// Function or distribution call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub name: Ident,
    pub args: Vec<CallArg>,
    pub span: Span,
}

/// Call argument; `name` is `None` for positional arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallArg {
    pub name: Option<Ident>,
    pub value: Expr,
}

/// Literal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        text: String,
        span: Span,
    },
    Ident(Ident),
    Call(Call),
    Array {
        elements: Vec<Expr>,
        span: Span,
    },
    Paren {
        inner: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. } | Expr::Array { span, .. } | Expr::Paren { span, .. } => {
                *span
            }
            Expr::Ident(ident) => ident.span,
            Expr::Call(call) => call.span,
        }
    }

    /// True for literals and arrays/parentheses made only of literals.
    ///
    /// A typed statement whose initializer is literal-only is a declaration;
    /// anything else makes it a deterministic assignment.
    pub fn is_literal_only(&self) -> bool {
        match self {
            Expr::Literal { .. } => true,
            Expr::Array { elements, .. } => elements.iter().all(Expr::is_literal_only),
            Expr::Paren { inner, .. } => inner.is_literal_only(),
            Expr::Ident(_) | Expr::Call(_) => false,
        }
    }
}
