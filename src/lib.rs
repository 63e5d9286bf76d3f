//! ModelPhy compiler
//!
//! ModelPhy is a small modeling language for Bayesian phylogenetics. This
//! crate turns ModelPhy programs into an in-memory [`Model`] of random
//! variables, deterministic functions, observations and constraints, and then
//! into the CodePhy JSON interchange format.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → ModelBuilder → Model → Converter → Document
//!                                                  └→ DependencyGraph
//! ```
//!
//! # Example
//!
//! ```text
//! Real kappa ~ LogNormal(mean=1.0, sigma=0.5);
//! Simplex pi ~ Dirichlet(alpha=[2, 2, 2, 2]);
//! QMatrix Q = HKY(kappa=kappa, baseFrequencies=pi);
//! Tree psi ~ Yule(birthrate=1.0, n=4);
//! Alignment seq ~ PhyloCTMC(tree=psi, substmodel=Q);
//! observe seq from "primates.fasta";
//! ```

pub mod analysis;
pub mod ast;
pub mod builder;
pub mod common;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod lexer;
pub mod model;
pub mod parser;

// Re-export diagnostics for convenience
pub use diagnostics::{ModelError, SourceFile, SyntaxError};

// Re-exports for convenience
pub use ast::Program;
pub use config::ConvertConfig;
pub use convert::{Converter, Document};
pub use model::Model;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse source code to a syntax tree
pub fn parse(source: &str) -> Result<Program, ModelError> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens, source)
}

/// Parse and build the model
pub fn build(source: &str) -> Result<Model, ModelError> {
    let program = parse(source)?;
    builder::build_model(&program)
}

/// Translate source code into an interchange document
pub fn translate(source: &str, config: &ConvertConfig) -> Result<Document, ModelError> {
    let model = build(source)?;
    Ok(Converter::with_config(config.clone()).convert(&model))
}

pub use analysis::analyze;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_translate_minimal() {
        let doc = translate("Real x ~ Normal(mean=0.0, sigma=1.0);", &ConvertConfig::default())
            .unwrap();
        assert_eq!(doc.model, "modelphy_model");
        assert!(doc.random_variables.contains_key("x"));
    }
}
