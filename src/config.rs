//! Converter configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so a file only needs the keys it overrides:
//!
//! ```toml
//! title = "Primate divergence"
//! extra_tags = ["primates"]
//!
//! [software]
//! name = "my-pipeline"
//! ```

use crate::diagnostics::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version written to every document
pub const FORMAT_VERSION: &str = "0.1";

/// Model name used when there is no alignment or tree variable
pub const FALLBACK_MODEL_NAME: &str = "modelphy_model";

/// Converter settings: document metadata and naming.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub format_version: String,
    pub title: String,
    pub description: String,
    /// Version of the described model
    pub version: String,
    pub software: SoftwareConfig,
    /// Added after the fixed domain tags
    pub extra_tags: Vec<String>,
    pub fallback_model_name: String,
}

/// Name and version of the producing software.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SoftwareConfig {
    pub name: String,
    pub version: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            title: "ModelPhy converted model".to_string(),
            description: "Model converted from ModelPhy format to CodePhy".to_string(),
            version: "1.0.0".to_string(),
            software: SoftwareConfig::default(),
            extra_tags: Vec::new(),
            fallback_model_name: FALLBACK_MODEL_NAME.to_string(),
        }
    }
}

impl Default for SoftwareConfig {
    fn default() -> Self {
        Self {
            name: "ModelPhy Converter".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ModelError> {
        toml::from_str(content).map_err(|e| ModelError::Config {
            message: e.to_string(),
        })
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            message: format!("Failed to read config {}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded converter config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_document_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.format_version, "0.1");
        assert_eq!(config.software.name, "ModelPhy Converter");
        assert!(config.extra_tags.is_empty());
    }

    #[test]
    fn partial_toml_config() {
        let config = ConvertConfig::from_toml_str(
            r#"
title = "Primates"
extra_tags = ["primates"]

[software]
version = "2.0.0"
"#,
        )
        .unwrap();
        assert_eq!(config.title, "Primates");
        assert_eq!(config.extra_tags, vec!["primates"]);
        assert_eq!(config.software.name, "ModelPhy Converter");
        assert_eq!(config.software.version, "2.0.0");
        assert_eq!(config.description, ConvertConfig::default().description);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ConvertConfig::from_toml_str("title = [").unwrap_err();
        assert!(matches!(err, ModelError::Config { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ConvertConfig::load(Path::new("/nonexistent/modelphy.toml")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
