use super::definition::GuardrailGraph;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fs;

fn default_version() -> u32 {
    1
}

/// A guardrail as it is stored: identity and bookkeeping around its graph.
///
/// The JSON shape matches what the builder saves, with the graph's `blocks`
/// and `connections` inlined at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub graph: GuardrailGraph,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "default_version")]
    pub version: u32,
}

impl GuardrailDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, graph: GuardrailGraph) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            graph,
            is_active: false,
            version: default_version(),
        }
    }

    /// Parses a guardrail document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Json(e.to_string()))
    }

    /// Serializes the guardrail document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::Json(e.to_string()))
    }

    /// Saves the guardrail document to a file.
    pub fn save(&self, path: &str) -> Result<(), LoadError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| LoadError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads a guardrail document from a file.
    pub fn from_file(path: &str) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}
