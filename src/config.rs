use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// What an `llm` block does when no LLM backend has been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmFallback {
    /// The block does not activate and its `false` branch is followed.
    #[default]
    FailClosed,
    /// The block activates as if the model had approved.
    PassThrough,
}

/// How blocks with an unrecognised template are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTemplatePolicy {
    /// Activate the block and carry on.
    #[default]
    PassThrough,
    /// Treat the block as not activated.
    FailClosed,
}

fn default_budget_ms() -> Option<u64> {
    Some(EngineConfig::DEFAULT_BUDGET_MS)
}

/// Runtime settings of the evaluation engine. Every field has a default, so an
/// empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock budget for one evaluation in milliseconds. `null` disables it.
    #[serde(default = "default_budget_ms")]
    pub budget_ms: Option<u64>,
    pub llm_fallback: LlmFallback,
    pub unknown_template: UnknownTemplatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget_ms: default_budget_ms(),
            llm_fallback: LlmFallback::default(),
            unknown_template: UnknownTemplatePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_BUDGET_MS: u64 = 100;

    /// A configuration without an evaluation budget.
    pub fn unbounded() -> Self {
        Self {
            budget_ms: None,
            ..Self::default()
        }
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget_ms.map(Duration::from_millis)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Json(e.to_string()))
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}
