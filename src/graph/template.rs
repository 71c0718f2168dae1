//! Typed block behaviour.
//!
//! Builders hand us blocks as `(kind, templateId, config)` with an open config
//! map. Before evaluation every block is decoded once into a [`BlockSpec`], a
//! closed set of variants with their settings already extracted, so the engine
//! never touches raw JSON or compares template strings while traversing.

use super::definition::{Block, BlockKind};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value as JsonValue};

/// How a keyword condition combines its keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Any,
    All,
}

/// The builder template of an input block. Every input block yields the message text;
/// the template only records where the builder placed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTemplate {
    Message,
    Context,
}

#[derive(Debug, Clone)]
pub enum ConditionTemplate {
    ContainsKeywords {
        keywords: Vec<String>,
        match_mode: MatchMode,
    },
    CheckRole {
        allowed_roles: Vec<String>,
    },
    /// `compiled` is `None` for an empty pattern, `Some(Err)` for one that does not compile.
    RegexMatch {
        pattern: String,
        compiled: Option<Result<Regex, String>>,
    },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicGate {
    And,
    Or,
    Not,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTemplate {
    Block { message: Option<String> },
    Warn { warning: Option<String> },
    RequireApproval { approvers: Vec<String> },
    Allow,
    Log { level: String },
    Other(String),
}

impl ActionTemplate {
    /// Whether the decision resolver takes this action into account.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, ActionTemplate::Log { .. } | ActionTemplate::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTemplate {
    User { fields: Vec<String> },
    Policy { policy_id: String },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LlmTemplate {
    Evaluate {
        prompt: String,
        temperature: f64,
    },
    Classify {
        prompt: String,
        categories: Vec<String>,
    },
    Unknown(String),
}

impl LlmTemplate {
    pub fn prompt(&self) -> &str {
        match self {
            LlmTemplate::Evaluate { prompt, .. } | LlmTemplate::Classify { prompt, .. } => prompt,
            LlmTemplate::Unknown(_) => "",
        }
    }
}

/// The decoded behaviour of one block.
#[derive(Debug, Clone)]
pub enum BlockSpec {
    Input(InputTemplate),
    Condition(ConditionTemplate),
    Logic(LogicGate),
    Action(ActionTemplate),
    Data(DataTemplate),
    Llm(LlmTemplate),
    Output,
}

impl BlockSpec {
    /// Decodes a block's template and config. Unrecognised templates decode to an
    /// `Unknown`/`Other` variant instead of failing.
    pub fn decode(block: &Block) -> Self {
        let template = block.template_id.to_lowercase();
        let config = &block.config;
        match block.kind {
            BlockKind::Input => BlockSpec::Input(if template.contains("context") {
                InputTemplate::Context
            } else {
                InputTemplate::Message
            }),
            BlockKind::Condition => BlockSpec::Condition(decode_condition(&template, config)),
            BlockKind::Logic => BlockSpec::Logic(decode_gate(&template)),
            BlockKind::Action => BlockSpec::Action(decode_action(&template, config)),
            BlockKind::Data => BlockSpec::Data(decode_data(&template, config)),
            BlockKind::Llm => BlockSpec::Llm(decode_llm(&template, config)),
            BlockKind::Output => BlockSpec::Output,
        }
    }

    /// The unrecognised template id, if any.
    pub fn unknown_template(&self) -> Option<&str> {
        match self {
            BlockSpec::Condition(ConditionTemplate::Unknown(t))
            | BlockSpec::Logic(LogicGate::Unknown(t))
            | BlockSpec::Action(ActionTemplate::Other(t))
            | BlockSpec::Data(DataTemplate::Unknown(t))
            | BlockSpec::Llm(LlmTemplate::Unknown(t)) => Some(t),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionTemplate> {
        match self {
            BlockSpec::Action(action) => Some(action),
            _ => None,
        }
    }
}

fn decode_condition(template: &str, config: &Map<String, JsonValue>) -> ConditionTemplate {
    if template.contains("contains") {
        let match_mode = match config_str(config, "matchMode").as_deref() {
            None | Some("any") => MatchMode::Any,
            Some(_) => MatchMode::All,
        };
        ConditionTemplate::ContainsKeywords {
            keywords: config_str_list(config, "keywords"),
            match_mode,
        }
    } else if template.contains("role") {
        ConditionTemplate::CheckRole {
            allowed_roles: config_str_list(config, "allowedRoles"),
        }
    } else if template.contains("regex") {
        let pattern = config_str(config, "pattern").unwrap_or_default();
        let compiled = (!pattern.is_empty()).then(|| {
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| e.to_string())
        });
        ConditionTemplate::RegexMatch { pattern, compiled }
    } else {
        ConditionTemplate::Unknown(template.to_string())
    }
}

fn decode_gate(template: &str) -> LogicGate {
    let has_token = |token: &str| template.split(['-', '_']).any(|t| t == token);
    if has_token("and") {
        LogicGate::And
    } else if has_token("or") {
        LogicGate::Or
    } else if has_token("not") {
        LogicGate::Not
    } else {
        LogicGate::Unknown(template.to_string())
    }
}

fn decode_action(template: &str, config: &Map<String, JsonValue>) -> ActionTemplate {
    if template.contains("block") {
        ActionTemplate::Block {
            message: config_str(config, "message"),
        }
    } else if template.contains("warn") {
        ActionTemplate::Warn {
            warning: config_str(config, "warning"),
        }
    } else if template.contains("approval") {
        ActionTemplate::RequireApproval {
            approvers: config_str_list(config, "approvers"),
        }
    } else if template.contains("allow") {
        ActionTemplate::Allow
    } else if template.contains("log") {
        ActionTemplate::Log {
            level: config_str(config, "logLevel").unwrap_or_else(|| "info".to_string()),
        }
    } else {
        ActionTemplate::Other(template.to_string())
    }
}

fn decode_data(template: &str, config: &Map<String, JsonValue>) -> DataTemplate {
    if template.contains("user") {
        DataTemplate::User {
            fields: config_str_list(config, "fields"),
        }
    } else if template.contains("policy") {
        DataTemplate::Policy {
            policy_id: config_str(config, "policyId").unwrap_or_default(),
        }
    } else {
        DataTemplate::Unknown(template.to_string())
    }
}

fn decode_llm(template: &str, config: &Map<String, JsonValue>) -> LlmTemplate {
    let prompt = config_str(config, "prompt").unwrap_or_default();
    if template.contains("evaluate") {
        LlmTemplate::Evaluate {
            prompt,
            temperature: config
                .get("temperature")
                .and_then(JsonValue::as_f64)
                .unwrap_or(0.0),
        }
    } else if template.contains("classify") {
        LlmTemplate::Classify {
            prompt,
            categories: config_str_list(config, "categories"),
        }
    } else {
        LlmTemplate::Unknown(template.to_string())
    }
}

/// Reads a non-blank string setting.
fn config_str(config: &Map<String, JsonValue>, key: &str) -> Option<String> {
    config
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads a list of strings, skipping entries that are not strings or are blank.
/// A single string is accepted as a one-element list.
fn config_str_list(config: &Map<String, JsonValue>, key: &str) -> Vec<String> {
    match config.get(key) {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
