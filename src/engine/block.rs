use super::Engine;
use super::collaborator::{DataRequest, LlmRequest};
use crate::config::{LlmFallback, UnknownTemplatePolicy};
use crate::error::CollaboratorError;
use crate::graph::{Block, BlockSpec, ConditionTemplate, LlmTemplate, LogicGate, MatchMode};
use crate::input::EvaluationInput;
use crate::trace::Value;
use std::time::Duration;
use tracing::warn;

/// What evaluating a single block produced.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BlockOutcome {
    pub activated: bool,
    pub result: Value,
}

impl BlockOutcome {
    fn active(result: Value) -> Self {
        Self {
            activated: true,
            result,
        }
    }

    fn boolean(activated: bool) -> Self {
        Self {
            activated,
            result: Value::Bool(activated),
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            activated: false,
            result: Value::error(error.to_string()),
        }
    }
}

/// Evaluates one block. Never fails: collaborator errors become a
/// non-activated outcome carrying the error.
pub(super) struct BlockEvaluator<'a> {
    engine: &'a Engine,
    input: &'a EvaluationInput,
    remaining: Option<Duration>,
}

impl<'a> BlockEvaluator<'a> {
    pub(super) fn new(
        engine: &'a Engine,
        input: &'a EvaluationInput,
        remaining: Option<Duration>,
    ) -> Self {
        Self {
            engine,
            input,
            remaining,
        }
    }

    /// `signals` are the upstream boolean signals feeding a logic gate, in connection order.
    pub(super) fn evaluate(&self, block: &Block, spec: &BlockSpec, signals: &[bool]) -> BlockOutcome {
        match spec {
            BlockSpec::Input(_) => BlockOutcome::active(Value::Text(self.input.message.clone())),
            BlockSpec::Condition(condition) => self.eval_condition(condition),
            BlockSpec::Logic(gate) => self.eval_gate(gate, signals),
            BlockSpec::Action(_) => BlockOutcome::active(Value::Text(block.template_id.clone())),
            BlockSpec::Data(template) => {
                let request = DataRequest {
                    block_id: &block.id,
                    template,
                    input: self.input,
                    remaining: self.remaining,
                };
                match self.engine.data_source.lookup(&request) {
                    Ok(value) => BlockOutcome::active(value),
                    Err(e) => {
                        warn!(block_id = %block.id, error = %e, "data lookup failed");
                        BlockOutcome::failed(e)
                    }
                }
            }
            BlockSpec::Llm(template) => self.eval_llm(block, template),
            BlockSpec::Output => BlockOutcome::active(Value::Null),
        }
    }

    fn eval_condition(&self, condition: &ConditionTemplate) -> BlockOutcome {
        match condition {
            ConditionTemplate::ContainsKeywords {
                keywords,
                match_mode,
            } => {
                let message = self.input.message.to_lowercase();
                let mut hits = keywords.iter().map(|k| message.contains(&k.to_lowercase()));
                BlockOutcome::boolean(match match_mode {
                    MatchMode::Any => hits.any(|hit| hit),
                    MatchMode::All => hits.all(|hit| hit),
                })
            }
            ConditionTemplate::CheckRole { allowed_roles } => {
                let role = self
                    .input
                    .user_role
                    .as_deref()
                    .map(|r| r.trim().to_lowercase())
                    .unwrap_or_default();
                BlockOutcome::boolean(
                    !role.is_empty() && allowed_roles.iter().any(|r| r.to_lowercase() == role),
                )
            }
            ConditionTemplate::RegexMatch { pattern, compiled } => match compiled {
                None => BlockOutcome::boolean(false),
                Some(Ok(regex)) => BlockOutcome::boolean(regex.is_match(&self.input.message)),
                Some(Err(e)) => BlockOutcome::failed(format!("invalid pattern '{}': {}", pattern, e)),
            },
            ConditionTemplate::Unknown(_) => self.unknown_template(),
        }
    }

    fn eval_gate(&self, gate: &LogicGate, signals: &[bool]) -> BlockOutcome {
        match gate {
            LogicGate::And => {
                BlockOutcome::boolean(!signals.is_empty() && signals.iter().all(|s| *s))
            }
            LogicGate::Or => BlockOutcome::boolean(signals.iter().any(|s| *s)),
            LogicGate::Not => BlockOutcome::boolean(!signals.first().copied().unwrap_or(true)),
            LogicGate::Unknown(_) => self.unknown_template(),
        }
    }

    fn eval_llm(&self, block: &Block, template: &LlmTemplate) -> BlockOutcome {
        if let LlmTemplate::Unknown(_) = template {
            return self.unknown_template();
        }

        let Some(backend) = self.engine.llm.as_deref() else {
            return match self.engine.config.llm_fallback {
                LlmFallback::PassThrough => BlockOutcome::boolean(true),
                LlmFallback::FailClosed => {
                    BlockOutcome::failed(CollaboratorError::Unavailable("LLM backend".to_string()))
                }
            };
        };

        let request = LlmRequest {
            block_id: &block.id,
            template,
            input: self.input,
            remaining: self.remaining,
        };
        match backend.judge(&request) {
            Ok(verdict) => BlockOutcome::boolean(verdict),
            Err(e) => {
                warn!(block_id = %block.id, backend = backend.name(), error = %e, "LLM evaluation failed");
                BlockOutcome::failed(e)
            }
        }
    }

    fn unknown_template(&self) -> BlockOutcome {
        BlockOutcome::boolean(self.engine.config.unknown_template == UnknownTemplatePolicy::PassThrough)
    }
}
