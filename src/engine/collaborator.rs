use crate::error::CollaboratorError;
use crate::graph::{DataTemplate, LlmTemplate};
use crate::input::EvaluationInput;
use crate::trace::Value;
use serde_json::json;
use std::time::Duration;

/// What an `llm` block asks its backend.
#[derive(Debug, Clone, Copy)]
pub struct LlmRequest<'a> {
    pub block_id: &'a str,
    pub template: &'a LlmTemplate,
    pub input: &'a EvaluationInput,
    /// Time left in the evaluation budget, if one is set. Backends should give up before it runs out.
    pub remaining: Option<Duration>,
}

/// A model that answers the yes/no question posed by an `llm` block.
///
/// Implementations own their transport, timeouts and retries. Whatever they
/// return, the engine keeps traversing: `Ok(true)` follows the block's `true`
/// branch, `Ok(false)` and any error follow its `false` branch.
pub trait LlmBackend: Send + Sync {
    fn name(&self) -> &str;
    fn judge(&self, request: &LlmRequest<'_>) -> Result<bool, CollaboratorError>;
}

/// What a `data` block asks its source.
#[derive(Debug, Clone, Copy)]
pub struct DataRequest<'a> {
    pub block_id: &'a str,
    pub template: &'a DataTemplate,
    pub input: &'a EvaluationInput,
    pub remaining: Option<Duration>,
}

/// Supplies the value a `data` block looks up.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    fn lookup(&self, request: &DataRequest<'_>) -> Result<Value, CollaboratorError>;
}

/// The data source used when none is registered. It answers from the request itself:
/// user blocks echo the caller's role, policy blocks report the policy as loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDataSource;

impl DataSource for BuiltinDataSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn lookup(&self, request: &DataRequest<'_>) -> Result<Value, CollaboratorError> {
        Ok(match request.template {
            DataTemplate::User { fields } => Value::Record(json!({
                "userRole": request.input.user_role,
                "fields": fields,
            })),
            DataTemplate::Policy { policy_id } => Value::Record(json!({
                "policyId": policy_id,
                "loaded": true,
            })),
            DataTemplate::Unknown(_) => Value::Null,
        })
    }
}
