pub mod formatter;
pub mod value;

pub use formatter::TraceFormatter;
pub use value::Value;

use crate::graph::BlockKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Serializes durations as whole microseconds.
mod micros {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_micros)
    }
}

/// The final verdict of a guardrail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Block,
    Warn,
    RequireApproval,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Block => "block",
            Decision::Warn => "warn",
            Decision::RequireApproval => "require_approval",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the execution trace: what a single visited block did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExecutionResult {
    pub block_id: String,
    #[serde(rename = "blockType", alias = "blockKind")]
    pub block_kind: BlockKind,
    pub result: Value,
    pub activated: bool,
    /// Time spent evaluating this block, serialized in microseconds.
    #[serde(with = "micros")]
    pub duration: Duration,
}

/// The outcome of evaluating one request against one guardrail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub guardrail_id: String,
    pub decision: Decision,
    pub reason: String,
    /// Visited blocks, in visitation order.
    pub execution_trace: Vec<BlockExecutionResult>,
    /// Sum of the trace entries' durations, serialized in microseconds.
    #[serde(with = "micros")]
    pub total_duration: Duration,
}

impl EvaluationResult {
    pub fn trace_entry(&self, block_id: &str) -> Option<&BlockExecutionResult> {
        self.execution_trace.iter().find(|e| e.block_id == block_id)
    }

    pub fn visited(&self, block_id: &str) -> bool {
        self.trace_entry(block_id).is_some()
    }
}
