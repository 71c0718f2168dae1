//! Unit tests for core Sekisho types: values, errors, configuration and formatting.
mod common;
use sekisho::config::{LlmFallback, UnknownTemplatePolicy};
use sekisho::error::GraphConversionError;
use sekisho::prelude::*;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::Text("hi".to_string())), "\"hi\"");
    assert_eq!(
        format!("{}", Value::Record(json!({ "loaded": true }))),
        "{\"loaded\":true}"
    );
}

#[test]
fn test_value_serializes_untagged() {
    assert_eq!(serde_json::to_value(Value::Bool(false)).unwrap(), json!(false));
    assert_eq!(
        serde_json::to_value(Value::Text("action-allow".to_string())).unwrap(),
        json!("action-allow")
    );
    assert_eq!(serde_json::to_value(Value::Null).unwrap(), json!(null));
    assert_eq!(
        serde_json::to_value(Value::error("boom")).unwrap(),
        json!({ "error": "boom" })
    );
}

#[test]
fn test_error_display() {
    assert_eq!(
        ValidationError::EmptyGraph.to_string(),
        "Guardrail has no blocks"
    );
    assert_eq!(
        ValidationError::Disconnected { block_count: 3 }.to_string(),
        "Guardrail has 3 blocks but no connections between them"
    );
    assert_eq!(
        ValidationError::DanglingConnection {
            connection_id: "c1".to_string(),
            missing_block_id: "x".to_string(),
        }
        .to_string(),
        "Connection 'c1' references missing block 'x'"
    );
    assert_eq!(
        CollaboratorError::Unavailable("LLM backend".to_string()).to_string(),
        "LLM backend is not available"
    );

    let load: LoadError = GraphConversionError::Invalid("no nodes".to_string()).into();
    assert_eq!(load.to_string(), "Invalid graph data: no nodes");
}

#[test]
fn test_validation_error_codes_are_distinct() {
    let errors = [
        ValidationError::EmptyGraph,
        ValidationError::Disconnected { block_count: 2 },
        ValidationError::NoInput,
        ValidationError::NoAction,
        ValidationError::OrphanBlocks { blocks: vec![] },
        ValidationError::DuplicateBlockId("a".to_string()),
        ValidationError::DanglingConnection {
            connection_id: "c".to_string(),
            missing_block_id: "b".to_string(),
        },
    ];
    let mut codes: Vec<&str> = errors.iter().map(ValidationError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_decision_serialization() {
    assert_eq!(
        serde_json::to_value(Decision::RequireApproval).unwrap(),
        json!("require_approval")
    );
    assert_eq!(Decision::Warn.to_string(), "warn");
}

#[test]
fn test_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.budget_ms, Some(EngineConfig::DEFAULT_BUDGET_MS));
    assert_eq!(config.budget(), Some(Duration::from_millis(100)));
    assert_eq!(config.llm_fallback, LlmFallback::FailClosed);
    assert_eq!(config.unknown_template, UnknownTemplatePolicy::PassThrough);

    assert_eq!(EngineConfig::from_json("{}").unwrap(), config);
    assert_eq!(EngineConfig::unbounded().budget(), None);
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json(
        r#"{ "budget_ms": 250, "llm_fallback": "pass_through", "unknown_template": "fail_closed" }"#,
    )
    .unwrap();
    assert_eq!(config.budget_ms, Some(250));
    assert_eq!(config.llm_fallback, LlmFallback::PassThrough);
    assert_eq!(config.unknown_template, UnknownTemplatePolicy::FailClosed);

    let unbounded = EngineConfig::from_json(r#"{ "budget_ms": null }"#).unwrap();
    assert_eq!(unbounded.budget(), None);

    assert!(matches!(
        EngineConfig::from_json(r#"{ "llm_fallback": "maybe" }"#),
        Err(LoadError::Json(_))
    ));
}

#[test]
fn test_input_json_shape() {
    let input: EvaluationInput = serde_json::from_value(json!({
        "message": "hello",
        "userRole": "admin",
        "context": { "channel": "email" }
    }))
    .unwrap();
    assert_eq!(input.user_role.as_deref(), Some("admin"));
    assert_eq!(input.context.unwrap()["channel"], json!("email"));

    let minimal = serde_json::to_value(EvaluationInput::new("hi")).unwrap();
    assert_eq!(minimal, json!({ "message": "hi" }));
}

#[test]
fn test_connection_type_follows_handle() {
    use sekisho::graph::ConnectionType;
    assert_eq!(
        Connection::new("c", "a", "true", "b").connection_type,
        ConnectionType::Conditional
    );
    assert_eq!(
        Connection::new("c", "a", "output", "b").connection_type,
        ConnectionType::Sequential
    );
}

fn entry(id: &str, kind: BlockKind, result: Value, activated: bool, micros: u64) -> BlockExecutionResult {
    BlockExecutionResult {
        block_id: id.to_string(),
        block_kind: kind,
        result,
        activated,
        duration: Duration::from_micros(micros),
    }
}

#[test]
fn test_format_entry() {
    let line = TraceFormatter::format_entry(&entry(
        "kw",
        BlockKind::Condition,
        Value::Bool(false),
        false,
        7,
    ));
    assert_eq!(line, "[condition] kw -> false (not activated, 7µs)");

    let long = "x".repeat(60);
    let line = TraceFormatter::format_entry(&entry(
        "in",
        BlockKind::Input,
        Value::Text(long),
        true,
        1_500,
    ));
    assert_eq!(
        line,
        format!("[input] in -> \"{}...\" (activated, 1.50ms)", "x".repeat(48))
    );
}

#[test]
fn test_format_result() {
    let result = EvaluationResult {
        guardrail_id: "g".to_string(),
        decision: Decision::Block,
        reason: "confidential".to_string(),
        execution_trace: vec![
            entry("input", BlockKind::Input, Value::Text("salary?".to_string()), true, 2),
            entry("deny", BlockKind::Action, Value::Text("action-block".to_string()), true, 3),
        ],
        total_duration: Duration::from_micros(5),
    };

    let text = TraceFormatter::format_result(&result);
    assert_eq!(
        text,
        "Decision: BLOCK\n\
         Reason: confidential\n  \
         1. [input] input -> \"salary?\" (activated, 2µs)\n  \
         2. [action] deny -> \"action-block\" (activated, 3µs)\n\
         Total: 5µs"
    );

    let empty = EvaluationResult {
        execution_trace: vec![],
        total_duration: Duration::ZERO,
        ..result
    };
    assert!(TraceFormatter::format_result(&empty).contains("No blocks were visited."));
}

#[test]
fn test_result_json_uses_microseconds() {
    let result = EvaluationResult {
        guardrail_id: "g".to_string(),
        decision: Decision::Allow,
        reason: "ok".to_string(),
        execution_trace: vec![entry("in", BlockKind::Input, Value::Null, true, 42)],
        total_duration: Duration::from_micros(42),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["totalDuration"], json!(42));
    assert_eq!(json["executionTrace"][0]["blockType"], json!("input"));
    assert_eq!(json["executionTrace"][0]["duration"], json!(42));

    let back: EvaluationResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}
