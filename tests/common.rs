//! Common test utilities for building guardrail graphs and engines.
use sekisho::prelude::*;
use serde_json::json;

/// The salary guardrail used throughout the tests.
///
/// Logic: `input -> contains-keywords["salary"]`, `true -> block("confidential")`,
/// `false -> allow`
#[allow(dead_code)]
pub fn create_salary_graph() -> GuardrailGraph {
    GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("salary", BlockKind::Condition, "contains-keywords")
                .with_name("Mentions salary")
                .with_config("keywords", json!(["salary"])),
            Block::new("deny", BlockKind::Action, "action-block")
                .with_config("message", json!("confidential")),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![
            Connection::new("c1", "input", "output", "salary"),
            Connection::new("c2", "salary", "true", "deny"),
            Connection::new("c3", "salary", "false", "ok"),
        ],
    )
}

/// Two conditions fed by the same input, both leading to the same block action.
///
/// Logic: `input -> {kw-a, kw-b}`, both `true -> deny`, both `false -> ok`
#[allow(dead_code)]
pub fn create_diamond_graph() -> GuardrailGraph {
    GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("kw-a", BlockKind::Condition, "contains-keywords")
                .with_config("keywords", json!(["password"])),
            Block::new("kw-b", BlockKind::Condition, "contains-keywords")
                .with_config("keywords", json!(["secret"])),
            Block::new("deny", BlockKind::Action, "action-block")
                .with_config("message", json!("credentials detected")),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![
            Connection::new("c1", "input", "output", "kw-a"),
            Connection::new("c2", "input", "output", "kw-b"),
            Connection::new("c3", "kw-a", "true", "deny"),
            Connection::new("c4", "kw-b", "true", "deny"),
            Connection::new("c5", "kw-a", "false", "ok"),
            Connection::new("c6", "kw-b", "false", "ok"),
        ],
    )
}

/// A graph where one condition routes into a gate, so gate results can be checked.
///
/// Logic: `input -> {a, b}`, `a.true -> gate`, `b.true -> gate`, `gate -> deny`,
/// `a.false -> ok`
#[allow(dead_code)]
pub fn create_gate_graph(gate_template: &str) -> GuardrailGraph {
    GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("a", BlockKind::Condition, "contains-keywords")
                .with_config("keywords", json!(["export"])),
            Block::new("b", BlockKind::Condition, "contains-keywords")
                .with_config("keywords", json!(["customers"])),
            Block::new("gate", BlockKind::Logic, gate_template),
            Block::new("deny", BlockKind::Action, "action-block")
                .with_config("message", json!("bulk export")),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![
            Connection::new("c1", "input", "output", "a"),
            Connection::new("c2", "input", "output", "b"),
            Connection::new("c3", "a", "true", "gate"),
            Connection::new("c4", "b", "true", "gate"),
            Connection::new("c5", "gate", "output", "deny"),
            Connection::new("c6", "a", "false", "ok"),
        ],
    )
}

/// A single-condition graph around the given condition block (whose id must be `cond`).
#[allow(dead_code)]
pub fn create_condition_graph(condition: Block) -> GuardrailGraph {
    GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            condition,
            Block::new("deny", BlockKind::Action, "action-block"),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![
            Connection::new("c1", "input", "output", "cond"),
            Connection::new("c2", "cond", "true", "deny"),
            Connection::new("c3", "cond", "false", "ok"),
        ],
    )
}

/// An engine without an evaluation budget, so slow test machines never time out.
#[allow(dead_code)]
pub fn unbounded_engine() -> Engine {
    Engine::new(EngineConfig::unbounded())
}

/// The `(blockId, activated)` pairs of a result's trace, in visitation order.
#[allow(dead_code)]
pub fn trace_summary(result: &EvaluationResult) -> Vec<(String, bool)> {
    result
        .execution_trace
        .iter()
        .map(|e| (e.block_id.clone(), e.activated))
        .collect()
}

/// A stored guardrail document in the shape the builder saves.
#[allow(dead_code)]
pub const SALARY_GUARDRAIL_JSON: &str = r##"{
    "id": "hr-001",
    "name": "HR data guard",
    "description": "Keeps compensation data private",
    "isActive": true,
    "version": 3,
    "blocks": [
        { "id": "input", "type": "input", "templateId": "input-message", "position": { "x": 0, "y": 0 } },
        {
            "id": "salary",
            "type": "condition",
            "templateId": "condition-contains",
            "name": "Mentions salary",
            "config": { "keywords": ["salary", "compensation"], "matchMode": "any", "uiColor": "#ff0000" },
            "position": { "x": 200, "y": 0 }
        },
        {
            "id": "role",
            "type": "condition",
            "templateId": "condition-role",
            "config": { "allowedRoles": ["hr", "admin"] },
            "position": { "x": 400, "y": 0 }
        },
        { "id": "deny", "type": "action", "templateId": "action-block", "config": { "message": "Compensation data is restricted" }, "position": { "x": 600, "y": 0 } },
        { "id": "ok", "type": "action", "templateId": "action-allow", "position": { "x": 600, "y": 200 } }
    ],
    "connections": [
        { "id": "c1", "sourceBlockId": "input", "sourceHandle": "output", "targetBlockId": "salary", "targetHandle": "input", "type": "sequential" },
        { "id": "c2", "sourceBlockId": "salary", "sourceHandle": "true", "targetBlockId": "role", "targetHandle": "input", "type": "conditional" },
        { "id": "c3", "sourceBlockId": "salary", "sourceHandle": "false", "targetBlockId": "ok", "targetHandle": "input", "type": "conditional" },
        { "id": "c4", "sourceBlockId": "role", "sourceHandle": "true", "targetBlockId": "ok", "targetHandle": "input", "type": "conditional" },
        { "id": "c5", "sourceBlockId": "role", "sourceHandle": "false", "targetBlockId": "deny", "targetHandle": "input", "type": "conditional" }
    ]
}"##;
