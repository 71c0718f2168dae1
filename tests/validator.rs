//! Tests for the structural checks that gate evaluation.
mod common;
use common::*;
use sekisho::error::OrphanBlock;
use sekisho::prelude::*;

#[test]
fn test_valid_graph_passes() {
    assert_eq!(validate(&create_salary_graph()), Ok(()));
    assert!(validate_all(&create_diamond_graph()).is_empty());
}

#[test]
fn test_empty_graph_is_rejected() {
    let graph = GuardrailGraph::default();
    assert_eq!(validate(&graph), Err(ValidationError::EmptyGraph));
    assert_eq!(
        validate_all(&graph),
        vec![
            ValidationError::EmptyGraph,
            ValidationError::NoInput,
            ValidationError::NoAction
        ]
    );
}

#[test]
fn test_unconnected_blocks_are_disconnected() {
    let graph = GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![],
    );
    assert_eq!(
        validate(&graph),
        Err(ValidationError::Disconnected { block_count: 2 })
    );
}

#[test]
fn test_orphan_condition_is_named() {
    let graph = GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("ok", BlockKind::Action, "action-allow"),
            Block::new("stray", BlockKind::Condition, "contains-keywords").with_name("Stray check"),
        ],
        vec![Connection::new("c1", "input", "output", "ok")],
    );

    let error = validate(&graph).unwrap_err();
    assert_eq!(
        error,
        ValidationError::OrphanBlocks {
            blocks: vec![OrphanBlock {
                id: "stray".to_string(),
                name: Some("Stray check".to_string()),
            }]
        }
    );
    assert_eq!(error.to_string(), "Disconnected blocks: Stray check");
    assert_eq!(error.code(), "orphan_blocks");
}

#[test]
fn test_orphans_without_names_use_their_ids() {
    let graph = GuardrailGraph::new(
        vec![
            Block::new("input", BlockKind::Input, "input-message"),
            Block::new("ok", BlockKind::Action, "action-allow"),
            Block::new("x", BlockKind::Condition, "regex-match"),
            Block::new("y", BlockKind::Action, "action-warn"),
        ],
        vec![Connection::new("c1", "input", "output", "ok")],
    );
    assert_eq!(
        validate(&graph).unwrap_err().to_string(),
        "Disconnected blocks: x, y"
    );
}

#[test]
fn test_missing_action_always_fails() {
    let graphs = [
        GuardrailGraph::new(
            vec![Block::new("input", BlockKind::Input, "input-message")],
            vec![],
        ),
        GuardrailGraph::new(
            vec![
                Block::new("input", BlockKind::Input, "input-message"),
                Block::new("cond", BlockKind::Condition, "contains-keywords"),
                Block::new("out", BlockKind::Output, "output-decision"),
            ],
            vec![
                Connection::new("c1", "input", "output", "cond"),
                Connection::new("c2", "cond", "true", "out"),
            ],
        ),
    ];
    for graph in &graphs {
        assert!(validate_all(graph).contains(&ValidationError::NoAction));
        assert_eq!(validate(graph), Err(ValidationError::NoAction));
    }
}

#[test]
fn test_missing_input_is_rejected() {
    let graph = GuardrailGraph::new(
        vec![
            Block::new("cond", BlockKind::Condition, "contains-keywords"),
            Block::new("ok", BlockKind::Action, "action-allow"),
        ],
        vec![Connection::new("c1", "cond", "true", "ok")],
    );
    // `cond` has no incoming edge either, but the missing input is reported first.
    assert_eq!(validate(&graph), Err(ValidationError::NoInput));
    assert!(
        validate_all(&graph)
            .iter()
            .any(|e| matches!(e, ValidationError::OrphanBlocks { .. }))
    );
}

#[test]
fn test_duplicate_ids_and_dangling_connections() {
    let mut graph = create_salary_graph();
    graph
        .blocks
        .push(Block::new("ok", BlockKind::Action, "action-warn"));
    graph
        .connections
        .push(Connection::new("c9", "salary", "true", "ghost"));

    let errors = validate_all(&graph);
    assert_eq!(
        errors,
        vec![
            ValidationError::DuplicateBlockId("ok".to_string()),
            ValidationError::DanglingConnection {
                connection_id: "c9".to_string(),
                missing_block_id: "ghost".to_string(),
            },
        ]
    );
}

#[test]
fn test_engine_refuses_invalid_graphs() {
    let engine = unbounded_engine();
    let input = EvaluationInput::new("anything");
    let result = engine.evaluate("g", &GuardrailGraph::default(), &input);
    assert_eq!(result.unwrap_err(), ValidationError::EmptyGraph);
}
