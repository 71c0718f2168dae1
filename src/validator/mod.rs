//! Structural checks run before a guardrail graph may be evaluated.

use crate::error::{OrphanBlock, ValidationError};
use crate::graph::{BlockKind, GuardrailGraph};
use ahash::AHashSet;

/// Checks the graph and returns the first rule it violates.
pub fn validate(graph: &GuardrailGraph) -> Result<(), ValidationError> {
    match validate_all(graph).into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Checks every rule and returns all violations, in a fixed order:
/// empty graph, missing connections, missing input, missing action, orphaned
/// blocks, duplicate ids, then dangling connections.
pub fn validate_all(graph: &GuardrailGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if graph.blocks.is_empty() {
        errors.push(ValidationError::EmptyGraph);
    }
    if graph.blocks.len() > 1 && graph.connections.is_empty() {
        errors.push(ValidationError::Disconnected {
            block_count: graph.blocks.len(),
        });
    }
    if graph.blocks_of_kind(BlockKind::Input).next().is_none() {
        errors.push(ValidationError::NoInput);
    }
    if graph.blocks_of_kind(BlockKind::Action).next().is_none() {
        errors.push(ValidationError::NoAction);
    }

    let orphans = find_orphans(graph);
    if !orphans.is_empty() {
        errors.push(ValidationError::OrphanBlocks { blocks: orphans });
    }

    let mut seen: AHashSet<&str> = AHashSet::with_capacity(graph.blocks.len());
    let mut reported: AHashSet<&str> = AHashSet::new();
    for block in &graph.blocks {
        if !seen.insert(block.id.as_str()) && reported.insert(block.id.as_str()) {
            errors.push(ValidationError::DuplicateBlockId(block.id.clone()));
        }
    }

    for connection in &graph.connections {
        for endpoint in [&connection.source_block_id, &connection.target_block_id] {
            if !seen.contains(endpoint.as_str()) {
                errors.push(ValidationError::DanglingConnection {
                    connection_id: connection.id.clone(),
                    missing_block_id: endpoint.clone(),
                });
            }
        }
    }

    errors
}

/// Non-input blocks that no connection targets, in block listing order.
fn find_orphans(graph: &GuardrailGraph) -> Vec<OrphanBlock> {
    let targets: AHashSet<&str> = graph
        .connections
        .iter()
        .map(|c| c.target_block_id.as_str())
        .collect();

    graph
        .blocks
        .iter()
        .filter(|b| b.kind != BlockKind::Input && !targets.contains(b.id.as_str()))
        .map(|b| OrphanBlock {
            id: b.id.clone(),
            name: b.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Block, Connection, HANDLE_OUTPUT};

    fn linked_pair() -> GuardrailGraph {
        GuardrailGraph::new(
            vec![
                Block::new("in", BlockKind::Input, "input-message"),
                Block::new("allow", BlockKind::Action, "action-allow"),
            ],
            vec![Connection::new("c1", "in", HANDLE_OUTPUT, "allow")],
        )
    }

    #[test]
    fn accepts_minimal_graph() {
        assert_eq!(validate(&linked_pair()), Ok(()));
        assert!(validate_all(&linked_pair()).is_empty());
    }

    #[test]
    fn single_block_needs_no_connection() {
        let graph = GuardrailGraph::new(
            vec![Block::new("in", BlockKind::Input, "input-message")],
            vec![],
        );
        // Still rejected, but for lacking an action rather than for being disconnected.
        assert_eq!(validate_all(&graph), vec![ValidationError::NoAction]);
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let mut graph = linked_pair();
        graph.blocks.push(Block::new("allow", BlockKind::Action, "action-block"));
        graph.blocks.push(Block::new("allow", BlockKind::Action, "action-warn"));
        let errors = validate_all(&graph);
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::DuplicateBlockId(_)))
                .count(),
            1
        );
    }

    #[test]
    fn dangling_connection_names_the_missing_block() {
        let mut graph = linked_pair();
        graph
            .connections
            .push(Connection::new("c2", "allow", HANDLE_OUTPUT, "ghost"));
        assert_eq!(
            validate(&graph),
            Err(ValidationError::DanglingConnection {
                connection_id: "c2".to_string(),
                missing_block_id: "ghost".to_string(),
            })
        );
    }
}
