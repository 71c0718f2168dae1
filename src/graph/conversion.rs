use super::definition::GuardrailGraph;
use super::document::GuardrailDefinition;
use crate::error::GraphConversionError;

/// A trait for custom graph formats that can be converted into a Sekisho `GuardrailGraph`.
///
/// Builders rarely store graphs in exactly the shape the engine expects. Canvas
/// libraries wrap block settings in their own node payloads, name handles
/// differently, and so on. Implementing this trait on your own structs
/// provides the translation layer, keeping the engine format-agnostic.
///
/// # Example
///
/// ```rust,no_run
/// use sekisho::prelude::*;
/// use sekisho::error::GraphConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct CanvasNode { id: String, kind: String, template: String }
/// struct CanvasExport { nodes: Vec<CanvasNode> }
///
/// // 2. Implement `IntoGraph` for your top-level struct.
/// impl IntoGraph for CanvasExport {
///     fn into_graph(self) -> std::result::Result<GuardrailGraph, GraphConversionError> {
///         let mut blocks = Vec::new();
///         for node in self.nodes {
///             let kind = match node.kind.as_str() {
///                 "input" => BlockKind::Input,
///                 "action" => BlockKind::Action,
///                 other => return Err(GraphConversionError::Invalid(format!("unknown kind {}", other))),
///             };
///             blocks.push(Block::new(node.id, kind, node.template));
///         }
///         Ok(GuardrailGraph::new(blocks, vec![]))
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a guardrail graph.
    fn into_graph(self) -> Result<GuardrailGraph, GraphConversionError>;
}

impl IntoGraph for GuardrailGraph {
    fn into_graph(self) -> Result<GuardrailGraph, GraphConversionError> {
        Ok(self)
    }
}

impl IntoGraph for GuardrailDefinition {
    fn into_graph(self) -> Result<GuardrailGraph, GraphConversionError> {
        Ok(self.graph)
    }
}
