use itertools::Itertools;
use thiserror::Error;

/// A block that no connection leads into, reported by `ValidationError::OrphanBlocks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanBlock {
    pub id: String,
    pub name: Option<String>,
}

impl OrphanBlock {
    /// The label a UI should show for this block: its name when it has one, otherwise its id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

fn join_labels(blocks: &[OrphanBlock]) -> String {
    blocks.iter().map(OrphanBlock::label).join(", ")
}

/// Structural problems that prevent a guardrail graph from being evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Guardrail has no blocks")]
    EmptyGraph,

    #[error("Guardrail has {block_count} blocks but no connections between them")]
    Disconnected { block_count: usize },

    #[error("Guardrail has no input block to start evaluation from")]
    NoInput,

    #[error("Guardrail has no action block, so no decision can ever be reached")]
    NoAction,

    #[error("Disconnected blocks: {}", join_labels(.blocks))]
    OrphanBlocks { blocks: Vec<OrphanBlock> },

    #[error("Block id '{0}' is used by more than one block")]
    DuplicateBlockId(String),

    #[error("Connection '{connection_id}' references missing block '{missing_block_id}'")]
    DanglingConnection {
        connection_id: String,
        missing_block_id: String,
    },
}

impl ValidationError {
    /// A stable, machine-readable code for the failure, suitable for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyGraph => "empty_graph",
            ValidationError::Disconnected { .. } => "disconnected",
            ValidationError::NoInput => "no_input",
            ValidationError::NoAction => "no_action",
            ValidationError::OrphanBlocks { .. } => "orphan_blocks",
            ValidationError::DuplicateBlockId(_) => "duplicate_block_id",
            ValidationError::DanglingConnection { .. } => "dangling_connection",
        }
    }
}

/// Failures reported by an external `llm` or `data` collaborator.
///
/// These never escape an evaluation: the engine records them on the
/// affected block's trace entry and keeps traversing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("{collaborator} failed: {message}")]
    Failed {
        collaborator: String,
        message: String,
    },

    #[error("{collaborator} did not answer within {after_ms}ms")]
    TimedOut { collaborator: String, after_ms: u64 },
}

/// Errors that can occur when converting a custom graph format into a `GuardrailGraph`.
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Invalid graph data: {0}")]
    Invalid(String),
}

/// Errors raised while reading or writing guardrail documents and engine configuration.
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("Could not access '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Conversion(#[from] GraphConversionError),
}
