use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Output handle used by blocks with a single generic output.
pub const HANDLE_OUTPUT: &str = "output";
/// Output handle followed by a `condition` or `llm` block that activated.
pub const HANDLE_TRUE: &str = "true";
/// Output handle followed by a `condition` or `llm` block that did not activate.
pub const HANDLE_FALSE: &str = "false";
/// Default input handle of every block.
pub const HANDLE_INPUT: &str = "input";

/// The kind of a block, which decides how it is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Input,
    Condition,
    Logic,
    Action,
    Data,
    Llm,
    Output,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Input => "input",
            BlockKind::Condition => "condition",
            BlockKind::Logic => "logic",
            BlockKind::Action => "action",
            BlockKind::Data => "data",
            BlockKind::Llm => "llm",
            BlockKind::Output => "output",
        }
    }

    /// Branching kinds expose `true`/`false` outputs and only follow the one matching their result.
    pub fn is_branching(&self) -> bool {
        matches!(self, BlockKind::Condition | BlockKind::Llm)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates of a block. Never used by evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single node of a guardrail graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: BlockKind,
    #[serde(default)]
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Template-specific settings. Kept as an open map so unknown keys survive a save/load cycle.
    #[serde(default)]
    pub config: Map<String, JsonValue>,
    #[serde(default)]
    pub position: Position,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind, template_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            template_id: template_id.into(),
            name: None,
            category: None,
            config: Map::new(),
            position: Position::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, key: &str, value: JsonValue) -> Self {
        self.config.insert(key.to_string(), value);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }
}

/// How the builder drew a connection. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Sequential,
    Conditional,
    Parallel,
}

fn default_source_handle() -> String {
    HANDLE_OUTPUT.to_string()
}

fn default_target_handle() -> String {
    HANDLE_INPUT.to_string()
}

/// A directed edge between two blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_block_id: String,
    #[serde(default = "default_source_handle")]
    pub source_handle: String,
    pub target_block_id: String,
    #[serde(default = "default_target_handle")]
    pub target_handle: String,
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        source_block_id: impl Into<String>,
        source_handle: impl Into<String>,
        target_block_id: impl Into<String>,
    ) -> Self {
        let source_handle = source_handle.into();
        let connection_type = if source_handle == HANDLE_TRUE || source_handle == HANDLE_FALSE {
            ConnectionType::Conditional
        } else {
            ConnectionType::Sequential
        };
        Self {
            id: id.into(),
            source_block_id: source_block_id.into(),
            source_handle,
            target_block_id: target_block_id.into(),
            target_handle: default_target_handle(),
            connection_type,
        }
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = handle.into();
        self
    }
}

/// The logical shape of a guardrail: its blocks and the connections between them.
///
/// Block and connection order is significant: input blocks are seeded in
/// listing order and outgoing connections are followed in listing order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuardrailGraph {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl GuardrailGraph {
    pub fn new(blocks: Vec<Block>, connections: Vec<Connection>) -> Self {
        Self {
            blocks,
            connections,
        }
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn blocks_of_kind(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
