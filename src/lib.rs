//! # Sekisho - Guardrail Graph Evaluation Engine
//!
//! **Sekisho** evaluates guardrails that were assembled visually as block graphs.
//! A guardrail is a directed graph of typed blocks (inputs, conditions, logic
//! gates, data lookups, LLM judges and actions) joined by connections. Given an
//! incoming request, the engine walks the graph from its input blocks, records
//! what every visited block did, and resolves a single decision: `allow`,
//! `block`, `warn` or `require_approval`.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Graph**: Parse a stored `GuardrailDefinition`, build a `GuardrailGraph` in code,
//!     or implement the `IntoGraph` trait for your own canvas format.
//! 2.  **Validate**: `validator::validate` rejects graphs that can never reach a decision.
//!     The engine runs it for you before every evaluation.
//! 3.  **Evaluate**: Create an `Engine` (optionally with an `LlmBackend` and a `DataSource`)
//!     and evaluate `EvaluationInput`s against the graph. Use `Engine::prepare` to
//!     validate once and evaluate many times.
//! 4.  **Explain**: Every `EvaluationResult` carries the execution trace, which
//!     `TraceFormatter` renders for humans.
//!
//! Anything that reaches no activated action is denied.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sekisho::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     // input -> condition -(true)-> block
//!     //                    -(false)-> allow
//!     let graph = GuardrailGraph::new(
//!         vec![
//!             Block::new("in", BlockKind::Input, "input-message"),
//!             Block::new("kw", BlockKind::Condition, "contains-keywords")
//!                 .with_config("keywords", json!(["salary"])),
//!             Block::new("deny", BlockKind::Action, "action-block")
//!                 .with_config("message", json!("confidential")),
//!             Block::new("ok", BlockKind::Action, "action-allow"),
//!         ],
//!         vec![
//!             Connection::new("c1", "in", "output", "kw"),
//!             Connection::new("c2", "kw", "true", "deny"),
//!             Connection::new("c3", "kw", "false", "ok"),
//!         ],
//!     );
//!
//!     let engine = Engine::builder()
//!         .with_config(EngineConfig::default())
//!         .build();
//!
//!     let input = EvaluationInput::new("What is John's salary?");
//!     let result = engine.evaluate("hr-guardrail", &graph, &input)?;
//!
//!     assert_eq!(result.decision, Decision::Block);
//!     println!("{}", TraceFormatter::format_result(&result));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod input;
pub mod prelude;
pub mod resolver;
pub mod trace;
pub mod validator;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, PreparedGuardrail};
pub use graph::{GuardrailDefinition, GuardrailGraph};
pub use input::EvaluationInput;
pub use trace::{Decision, EvaluationResult};
