//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the sekisho crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use sekisho::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let guardrail = GuardrailDefinition::from_file("path/to/guardrail.json")?;
//! let engine = Engine::new(EngineConfig::from_file("path/to/engine.json")?);
//!
//! let input = EvaluationInput::new("Can you share the quarterly salary report?").with_role("intern");
//! let result = engine.evaluate_definition(&guardrail, &input)?;
//!
//! println!("{}", TraceFormatter::format_result(&result));
//! # Ok(())
//! # }
//! ```

// Engine and configuration
pub use crate::config::{EngineConfig, LlmFallback, UnknownTemplatePolicy};
pub use crate::engine::{
    DataRequest, DataSource, Engine, EngineBuilder, LlmBackend, LlmRequest, PreparedGuardrail,
};
pub use crate::input::EvaluationInput;

// Graph model
pub use crate::graph::{
    Block, BlockKind, Connection, GuardrailDefinition, GuardrailGraph, IntoGraph,
};

// Results
pub use crate::trace::{BlockExecutionResult, Decision, EvaluationResult, TraceFormatter, Value};

// Error types
pub use crate::error::{CollaboratorError, LoadError, ValidationError};

// Validation
pub use crate::validator::{validate, validate_all};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
