use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::graph::{ActionTemplate, BlockKind, BlockSpec, GuardrailDefinition, GuardrailGraph};
use crate::input::EvaluationInput;
use crate::resolver::{self, Verdict};
use crate::trace::EvaluationResult;
use crate::validator;
use ahash::AHashMap;
use rayon::prelude::*;
use std::time::Duration;
use tracing::{info, warn};

mod block;
pub mod collaborator;
mod traversal;

pub use collaborator::{BuiltinDataSource, DataRequest, DataSource, LlmBackend, LlmRequest};

/// Evaluates guardrail graphs against requests.
///
/// An `Engine` holds configuration and the external collaborators used by
/// `llm` and `data` blocks. It keeps no per-evaluation state, so a single
/// instance can serve any number of evaluations, concurrently if needed.
pub struct Engine {
    config: EngineConfig,
    llm: Option<Box<dyn LlmBackend>>,
    data_source: Box<dyn DataSource>,
}

/// Builder for [`Engine`].
///
/// Starts from [`EngineConfig::default`], no LLM backend and the built-in data source.
pub struct EngineBuilder {
    config: EngineConfig,
    llm: Option<Box<dyn LlmBackend>>,
    data_source: Box<dyn DataSource>,
}

impl EngineBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            llm: None,
            data_source: Box::new(BuiltinDataSource),
        }
    }

    /// Replace the engine configuration (budget and fallback policies).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the backend that judges `llm` blocks.
    ///
    /// Without one, `llm` blocks follow [`EngineConfig::llm_fallback`].
    pub fn with_llm_backend(mut self, backend: Box<dyn LlmBackend>) -> Self {
        self.llm = Some(backend);
        self
    }

    /// Set the source that answers `data` blocks.
    pub fn with_data_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.data_source = source;
        self
    }

    /// Build the engine.
    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            llm: self.llm,
            data_source: self.data_source,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Creates an engine with the given configuration and the built-in data source.
    pub fn new(config: EngineConfig) -> Self {
        EngineBuilder::new().with_config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a graph and decodes its blocks, producing a guardrail that can be
    /// evaluated repeatedly without repeating that work.
    pub fn prepare<'a>(
        &'a self,
        guardrail_id: impl Into<String>,
        graph: &'a GuardrailGraph,
    ) -> Result<PreparedGuardrail<'a>, ValidationError> {
        validator::validate(graph)?;
        Ok(PreparedGuardrail::new(self, guardrail_id.into(), graph))
    }

    /// Validates the graph and evaluates one request against it.
    ///
    /// # Returns
    ///
    /// * `Ok(EvaluationResult)`: the decision, its reason and the execution trace.
    ///   Per-block failures and budget exhaustion are reported inside the result.
    /// * `Err(ValidationError)`: the graph is malformed and evaluation did not start.
    pub fn evaluate(
        &self,
        guardrail_id: impl Into<String>,
        graph: &GuardrailGraph,
        input: &EvaluationInput,
    ) -> Result<EvaluationResult, ValidationError> {
        Ok(self.prepare(guardrail_id, graph)?.evaluate(input))
    }

    /// Evaluates a request against a stored guardrail document.
    pub fn evaluate_definition(
        &self,
        definition: &GuardrailDefinition,
        input: &EvaluationInput,
    ) -> Result<EvaluationResult, ValidationError> {
        self.evaluate(definition.id.clone(), &definition.graph, input)
    }

    /// Validates the graph once, then evaluates every request against it in parallel.
    /// Results are returned in the order of `inputs`.
    pub fn evaluate_batch(
        &self,
        guardrail_id: impl Into<String>,
        graph: &GuardrailGraph,
        inputs: &[EvaluationInput],
    ) -> Result<Vec<EvaluationResult>, ValidationError> {
        Ok(self.prepare(guardrail_id, graph)?.evaluate_batch(inputs))
    }
}

/// A validated guardrail graph with its blocks decoded and its connections indexed.
pub struct PreparedGuardrail<'a> {
    engine: &'a Engine,
    graph: &'a GuardrailGraph,
    guardrail_id: String,
    specs: Vec<BlockSpec>,
    /// Input blocks in listing order; the traversal starts from these.
    seeds: Vec<usize>,
    /// Outgoing and incoming connection indices per block, in connection listing order.
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    /// `(source, target)` block indices per connection.
    endpoints: Vec<(usize, usize)>,
    actions: AHashMap<&'a str, usize>,
}

impl<'a> PreparedGuardrail<'a> {
    /// Expects a graph that passed validation: unique ids and no dangling connections.
    fn new(engine: &'a Engine, guardrail_id: String, graph: &'a GuardrailGraph) -> Self {
        let mut positions: AHashMap<&'a str, usize> = AHashMap::with_capacity(graph.blocks.len());
        for (index, block) in graph.blocks.iter().enumerate() {
            positions.entry(block.id.as_str()).or_insert(index);
        }

        let specs: Vec<BlockSpec> = graph
            .blocks
            .iter()
            .map(|block| {
                let spec = BlockSpec::decode(block);
                if let Some(template) = spec.unknown_template() {
                    warn!(
                        block_id = %block.id,
                        kind = %block.kind,
                        template,
                        policy = ?engine.config.unknown_template,
                        "unrecognised block template"
                    );
                }
                spec
            })
            .collect();

        let mut outgoing = vec![Vec::new(); graph.blocks.len()];
        let mut incoming = vec![Vec::new(); graph.blocks.len()];
        let mut endpoints = Vec::with_capacity(graph.connections.len());
        for (index, connection) in graph.connections.iter().enumerate() {
            let source = positions.get(connection.source_block_id.as_str()).copied();
            let target = positions.get(connection.target_block_id.as_str()).copied();
            // Validation rejects dangling connections; they are never followed.
            let (Some(source), Some(target)) = (source, target) else {
                endpoints.push((usize::MAX, usize::MAX));
                continue;
            };
            outgoing[source].push(index);
            incoming[target].push(index);
            endpoints.push((source, target));
        }

        let seeds = graph
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind == BlockKind::Input)
            .map(|(index, _)| index)
            .collect();

        let actions = positions
            .iter()
            .filter(|&(_, &index)| graph.blocks[index].kind == BlockKind::Action)
            .map(|(&id, &index)| (id, index))
            .collect();

        Self {
            engine,
            graph,
            guardrail_id,
            specs,
            seeds,
            outgoing,
            incoming,
            endpoints,
            actions,
        }
    }

    pub fn guardrail_id(&self) -> &str {
        &self.guardrail_id
    }

    pub fn graph(&self) -> &GuardrailGraph {
        self.graph
    }

    fn action(&self, block_id: &str) -> Option<&ActionTemplate> {
        self.actions
            .get(block_id)
            .and_then(|&index| self.specs[index].as_action())
    }

    /// Evaluates one request. Always produces a result: collaborator failures are
    /// recorded on the trace and an exhausted budget yields a `block` decision.
    pub fn evaluate(&self, input: &EvaluationInput) -> EvaluationResult {
        let outcome = traversal::traverse(self, input);

        let verdict = match self.engine.config.budget() {
            Some(budget) if outcome.timed_out => Verdict::timed_out(budget),
            _ => resolver::resolve(&outcome.trace, |id| self.action(id)),
        };
        let total_duration: Duration = outcome.trace.iter().map(|e| e.duration).sum();

        info!(
            guardrail_id = %self.guardrail_id,
            decision = %verdict.decision,
            visited = outcome.trace.len(),
            total_us = total_duration.as_micros() as u64,
            "guardrail evaluated"
        );

        EvaluationResult {
            guardrail_id: self.guardrail_id.clone(),
            decision: verdict.decision,
            reason: verdict.reason,
            execution_trace: outcome.trace,
            total_duration,
        }
    }

    /// Evaluates every request in parallel. Each evaluation owns its own traversal state.
    pub fn evaluate_batch(&self, inputs: &[EvaluationInput]) -> Vec<EvaluationResult> {
        inputs.par_iter().map(|input| self.evaluate(input)).collect()
    }
}
