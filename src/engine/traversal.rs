use super::PreparedGuardrail;
use super::block::BlockEvaluator;
use crate::graph::{BlockKind, HANDLE_FALSE, HANDLE_TRUE};
use crate::input::EvaluationInput;
use crate::trace::BlockExecutionResult;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The trace accumulated by one traversal, and whether it was cut short by the budget.
pub(super) struct TraversalOutcome {
    pub trace: Vec<BlockExecutionResult>,
    pub timed_out: bool,
}

/// Worklist state of a single breadth-first traversal. Owned by one evaluation call.
struct Worklist<'p, 'a> {
    prepared: &'p PreparedGuardrail<'a>,
    queue: VecDeque<usize>,
    visited: Vec<bool>,
    /// Activation of each visited block, indexed like the graph's blocks.
    activated: Vec<Option<bool>>,
    /// Whether each connection was followed, indexed like the graph's connections.
    fired: Vec<bool>,
    trace: Vec<BlockExecutionResult>,
}

impl<'p, 'a> Worklist<'p, 'a> {
    fn seeded(prepared: &'p PreparedGuardrail<'a>) -> Self {
        let block_count = prepared.graph.blocks.len();
        Self {
            prepared,
            queue: prepared.seeds.iter().copied().collect(),
            visited: vec![false; block_count],
            activated: vec![None; block_count],
            fired: vec![false; prepared.graph.connections.len()],
            trace: Vec::with_capacity(block_count),
        }
    }

    /// Pops queued blocks until one that has not been visited yet comes up.
    fn next_unvisited(&mut self) -> Option<usize> {
        while let Some(index) = self.queue.pop_front() {
            if !self.visited[index] {
                return Some(index);
            }
        }
        None
    }

    /// The boolean signal carried by each connection into `index`, in connection order.
    ///
    /// A connection that was not followed carries `false`. A followed connection
    /// out of a branching block carries `true`, since its handle already encodes
    /// the polarity. Any other followed connection carries its source's activation.
    fn signals_into(&self, index: usize) -> Vec<bool> {
        self.prepared.incoming[index]
            .iter()
            .map(|&connection| {
                if !self.fired[connection] {
                    return false;
                }
                let (source, _) = self.prepared.endpoints[connection];
                self.prepared.graph.blocks[source].kind.is_branching()
                    || self.activated[source].unwrap_or(false)
            })
            .collect()
    }

    /// Records a visited block and enqueues the targets of its eligible outgoing connections.
    fn record(&mut self, index: usize, entry: BlockExecutionResult) {
        let prepared = self.prepared;
        let activated = entry.activated;
        self.visited[index] = true;
        self.activated[index] = Some(activated);
        self.trace.push(entry);

        let block = &prepared.graph.blocks[index];
        let taken_handle = if activated {
            HANDLE_TRUE
        } else {
            HANDLE_FALSE
        };

        for &connection in &prepared.outgoing[index] {
            let eligible = !block.kind.is_branching()
                || prepared.graph.connections[connection].source_handle == taken_handle;
            if !eligible {
                continue;
            }
            self.fired[connection] = true;
            let (_, target) = prepared.endpoints[connection];
            if !self.visited[target] {
                self.queue.push_back(target);
            }
        }
    }
}

/// Wall-clock budget of one traversal.
struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn exceeded(&self) -> bool {
        self.budget
            .is_some_and(|budget| self.started.elapsed() >= budget)
    }

    /// Time left for the next block, `None` when unbounded.
    fn remaining(&self) -> Option<Duration> {
        self.budget
            .map(|budget| budget.saturating_sub(self.started.elapsed()))
    }
}

/// Walks the graph breadth-first from its input blocks, evaluating each reachable block once.
///
/// The budget is checked before and after every block, so a block that overruns it
/// ends the traversal even when it was the last one queued.
pub(super) fn traverse(prepared: &PreparedGuardrail<'_>, input: &EvaluationInput) -> TraversalOutcome {
    let deadline = Deadline::start(prepared.engine.config.budget());
    let mut worklist = Worklist::seeded(prepared);

    while let Some(index) = worklist.next_unvisited() {
        if deadline.exceeded() {
            return exhausted(prepared, &deadline, worklist.trace);
        }

        let block = &prepared.graph.blocks[index];
        let signals = if block.kind == BlockKind::Logic {
            worklist.signals_into(index)
        } else {
            Vec::new()
        };

        let clock = Instant::now();
        let outcome = BlockEvaluator::new(prepared.engine, input, deadline.remaining()).evaluate(
            block,
            &prepared.specs[index],
            &signals,
        );
        let duration = clock.elapsed();

        debug!(
            block_id = %block.id,
            kind = %block.kind,
            activated = outcome.activated,
            "block evaluated"
        );

        let entry = BlockExecutionResult {
            block_id: block.id.clone(),
            block_kind: block.kind,
            result: outcome.result,
            activated: outcome.activated,
            duration,
        };
        worklist.record(index, entry);

        if deadline.exceeded() {
            return exhausted(prepared, &deadline, worklist.trace);
        }
    }

    TraversalOutcome {
        trace: worklist.trace,
        timed_out: false,
    }
}

fn exhausted(
    prepared: &PreparedGuardrail<'_>,
    deadline: &Deadline,
    trace: Vec<BlockExecutionResult>,
) -> TraversalOutcome {
    warn!(
        guardrail_id = %prepared.guardrail_id,
        budget_ms = deadline.budget.map_or(0, |b| b.as_millis() as u64),
        visited = trace.len(),
        "evaluation budget exhausted"
    );
    TraversalOutcome {
        trace,
        timed_out: true,
    }
}
