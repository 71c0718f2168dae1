//! Turns an execution trace into one decision.
//!
//! Activated action blocks are inspected in trace order. The first `block`
//! wins outright. A `warn` is remembered but scanning continues, so a `block`
//! that appears later still overrides it; anything else after a `warn` is
//! ignored. An `allow` or `require_approval` reached before any `warn` ends the
//! scan. Non-deciding actions such as `action-log` are skipped. When nothing
//! decides, the request is denied.

use crate::graph::{ActionTemplate, BlockKind};
use crate::trace::{BlockExecutionResult, Decision};
use std::time::Duration;

pub const DEFAULT_DENY_REASON: &str = "no action reached — default deny.";
pub const GENERIC_BLOCK_REASON: &str = "Request blocked";
pub const GENERIC_WARN_REASON: &str = "Warning issued";
pub const APPROVAL_REASON: &str = "Request requires human approval";
pub const ALLOW_REASON: &str = "Request passed all guardrail checks";

/// A decision together with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
}

impl Verdict {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }

    /// The fail-closed verdict used when no action decided.
    pub fn default_deny() -> Self {
        Self::new(Decision::Block, DEFAULT_DENY_REASON)
    }

    /// The fail-closed verdict used when an evaluation ran out of time.
    pub fn timed_out(budget: Duration) -> Self {
        Self::new(
            Decision::Block,
            format!(
                "evaluation exceeded its {}ms budget, request denied",
                budget.as_millis()
            ),
        )
    }
}

/// Resolves the decision for a trace.
///
/// `action_of` maps a block id to the decoded template of that action block;
/// entries it returns `None` for are skipped.
pub fn resolve<'a, F>(trace: &[BlockExecutionResult], action_of: F) -> Verdict
where
    F: Fn(&str) -> Option<&'a ActionTemplate>,
{
    let mut warning: Option<Verdict> = None;

    let activated_actions = trace
        .iter()
        .filter(|e| e.block_kind == BlockKind::Action && e.activated)
        .filter_map(|e| action_of(&e.block_id));

    for action in activated_actions {
        match action {
            ActionTemplate::Block { message } => {
                return Verdict::new(
                    Decision::Block,
                    message.as_deref().unwrap_or(GENERIC_BLOCK_REASON),
                );
            }
            ActionTemplate::Warn { warning: text } => {
                if warning.is_none() {
                    warning = Some(Verdict::new(
                        Decision::Warn,
                        text.as_deref().unwrap_or(GENERIC_WARN_REASON),
                    ));
                }
            }
            ActionTemplate::RequireApproval { .. } if warning.is_none() => {
                return Verdict::new(Decision::RequireApproval, APPROVAL_REASON);
            }
            ActionTemplate::Allow if warning.is_none() => {
                return Verdict::new(Decision::Allow, ALLOW_REASON);
            }
            _ => {}
        }
    }

    warning.unwrap_or_else(Verdict::default_deny)
}
