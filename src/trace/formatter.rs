use super::{BlockExecutionResult, EvaluationResult, Value};
use std::time::Duration;

/// Formats evaluation results into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format a whole evaluation result: the decision, its reason and the numbered trace.
    pub fn format_result(result: &EvaluationResult) -> String {
        let mut out = format!(
            "Decision: {}\nReason: {}\n",
            result.decision.as_str().to_uppercase(),
            result.reason
        );
        if result.execution_trace.is_empty() {
            out.push_str("No blocks were visited.\n");
        } else {
            out.push_str(&Self::format_trace(&result.execution_trace));
        }
        out.push_str(&format!(
            "Total: {}",
            Self::format_duration(result.total_duration)
        ));
        out
    }

    /// Format the execution trace as one numbered line per visited block.
    pub fn format_trace(trace: &[BlockExecutionResult]) -> String {
        trace
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:>3}. {}\n", i + 1, Self::format_entry(entry)))
            .collect()
    }

    /// Format a single trace entry, e.g. `[condition] block-2 -> true (activated, 4µs)`.
    pub fn format_entry(entry: &BlockExecutionResult) -> String {
        let state = if entry.activated {
            "activated"
        } else {
            "not activated"
        };
        format!(
            "[{}] {} -> {} ({}, {})",
            entry.block_kind,
            entry.block_id,
            Self::format_value(&entry.result),
            state,
            Self::format_duration(entry.duration)
        )
    }

    /// Format a value for display, shortening long texts.
    fn format_value(value: &Value) -> String {
        const MAX_CHARS: usize = 48;
        match value {
            Value::Text(s) if s.chars().count() > MAX_CHARS => {
                let head: String = s.chars().take(MAX_CHARS).collect();
                format!("\"{}...\"", head)
            }
            other => other.to_string(),
        }
    }

    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();
        if micros >= 1_000 {
            format!("{:.2}ms", duration.as_secs_f64() * 1_000.0)
        } else {
            format!("{}µs", micros)
        }
    }
}
