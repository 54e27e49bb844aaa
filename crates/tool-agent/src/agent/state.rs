//! Agent state management

use serde_json::Value;

use crate::tools::ToolResult;

use super::prompt::{Transcript, TranscriptEntry};

/// Default iteration ceiling for a run
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum iterations before stopping
    pub max_iterations: usize,
    /// Whether to print the intermediate trace
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: true,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Compact JSON with object keys sorted at every level
///
/// Relies on `serde_json::Map` being ordered by key (`preserve_order` off).
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}

/// Identity of a tool call: name plus canonical arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    tool: String,
    arguments: String,
}

impl Fingerprint {
    pub fn new(tool: &str, arguments: &Value) -> Self {
        Self {
            tool: tool.to_string(),
            arguments: canonical_json(arguments),
        }
    }
}

/// Remembers the last executed call to catch immediate repeats
///
/// A repeat is skipped once and the memory cleared, so a third identical
/// call is treated as new.
#[derive(Debug, Default)]
pub struct RepetitionGuard {
    last: Option<Fingerprint>,
}

impl RepetitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True (and memory cleared) if `fingerprint` equals the last recorded call
    pub fn check_repeat(&mut self, fingerprint: &Fingerprint) -> bool {
        if self.last.as_ref() == Some(fingerprint) {
            self.last = None;
            true
        } else {
            false
        }
    }

    pub fn record(&mut self, fingerprint: Fingerprint) {
        self.last = Some(fingerprint);
    }
}

/// A tool call that was actually executed
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub tool: String,
    pub arguments: Value,
    pub result: ToolResult,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Answered,
    Refused,
    BudgetExhausted,
    GenerationFailed,
}

/// Result of a run: the answer text plus diagnostics
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub termination: Termination,
    /// Rounds consumed
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// State of one question-answering run
#[derive(Debug)]
pub struct ConversationState {
    /// Prompt log sent to the model each round
    pub transcript: Transcript,
    /// Current iteration
    pub iteration: usize,
    /// Memory of the last executed call
    pub repetition: RepetitionGuard,
    /// Executed tool calls, in order
    pub tool_calls: Vec<ToolCallRecord>,
}

impl ConversationState {
    pub fn new(initial_prompt: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(initial_prompt),
            iteration: 0,
            repetition: RepetitionGuard::new(),
            tool_calls: Vec::new(),
        }
    }

    pub fn increment_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Consume the state into an outcome
    pub fn finish(self, answer: impl Into<String>, termination: Termination) -> AgentOutcome {
        AgentOutcome {
            answer: answer.into(),
            termination,
            iterations: self.iteration,
            tool_calls: self.tool_calls,
        }
    }

    /// Record an executed call and append it to the transcript
    pub fn record_tool_call(&mut self, tool: String, arguments: Value, result: ToolResult) {
        self.transcript.push(TranscriptEntry::ToolExchange {
            tool: tool.clone(),
            arguments: arguments.clone(),
            result: result.clone(),
        });
        self.tool_calls.push(ToolCallRecord {
            tool,
            arguments,
            result,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_config_builder() {
        let config = AgentConfig::new().with_max_iterations(10).with_verbose(false);
        assert_eq!(config.max_iterations, 10);
        assert!(!config.verbose);

        let default = AgentConfig::default();
        assert_eq!(default.max_iterations, 5);
        assert!(default.verbose);
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "y": [ {"d": 1, "c": 2} ]}, "a": "x"});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":"x","b":{"y":[{"c":2,"d":1}],"z":1}}"#
        );
    }

    #[test]
    fn test_canonical_json_escapes_keys() {
        let value = json!({"quo\"te": 1});
        assert_eq!(canonical_json(&value), r#"{"quo\"te":1}"#);
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a = Fingerprint::new("calculator", &json!({"operation": "add", "a": 1, "b": 2}));
        let b = Fingerprint::new("calculator", &json!({"b": 2, "a": 1, "operation": "add"}));
        assert_eq!(a, b);

        let c = Fingerprint::new("calculator", &json!({"operation": "add", "a": 1, "b": 3}));
        assert_ne!(a, c);
        assert_ne!(a, Fingerprint::new("other", &json!({"operation": "add", "a": 1, "b": 2})));
    }

    #[test]
    fn test_repetition_guard_skips_once() {
        let mut guard = RepetitionGuard::new();
        let fp = Fingerprint::new("search_docs", &json!({"query": "rust"}));

        // First call is fresh
        assert!(!guard.check_repeat(&fp));
        guard.record(fp.clone());

        // Second identical call is a repeat and clears memory
        assert!(guard.check_repeat(&fp));

        // Third identical call is fresh again
        assert!(!guard.check_repeat(&fp));
    }

    #[test]
    fn test_repetition_guard_different_call_not_repeat() {
        let mut guard = RepetitionGuard::new();
        let rust = Fingerprint::new("search_docs", &json!({"query": "rust"}));
        guard.record(rust.clone());
        assert!(!guard.check_repeat(&Fingerprint::new("search_docs", &json!({"query": "go"}))));
        // A non-matching check leaves the memory intact
        assert!(guard.check_repeat(&rust));
    }

    #[test]
    fn test_conversation_state_records_calls() {
        let mut state = ConversationState::new("prompt");
        assert_eq!(state.iteration, 0);
        state.increment_iteration();
        assert_eq!(state.iteration, 1);

        state.record_tool_call(
            "calculator".to_string(),
            json!({"a": 1}),
            ToolResult::success(json!({"result": 1})),
        );
        assert_eq!(state.tool_calls.len(), 1);
        assert_eq!(state.transcript.entries().len(), 1);
        assert!(state.transcript.render().contains("Tool: calculator"));
    }
}
