//! Agent framework for question answering with tools
//!
//! Implements a generate-interpret-act loop: the model answers in JSON,
//! tool calls are executed through the registry and their results are fed
//! back until the model is done, refuses, or the iteration budget runs out.

mod agent_loop;
mod prompt;
mod response;
mod state;

pub use agent_loop::AgentLoop;
pub use prompt::{build_initial_prompt, Transcript, TranscriptEntry};
pub use response::AgentResponse;
pub use state::{
    canonical_json, AgentConfig, AgentOutcome, Termination, ToolCallRecord, DEFAULT_MAX_ITERATIONS,
};
