//! Agent loop implementation

use std::sync::Arc;

use llm_core::{GenerateOptions, Generator};
use tracing::{debug, info, instrument, warn};

use crate::tools::registry::ToolRegistry;
use crate::tools::{ToolContext, ToolResult};

use super::prompt::{build_initial_prompt, TranscriptEntry};
use super::response::AgentResponse;
use super::state::{AgentConfig, AgentOutcome, ConversationState, Fingerprint, Termination};

// ANSI colors
const GREEN: &str = "\x1b[92m";
const BLUE: &str = "\x1b[94m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Characters of each model response shown in the trace
const RESPONSE_PREVIEW_CHARS: usize = 200;

/// The agent loop orchestrator
pub struct AgentLoop {
    generator: Arc<dyn Generator>,
    registry: Arc<ToolRegistry>,
    tool_ctx: ToolContext,
    config: AgentConfig,
}

impl AgentLoop {
    /// Create a new agent loop
    pub fn new(
        generator: Arc<dyn Generator>,
        registry: Arc<ToolRegistry>,
        tool_ctx: ToolContext,
        config: AgentConfig,
    ) -> Self {
        Self {
            generator,
            registry,
            tool_ctx,
            config,
        }
    }

    /// Answer a question, calling tools as the model requests
    ///
    /// Never fails: generation faults and budget exhaustion are reported
    /// through the outcome's answer text.
    #[instrument(skip(self, question), fields(max_iterations = self.config.max_iterations))]
    pub async fn run(&self, question: &str) -> AgentOutcome {
        info!(question_len = question.len(), tools = self.registry.len(), "Starting agent loop");
        self.trace_banner(question);

        let prompt = build_initial_prompt(self.registry.list_schemas(), question);
        let mut state = ConversationState::new(prompt);
        let options = GenerateOptions::structured();

        while state.iteration < self.config.max_iterations {
            state.increment_iteration();
            debug!(
                iteration = state.iteration,
                entries = state.transcript.entries().len(),
                "Starting iteration"
            );
            if self.config.verbose {
                println!("\n{}--- Iteration {} ---{}", DIM, state.iteration, RESET);
            }

            let raw = match self
                .generator
                .generate(&state.transcript.render(), &options)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, iteration = state.iteration, "Generation failed");
                    if self.config.verbose {
                        println!("{}[Error]{} {}", YELLOW, RESET, e);
                    }
                    return state.finish(format!("Error: {}", e), Termination::GenerationFailed);
                }
            };

            if self.config.verbose {
                println!("{}LLM Response:{} {}...", BLUE, RESET, preview(&raw));
            }

            match AgentResponse::interpret(&raw) {
                AgentResponse::Malformed => {
                    debug!(response_len = raw.len(), "Response was not a JSON object");
                    if self.config.verbose {
                        println!("{}[Error]{} Invalid JSON response, retrying...", YELLOW, RESET);
                    }
                    state.transcript.push(TranscriptEntry::MalformedResponse);
                }
                AgentResponse::Done { answer } => {
                    info!(
                        iterations = state.iteration,
                        tool_calls = state.tool_calls.len(),
                        "Agent completed task"
                    );
                    if self.config.verbose {
                        println!("\n{}[Done]{} {}", GREEN, RESET, answer);
                    }
                    return state.finish(answer, Termination::Answered);
                }
                AgentResponse::Refuse { reason } => {
                    info!(iterations = state.iteration, reason = %reason, "Agent refused task");
                    if self.config.verbose {
                        println!("\n{}[Refused]{} {}", YELLOW, RESET, reason);
                    }
                    return state.finish(
                        format!("I cannot complete this task: {}", reason),
                        Termination::Refused,
                    );
                }
                AgentResponse::ToolCall { name: None, .. } => {
                    debug!("Response named no tool");
                    if self.config.verbose {
                        println!("{}[Error]{} No tool specified", YELLOW, RESET);
                    }
                    state.transcript.push(TranscriptEntry::MissingTool);
                }
                AgentResponse::ToolCall {
                    name: Some(name),
                    arguments,
                } => {
                    let fingerprint = Fingerprint::new(&name, &arguments);
                    if state.repetition.check_repeat(&fingerprint) {
                        warn!(tool = %name, "Repeated tool call, forcing completion");
                        if self.config.verbose {
                            println!(
                                "\n{}[Warning]{} Repeated tool call detected. Forcing completion.",
                                YELLOW, RESET
                            );
                        }
                        state.transcript.push(TranscriptEntry::RepeatedCall);
                        continue;
                    }

                    if self.config.verbose {
                        println!("\n{}[Tool Call]{} {}({})", CYAN, RESET, name, arguments);
                    }

                    let result = self.registry.execute(&name, &arguments, &self.tool_ctx).await;
                    debug!(tool = %name, success = result.is_success(), "Tool call finished");
                    self.trace_result(&result);

                    state.repetition.record(fingerprint);
                    state.record_tool_call(name, arguments, result);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            tool_calls = state.tool_calls.len(),
            "Agent reached maximum iterations"
        );
        if self.config.verbose {
            println!(
                "\n{}[Max Iterations]{} Reached {} iterations",
                YELLOW, RESET, self.config.max_iterations
            );
        }

        let answer = format!(
            "Could not complete task within {} iterations. Tool calls made: {}",
            self.config.max_iterations,
            state.tool_calls.len()
        );
        state.finish(answer, Termination::BudgetExhausted)
    }

    fn trace_banner(&self, question: &str) {
        if !self.config.verbose {
            return;
        }
        let rule = "=".repeat(80);
        println!("{}", rule);
        println!("TOOL-USING AGENT");
        println!("{}", rule);
        println!("\nQuestion: {}\n", question);
    }

    fn trace_result(&self, result: &ToolResult) {
        if !self.config.verbose {
            return;
        }
        let rendered = serde_json::to_string_pretty(&result.to_json()).unwrap_or_default();
        let color = if result.is_success() { GREEN } else { YELLOW };
        println!("{}[Tool Result]{} {}", color, RESET, rendered);
    }
}

fn preview(text: &str) -> String {
    text.chars().take(RESPONSE_PREVIEW_CHARS).collect()
}
