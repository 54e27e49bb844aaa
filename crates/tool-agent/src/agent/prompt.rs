//! Prompt templates and the conversation transcript
//!
//! The transcript is an append-only log of structured entries; it is only
//! rendered to text when a prompt is sent to the model.

use serde_json::Value;

use crate::tools::{ToolDescriptor, ToolResult};

use super::state::canonical_json;

/// Build the initial prompt: instructions, tool catalog and the question
pub fn build_initial_prompt(tools: &[ToolDescriptor], question: &str) -> String {
    let tools_json = serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are a helpful assistant with access to tools. Your job is to answer the user's question by using the appropriate tools.

Available tools:
{tools_json}

CRITICAL RULES:
1. To use a tool, respond with ONLY this JSON:
   {{"tool": "tool_name", "arguments": {{"param": "value"}}}}

2. After you receive a tool result, you MUST respond with ONLY this JSON:
   {{"done": true, "answer": "your final answer using the tool result"}}

3. If a tool is not appropriate, respond with ONLY this JSON:
   {{"refuse": true, "reason": "explanation"}}

4. NEVER make up tool results - always wait for actual tool execution
5. ALWAYS finish after getting a tool result - do not call the same tool twice

User question: {question}

Respond with JSON only:"#
    )
}

/// One appended segment of the conversation
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    /// The model's output could not be parsed as a JSON object
    MalformedResponse,
    /// The model answered with neither a tool name nor a completion signal
    MissingTool,
    /// The model repeated its previous call verbatim; completion is forced
    RepeatedCall,
    /// A tool was executed
    ToolExchange {
        tool: String,
        arguments: Value,
        result: ToolResult,
    },
}

impl TranscriptEntry {
    pub fn render(&self) -> String {
        match self {
            Self::MalformedResponse => "Error: Your response was not valid JSON. Please respond with valid JSON matching the format specified.".to_string(),
            Self::MissingTool => "Error: You must specify a tool name or set 'done': true.".to_string(),
            Self::RepeatedCall => r#"You just called the same tool with the same arguments. You MUST now respond with: {"done": true, "answer": "your final answer using the results you have"}"#.to_string(),
            Self::ToolExchange {
                tool,
                arguments,
                result,
            } => {
                let instruction = if result.is_success() {
                    r#"Now decide: Is the user's question fully answered? If yes, respond with {"done": true, "answer": "..."}. If you need another tool to complete the task, call it now."#
                } else {
                    r#"The tool returned an error. Respond with: {"done": true, "answer": "explain the error to the user"}"#
                };
                format!(
                    "Tool: {}\nArguments: {}\nResult: {}\n\n{}",
                    tool,
                    canonical_json(arguments),
                    canonical_json(&result.to_json()),
                    instruction
                )
            }
        }
    }
}

/// Append-only conversation log behind the cumulative prompt
#[derive(Debug, Clone)]
pub struct Transcript {
    preamble: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Full prompt text: the preamble followed by every entry
    pub fn render(&self) -> String {
        let mut prompt = self.preamble.clone();
        for entry in &self.entries {
            prompt.push_str("\n\n");
            prompt.push_str(&entry.render());
        }
        prompt
    }
}
