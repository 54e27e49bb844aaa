//! Tool error taxonomy

use thiserror::Error;

/// Errors raised while looking up or running a tool
///
/// The registry never lets these escape; each one is rendered into a failed
/// [`super::ToolResult`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{name}' not found. Available tools: {available}")]
    NotFound { name: String, available: String },

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Execution(format!("{:#}", err))
    }
}
