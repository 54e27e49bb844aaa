//! Tool registry for managing available tools

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{Tool, ToolArgs, ToolContext, ToolDescriptor, ToolError, ToolResult};

/// Registry of available tools
///
/// Built once at startup and shared read-only; descriptors keep
/// registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names are unique
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered(name));
        }

        self.descriptors.push(tool.to_descriptor());
        self.tools.push(Arc::new(tool));
        self.index.insert(name, self.tools.len() - 1);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// List all registered tool names in registration order
    pub fn list_names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Tool descriptors in registration order
    pub fn list_schemas(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    ///
    /// Never fails: unknown tools, invalid arguments, tool errors and panics
    /// all come back as [`ToolResult::Failure`].
    #[instrument(skip(self, name, arguments, ctx), fields(tool = %name))]
    pub async fn execute(&self, name: &str, arguments: &Value, ctx: &ToolContext) -> ToolResult {
        match self.try_execute(name, arguments, ctx).await {
            Ok(result) => {
                match &result {
                    ToolResult::Success(_) => info!("Tool executed successfully"),
                    ToolResult::Failure(e) => warn!(error = %e, "Tool reported failure"),
                }
                result
            }
            Err(e) => {
                warn!(error = %e, "Tool execution error");
                e.into()
            }
        }
    }

    async fn try_execute(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let (tool, descriptor) = match self.index.get(name) {
            Some(&i) => (Arc::clone(&self.tools[i]), &self.descriptors[i]),
            None => {
                return Err(ToolError::NotFound {
                    name: name.to_string(),
                    available: self.list_names().join(", "),
                })
            }
        };

        let values = descriptor
            .parameters
            .validate(arguments)
            .map_err(|reason| ToolError::InvalidArguments {
                tool: name.to_string(),
                reason,
            })?;

        debug!(args = %arguments, "Dispatching tool");
        let args = ToolArgs::new(name, values.clone());

        match AssertUnwindSafe(tool.execute(&args, ctx)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool panicked".to_string());
                Err(ToolError::Execution(msg))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_names())
            .finish()
    }
}
