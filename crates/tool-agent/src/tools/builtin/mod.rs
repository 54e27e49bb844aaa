//! Built-in tools for the agent framework

mod calculator;
mod search_docs;
mod web_fetch;

pub use calculator::CalculatorTool;
pub use search_docs::SearchDocsTool;
pub use web_fetch::WebFetchTool;

use super::registry::ToolRegistry;
use super::ToolError;

/// Create a registry with all default tools
pub fn create_default_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();

    registry.register(CalculatorTool)?;
    registry.register(SearchDocsTool)?;
    registry.register(WebFetchTool::new())?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolContext;
    use serde_json::json;

    #[test]
    fn test_default_registry_order() {
        let registry = create_default_registry().unwrap();
        assert_eq!(registry.list_names(), vec!["calculator", "search_docs", "web_fetch"]);
    }

    #[tokio::test]
    async fn test_execute_calculator_through_registry() {
        let registry = create_default_registry().unwrap();
        let ctx = ToolContext::default();

        let result = registry
            .execute("calculator", &json!({"operation": "add", "a": 5, "b": 3}), &ctx)
            .await;
        assert_eq!(result.payload().unwrap()["result"], 8);

        let result = registry
            .execute("calculator", &json!({"operation": "divide", "a": 10, "b": 0}), &ctx)
            .await;
        assert!(result.error_message().unwrap().to_lowercase().contains("divide by zero"));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_calculator_arguments() {
        let registry = create_default_registry().unwrap();
        let ctx = ToolContext::default();

        let result = registry
            .execute("calculator", &json!({"operation": "add"}), &ctx)
            .await;
        assert!(!result.is_success());

        let result = registry
            .execute("calculator", &json!({"operation": "power", "a": 2, "b": 3}), &ctx)
            .await;
        assert!(result.error_message().unwrap().contains("must be one of"));
    }
}
