//! Arithmetic tool

use async_trait::async_trait;
use serde_json::{json, Number, Value};
use tracing::{debug, instrument};

use crate::tools::{
    ParameterProperty, ParameterSchema, Tool, ToolArgs, ToolContext, ToolError, ToolResult,
};

const OPERATIONS: &[&str] = &["add", "subtract", "multiply", "divide"];

/// Tool for basic arithmetic on two numbers
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Performs basic arithmetic operations (add, subtract, multiply, divide)"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required(
                "operation",
                ParameterProperty::string("The arithmetic operation to perform").with_enum(OPERATIONS),
            )
            .with_required("a", ParameterProperty::number("First number"))
            .with_required("b", ParameterProperty::number("Second number"))
    }

    #[instrument(skip(self, args, _ctx))]
    async fn execute(&self, args: &ToolArgs, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let operation = args.require_str("operation")?;
        let a = args.require_number("a")?;
        let b = args.require_number("b")?;

        debug!(operation, %a, %b, "Calculator parameters");

        let result = match calculate(operation, a, b) {
            Ok(n) => n,
            Err(msg) => return Ok(ToolResult::error(msg)),
        };

        Ok(ToolResult::success(json!({
            "result": result,
            "operation": operation,
            "inputs": { "a": a, "b": b },
        })))
    }
}

/// Integer operands stay integers for add/subtract/multiply; division and
/// anything that overflows `i64` is computed in floating point.
fn calculate(operation: &str, a: &Number, b: &Number) -> Result<Value, String> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let exact = match operation {
            "add" => x.checked_add(y),
            "subtract" => x.checked_sub(y),
            "multiply" => x.checked_mul(y),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::from(n));
        }
    }

    let (x, y) = match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err("Operands must be finite numbers".to_string()),
    };

    let value = match operation {
        "add" => x + y,
        "subtract" => x - y,
        "multiply" => x * y,
        "divide" => {
            if y == 0.0 {
                return Err("Cannot divide by zero".to_string());
            }
            x / y
        }
        other => return Err(format!("Unknown operation: {}", other)),
    };

    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| format!("Result of {} is not a finite number", operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(args: Value) -> ToolResult {
        CalculatorTool
            .execute(&ToolArgs::from_value("calculator", args), &ToolContext::default())
            .await
            .unwrap()
    }

    fn result_of(result: &ToolResult) -> &Value {
        &result.payload().expect("expected success")["result"]
    }

    #[tokio::test]
    async fn test_integer_arithmetic() {
        assert_eq!(result_of(&run(json!({"operation": "add", "a": 5, "b": 3})).await), &json!(8));
        assert_eq!(result_of(&run(json!({"operation": "subtract", "a": 10, "b": 4})).await), &json!(6));
        assert_eq!(result_of(&run(json!({"operation": "multiply", "a": 7, "b": 8})).await), &json!(56));
        assert_eq!(result_of(&run(json!({"operation": "multiply", "a": 15, "b": 7})).await), &json!(105));
    }

    #[tokio::test]
    async fn test_division_is_float() {
        let result = run(json!({"operation": "divide", "a": 20, "b": 4})).await;
        assert_eq!(result_of(&result).as_f64(), Some(5.0));
        assert!(result_of(&result).is_f64());
    }

    #[tokio::test]
    async fn test_float_operands() {
        let result = run(json!({"operation": "add", "a": 0.5, "b": 0.25})).await;
        assert_eq!(result_of(&result).as_f64(), Some(0.75));
    }

    #[tokio::test]
    async fn test_overflow_falls_back_to_float() {
        let result = run(json!({"operation": "multiply", "a": i64::MAX, "b": 2})).await;
        assert!(result_of(&result).is_f64());
    }

    #[tokio::test]
    async fn test_divide_by_zero() {
        let result = run(json!({"operation": "divide", "a": 10, "b": 0})).await;
        assert!(!result.is_success());
        assert!(result.error_message().unwrap().to_lowercase().contains("divide by zero"));
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let result = run(json!({"operation": "power", "a": 2, "b": 3})).await;
        assert_eq!(result.error_message(), Some("Unknown operation: power"));
    }

    #[tokio::test]
    async fn test_payload_echoes_inputs() {
        let result = run(json!({"operation": "add", "a": 1, "b": 2})).await;
        let payload = result.payload().unwrap();
        assert_eq!(payload["operation"], "add");
        assert_eq!(payload["inputs"], json!({"a": 1, "b": 2}));
    }

    #[tokio::test]
    async fn test_missing_operand() {
        let err = CalculatorTool
            .execute(
                &ToolArgs::from_value("calculator", json!({"operation": "add"})),
                &ToolContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
