//! Interpretation of raw model output

use serde_json::{Map, Value};

const DEFAULT_ANSWER: &str = "Task completed.";
const DEFAULT_REASON: &str = "Tool not appropriate";

/// What the model asked for in one response
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    /// Invoke a tool; `name` is `None` when no directive was given
    ToolCall {
        name: Option<String>,
        arguments: Value,
    },
    /// Final answer
    Done { answer: String },
    /// The model declined the task
    Refuse { reason: String },
    /// Output was not a JSON object
    Malformed,
}

impl AgentResponse {
    /// Classify raw model text
    ///
    /// The text is parsed strictly first; failing that, the span from the
    /// first `{` to the last `}` is parsed. `done` outranks `refuse`, which
    /// outranks `tool`.
    pub fn interpret(raw: &str) -> Self {
        match extract_object(raw) {
            Some(object) => Self::classify(&object),
            None => Self::Malformed,
        }
    }

    fn classify(object: &Map<String, Value>) -> Self {
        if object.get("done").is_some_and(is_truthy) {
            return Self::Done {
                answer: text_field(object, "answer").unwrap_or_else(|| DEFAULT_ANSWER.to_string()),
            };
        }

        if object.get("refuse").is_some_and(is_truthy) {
            return Self::Refuse {
                reason: text_field(object, "reason").unwrap_or_else(|| DEFAULT_REASON.to_string()),
            };
        }

        let name = object
            .get("tool")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let arguments = match object.get("arguments") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v) => v.clone(),
        };

        Self::ToolCall { name, arguments }
    }
}

fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Some(map);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// JSON truthiness: false, null, 0, "" and empty containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call() {
        let response = AgentResponse::interpret(
            r#"{"tool": "calculator", "arguments": {"operation": "multiply", "a": 15, "b": 7}}"#,
        );
        assert_eq!(
            response,
            AgentResponse::ToolCall {
                name: Some("calculator".to_string()),
                arguments: json!({"operation": "multiply", "a": 15, "b": 7}),
            }
        );
    }

    #[test]
    fn test_wrapped_in_prose_matches_bare() {
        let bare = r#"{"tool": "web_fetch", "arguments": {"url": "python.org"}}"#;
        let wrapped = format!("Sure! Here is my call:\n```json\n{}\n```\nHope that helps.", bare);
        assert_eq!(AgentResponse::interpret(bare), AgentResponse::interpret(&wrapped));
    }

    #[test]
    fn test_done_outranks_tool() {
        let response = AgentResponse::interpret(
            r#"{"done": true, "answer": "105", "tool": "calculator", "arguments": {}}"#,
        );
        assert_eq!(response, AgentResponse::Done { answer: "105".to_string() });
    }

    #[test]
    fn test_done_outranks_refuse() {
        let response = AgentResponse::interpret(r#"{"done": true, "refuse": true}"#);
        assert_eq!(response, AgentResponse::Done { answer: "Task completed.".to_string() });
    }

    #[test]
    fn test_refuse_default_reason() {
        assert_eq!(
            AgentResponse::interpret(r#"{"refuse": true}"#),
            AgentResponse::Refuse { reason: "Tool not appropriate".to_string() }
        );
        assert_eq!(
            AgentResponse::interpret(r#"{"refuse": 1, "reason": "out of scope"}"#),
            AgentResponse::Refuse { reason: "out of scope".to_string() }
        );
    }

    #[test]
    fn test_non_string_answer_rendered_as_json() {
        assert_eq!(
            AgentResponse::interpret(r#"{"done": true, "answer": 105}"#),
            AgentResponse::Done { answer: "105".to_string() }
        );
        assert_eq!(
            AgentResponse::interpret(r#"{"done": true, "answer": null}"#),
            AgentResponse::Done { answer: "Task completed.".to_string() }
        );
    }

    #[test]
    fn test_falsy_done_falls_through() {
        let response = AgentResponse::interpret(r#"{"done": false, "tool": "calculator"}"#);
        assert_eq!(
            response,
            AgentResponse::ToolCall {
                name: Some("calculator".to_string()),
                arguments: json!({}),
            }
        );
    }

    #[test]
    fn test_missing_tool_name() {
        for raw in [r#"{"answer": "42"}"#, r#"{"tool": ""}"#, r#"{"tool": 7}"#] {
            match AgentResponse::interpret(raw) {
                AgentResponse::ToolCall { name, .. } => assert!(name.is_none(), "{}", raw),
                other => panic!("unexpected {:?} for {}", other, raw),
            }
        }
    }

    #[test]
    fn test_malformed() {
        assert_eq!(AgentResponse::interpret("I think the answer is 105"), AgentResponse::Malformed);
        assert_eq!(AgentResponse::interpret("{not json}"), AgentResponse::Malformed);
        assert_eq!(AgentResponse::interpret("} backwards {"), AgentResponse::Malformed);
        assert_eq!(AgentResponse::interpret("[1, 2, 3]"), AgentResponse::Malformed);
        assert_eq!(AgentResponse::interpret(""), AgentResponse::Malformed);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([0])));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&Value::Null));
    }
}
