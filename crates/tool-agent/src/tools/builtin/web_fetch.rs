//! Web fetch tool backed by canned page content
//!
//! No network access: a handful of well-known hosts are served from a static
//! table so agent runs stay deterministic.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::tools::{
    ParameterProperty, ParameterSchema, Tool, ToolArgs, ToolContext, ToolError, ToolResult,
};

const EXTRACT_KINDS: &[&str] = &["title", "summary", "content"];

struct MockPage {
    host: &'static str,
    title: &'static str,
    summary: &'static str,
    content: &'static str,
}

const MOCK_PAGES: &[MockPage] = &[
    MockPage {
        host: "example.com",
        title: "Example Domain",
        summary: "This domain is for use in illustrative examples in documents.",
        content: "Example Domain. This domain is for use in illustrative examples in documents. You may use this domain in literature without prior coordination or asking for permission.",
    },
    MockPage {
        host: "python.org",
        title: "Welcome to Python.org",
        summary: "The official home of the Python Programming Language.",
        content: "Python is a programming language that lets you work quickly and integrate systems more effectively. Python is powerful and fast, plays well with others, runs everywhere, is friendly and easy to learn, and is Open.",
    },
    MockPage {
        host: "github.com",
        title: "GitHub: Let's build from here",
        summary: "GitHub is where over 100 million developers shape the future of software.",
        content: "GitHub is where over 100 million developers shape the future of software, together. Contribute to the open source community, manage your Git repositories, review code like a pro, track bugs and features, power your CI/CD and DevOps workflows, and secure code before you commit it.",
    },
];

/// Tool for fetching (mocked) web content
pub struct WebFetchTool;

impl WebFetchTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebFetchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebFetchTool {
    fn name(&self) -> &str {
        "web_fetch"
    }

    fn description(&self) -> &str {
        "Fetch content from a URL (mocked for learning)"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required(
                "url",
                ParameterProperty::string("URL to fetch (example.com, python.org, github.com)"),
            )
            .with_property(
                "extract",
                ParameterProperty::string("What to extract from the page (default: content)")
                    .with_enum(EXTRACT_KINDS)
                    .with_default(json!("content")),
            )
    }

    #[instrument(skip(self, args, _ctx), fields(url = tracing::field::Empty))]
    async fn execute(&self, args: &ToolArgs, _ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let url = args.require_str("url")?;

        // Record URL in span (truncate for safety)
        tracing::Span::current().record("url", url.chars().take(100).collect::<String>().as_str());

        let extract = args.optional_str("extract")?.unwrap_or("content");
        let host = normalize_url(url);
        debug!(host, extract, "Fetch parameters");

        let page = match MOCK_PAGES.iter().find(|p| p.host == host) {
            Some(p) => p,
            None => {
                warn!(host, "No mock content for host");
                let available: Vec<&str> = MOCK_PAGES.iter().map(|p| p.host).collect();
                return Ok(ToolResult::error(format!(
                    "URL not found in mock data. Available: {}",
                    available.join(", ")
                )));
            }
        };

        let content = match extract {
            "title" => page.title,
            "summary" => page.summary,
            "content" => page.content,
            other => {
                return Ok(ToolResult::error(format!(
                    "Unknown extract type: {}. Use 'title', 'summary', or 'content'.",
                    other
                )))
            }
        };

        Ok(ToolResult::success(json!({
            "url": url,
            "extract_type": extract,
            "content": content,
        })))
    }
}

/// Strip scheme, `www.` and surrounding slashes: `https://www.python.org/` -> `python.org`
fn normalize_url(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let url = url.strip_prefix("www.").unwrap_or(url);
    url.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn fetch(args: Value) -> ToolResult {
        WebFetchTool::new()
            .execute(&ToolArgs::from_value("web_fetch", args), &ToolContext::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://www.python.org/"), "python.org");
        assert_eq!(normalize_url("http://example.com"), "example.com");
        assert_eq!(normalize_url("github.com"), "github.com");
        assert_eq!(normalize_url("https://github.com/rust-lang"), "github.com/rust-lang");
    }

    #[tokio::test]
    async fn test_fetch_title() {
        let result = fetch(json!({"url": "python.org", "extract": "title"})).await;
        let payload = result.payload().unwrap();
        assert!(payload["content"].as_str().unwrap().contains("Python"));
        assert_eq!(payload["extract_type"], "title");
        assert_eq!(payload["url"], "python.org");
    }

    #[tokio::test]
    async fn test_fetch_summary_and_default_content() {
        let summary = fetch(json!({"url": "https://example.com/", "extract": "summary"})).await;
        assert_eq!(
            summary.payload().unwrap()["content"],
            "This domain is for use in illustrative examples in documents."
        );

        let content = fetch(json!({"url": "github.com"})).await;
        assert_eq!(content.payload().unwrap()["extract_type"], "content");
        assert!(content.payload().unwrap()["content"]
            .as_str()
            .unwrap()
            .starts_with("GitHub is where"));
    }

    #[tokio::test]
    async fn test_unknown_url() {
        let result = fetch(json!({"url": "invalid-url.xyz", "extract": "title"})).await;
        assert_eq!(
            result.error_message(),
            Some("URL not found in mock data. Available: example.com, python.org, github.com")
        );
    }

    #[tokio::test]
    async fn test_unknown_extract() {
        let result = fetch(json!({"url": "python.org", "extract": "invalid"})).await;
        assert!(result.error_message().unwrap().starts_with("Unknown extract type: invalid"));
    }
}
