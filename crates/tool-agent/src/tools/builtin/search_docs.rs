//! Keyword search over the local document corpus

use anyhow::Context;
use async_trait::async_trait;
use regex::RegexBuilder;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::tools::{
    ParameterProperty, ParameterSchema, Tool, ToolArgs, ToolContext, ToolError, ToolResult,
};

const DEFAULT_MAX_RESULTS: u64 = 3;
/// Characters of context kept before / after the first match
const SNIPPET_BEFORE: usize = 50;
const SNIPPET_AFTER: usize = 150;

/// Tool for searching the documents directory
pub struct SearchDocsTool;

#[derive(Debug, Serialize)]
struct DocumentHit {
    filename: String,
    snippet: String,
    relevance: usize,
}

#[async_trait]
impl Tool for SearchDocsTool {
    fn name(&self) -> &str {
        "search_docs"
    }

    fn description(&self) -> &str {
        "Search through local documents for information"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required("query", ParameterProperty::string("Search query string"))
            .with_property(
                "max_results",
                ParameterProperty::integer("Maximum number of results to return (default: 3)")
                    .with_default(json!(DEFAULT_MAX_RESULTS)),
            )
    }

    #[instrument(skip(self, args, ctx), fields(query = tracing::field::Empty))]
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let query = args.require_str("query")?;
        tracing::Span::current().record("query", query.chars().take(50).collect::<String>().as_str());

        let max_results = args
            .optional_u64("max_results")?
            .unwrap_or(DEFAULT_MAX_RESULTS) as usize;

        if query.trim().is_empty() {
            return Ok(ToolResult::error("Search query must not be empty"));
        }

        ensure_corpus(&ctx.docs_dir)?;

        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| args.invalid(format!("unusable query: {}", e)))?;

        let mut hits = Vec::new();
        let mut files_searched = 0;

        for entry in WalkDir::new(&ctx.docs_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !is_document(path) {
                continue;
            }

            // Skip unreadable / non-UTF-8 files
            let content = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(_) => continue,
            };
            files_searched += 1;

            let relevance = pattern.find_iter(&content).count();
            if let Some(first) = pattern.find(&content) {
                hits.push(DocumentHit {
                    filename: entry.file_name().to_string_lossy().into_owned(),
                    snippet: snippet_around(&content, first.start(), first.end()),
                    relevance,
                });
            }
        }

        // Stable sort keeps filename order among equal relevance
        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        hits.truncate(max_results);

        debug!(files_searched, hits = hits.len(), max_results, "Document search finished");

        if hits.is_empty() {
            return Ok(ToolResult::success(json!({
                "results": [],
                "message": format!("No documents found matching '{}'", query),
            })));
        }

        Ok(ToolResult::success(json!({
            "count": hits.len(),
            "query": query,
            "results": hits,
        })))
    }
}

fn is_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("txt") | Some("md")
    )
}

/// Text from up to 50 characters before the match to 150 after its start
fn snippet_around(content: &str, start: usize, end: usize) -> String {
    let from = content[..start]
        .char_indices()
        .rev()
        .nth(SNIPPET_BEFORE - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);

    let to = content[start..]
        .char_indices()
        .nth(SNIPPET_AFTER)
        .map(|(i, _)| start + i)
        .unwrap_or(content.len())
        .max(end.min(content.len()));

    content[from..to].trim().to_string()
}

/// Create and seed the documents directory when it does not exist yet
fn ensure_corpus(dir: &Path) -> anyhow::Result<()> {
    if dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create documents directory {}", dir.display()))?;

    for (name, content) in SAMPLE_DOCS {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!(dir = %dir.display(), documents = SAMPLE_DOCS.len(), "Seeded sample documents");
    Ok(())
}

const SAMPLE_DOCS: &[(&str, &str)] = &[
    (
        "python_intro.txt",
        "Python Programming Language

Python is a high-level, interpreted programming language known for its simplicity and readability.
It was created by Guido van Rossum and first released in 1991.

Python is widely used in web development, data science, artificial intelligence, automation, and more.
Its extensive standard library and vast ecosystem of third-party packages make it suitable for almost any programming task.

Key features of Python include dynamic typing, automatic memory management, and support for multiple programming paradigms.",
    ),
    (
        "machine_learning.txt",
        "Machine Learning Basics

Machine learning is a subset of artificial intelligence that enables systems to learn and improve from experience without being explicitly programmed.

There are three main types of machine learning:
1. Supervised Learning - Learning from labeled data
2. Unsupervised Learning - Finding patterns in unlabeled data
3. Reinforcement Learning - Learning through trial and error

Popular machine learning frameworks include TensorFlow, PyTorch, and scikit-learn.",
    ),
    (
        "web_development.txt",
        "Web Development Overview

Web development involves building websites and web applications. It typically consists of two main areas:

Frontend Development: The client-side of web applications, dealing with what users see and interact with. Technologies include HTML, CSS, and JavaScript.

Backend Development: The server-side of web applications, handling data storage, business logic, and server configuration. Common languages include Python, JavaScript (Node.js), Java, and Ruby.

Modern web development often uses frameworks like React, Vue.js, Django, and Express.js to speed up development.",
    ),
];
