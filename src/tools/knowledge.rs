//! Retrieval over the local reference-document directory
//!
//! The knowledge directory holds clinical reference material (plain text or
//! markdown). Retrieval is paragraph-granular: paragraphs are scored by
//! case-insensitive term hits and the best excerpts are returned with their
//! source file names.

use super::{Tool, ToolOutput};
use async_trait::async_trait;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Maximum excerpts returned per query
const MAX_EXCERPTS: usize = 6;

/// Cap on total output size
const MAX_OUTPUT_BYTES: usize = 16 * 1024;

/// File extensions treated as reference documents
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "txt"];

/// Query terms shorter than this are ignored when scoring
const MIN_TERM_LEN: usize = 3;

#[derive(Debug, Deserialize)]
struct KnowledgeSearchInput {
    query: String,
}

/// Reference-document retrieval tool
pub struct KnowledgeSearchTool {
    root: PathBuf,
}

impl KnowledgeSearchTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn document_paths(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
            })
            .collect();
        paths.sort();
        paths
    }

    fn search(&self, query: &str) -> String {
        let matchers: Vec<regex::Regex> = query
            .split_whitespace()
            .filter(|term| term.len() >= MIN_TERM_LEN)
            .filter_map(|term| {
                RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();

        if matchers.is_empty() {
            return "Query has no usable search terms.".to_string();
        }

        let mut scored: Vec<(usize, String, String)> = Vec::new();
        for path in self.document_paths() {
            let Ok(content) = std::fs::read_to_string(&path) else {
                tracing::warn!(path = %path.display(), "Skipping unreadable reference document");
                continue;
            };
            let source = display_name(&path);

            for paragraph in content.split("\n\n") {
                let paragraph = paragraph.trim();
                if paragraph.is_empty() {
                    continue;
                }
                let score: usize = matchers
                    .iter()
                    .map(|matcher| matcher.find_iter(paragraph).count())
                    .sum();
                if score > 0 {
                    scored.push((score, source.clone(), paragraph.to_string()));
                }
            }
        }

        if scored.is_empty() {
            return "No relevant passages found in the reference documents.".to_string();
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut output = String::new();
        for (_, source, paragraph) in scored.into_iter().take(MAX_EXCERPTS) {
            let excerpt = format!("### {source}\n{paragraph}\n\n");
            if output.len() + excerpt.len() > MAX_OUTPUT_BYTES {
                break;
            }
            output.push_str(&excerpt);
        }
        output.trim_end().to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &'static str {
        "knowledge_search"
    }

    fn description(&self) -> String {
        "Search the local reference documents (clinical guides, assessment \
         manuals, treatment protocols) for passages relevant to a query. Use \
         this before web search when the question concerns established \
         clinical practice."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look up in the reference documents."
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: KnowledgeSearchInput = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        if !self.root.is_dir() {
            return ToolOutput::success("No reference documents are available.");
        }

        ToolOutput::success(self.search(&input.query))
    }
}
