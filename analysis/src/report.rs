//! LLM-backed code quality reports.
//!
//! Each file's code is interpolated into a fixed prompt template; the model
//! reply is parsed once into a tagged report and never re-inspected
//! downstream.

use serde::{Deserialize, Serialize};
use tracing::warn;

use codesim_embeddings::chat::{ChatClient, ChatRequest};

/// Sampling temperature, kept low for structured output.
const ANALYSIS_TEMPERATURE: f64 = 0.3;

/// Output size cap per report.
const ANALYSIS_MAX_TOKENS: u32 = 800;

/// Persona for the analysis model.
const SYSTEM_PROMPT: &str = "You are a Python code analysis expert.";

/// `key_functions` arrives as either one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyFunctions {
    /// A single free-form summary.
    One(String),

    /// An ordered list of function descriptions.
    Many(Vec<String>),
}

impl KeyFunctions {
    /// Render as one human-readable block, one `- item` line per entry.
    pub fn joined(&self) -> String {
        match self {
            Self::One(summary) => summary.clone(),
            Self::Many(items) => items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// The four required keys of a well-formed model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// What the code does.
    pub what: String,

    /// Key functions or logic patterns.
    pub key_functions: KeyFunctions,

    /// Suggested improvements or optimizations.
    pub improvements: String,

    /// Complexity or maintainability concerns.
    pub complexity: String,
}

/// A structured analysis of one file, or its raw fallback.
///
/// The variant is decided once when the reply is ingested; consumers never
/// re-parse the raw form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    /// The model returned valid structured output.
    Parsed(ParsedReport),

    /// Anything else, kept verbatim.
    Unparsed {
        /// Verbatim reply text, or the call-failure message.
        raw: String,
    },
}

impl AnalysisReport {
    /// Parse a model reply, keeping unparseable text verbatim.
    pub fn from_response(text: &str) -> Self {
        match serde_json::from_str::<ParsedReport>(text) {
            Ok(parsed) => Self::Parsed(parsed),
            Err(_) => Self::Unparsed {
                raw: text.to_string(),
            },
        }
    }

    /// Report for a file whose analysis call failed outright.
    pub fn call_failed(message: impl std::fmt::Display) -> Self {
        Self::Unparsed {
            raw: format!("Error analyzing code: {message}"),
        }
    }
}

/// Generates one report per file, never failing the batch.
#[derive(Debug, Clone)]
pub struct CodeAnalyzer {
    /// Chat-completion client.
    chat: ChatClient,
}

impl CodeAnalyzer {
    /// Create an analyzer over the given chat client.
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Build the fixed-template prompt for one file.
    fn prompt(code: &str) -> String {
        format!(
            r#"Analyze this Python code and return a JSON object with the following keys:
1. "what" - a short description of what the code does
2. "key_functions" - list or short summary of key functions or logic patterns
3. "improvements" - suggested improvements or optimizations
4. "complexity" - complexity or maintainability concerns

Return only valid JSON. Example format:
{{
    "what": "...",
    "key_functions": ["...", "..."],
    "improvements": "...",
    "complexity": "..."
}}

Code:
```python
{code}
```"#
        )
    }

    /// Analyze one file's code.
    ///
    /// Parse failures keep the reply verbatim; transport failures record the
    /// error message. Either way the batch moves on to the next file.
    pub async fn analyze(&self, code: &str) -> AnalysisReport {
        let request = ChatRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: Self::prompt(code),
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        match self.chat.complete(&request).await {
            Ok(text) => AnalysisReport::from_response(&text),
            Err(e) => {
                warn!("Analysis call failed: {e}");
                AnalysisReport::call_failed(e)
            }
        }
    }
}
