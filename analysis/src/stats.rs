//! Structural statistics over a single source file.

use serde::{Deserialize, Serialize};

/// Line-level syntax markers for the analyzed source dialect.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Single-line comment prefix.
    pub comment_marker: &'static str,

    /// Function declaration prefix.
    pub function_keyword: &'static str,

    /// Class declaration prefix.
    pub class_keyword: &'static str,
}

impl LanguageProfile {
    /// Profile for Python sources.
    pub fn python() -> Self {
        Self {
            comment_marker: "#",
            function_keyword: "def ",
            class_keyword: "class ",
        }
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::python()
    }
}

/// Per-file line and declaration counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStats {
    /// Source file name.
    pub filename: String,

    /// Number of lines in the file.
    pub total_lines: usize,

    /// Nonempty, non-comment lines.
    pub code_lines: usize,

    /// Lines whose trimmed form starts with the comment marker.
    pub comment_lines: usize,

    /// Lines whose trimmed form is empty.
    pub empty_lines: usize,

    /// Lines starting a function declaration.
    pub functions: usize,

    /// Lines starting a class declaration.
    pub classes: usize,
}

/// Count lines and declarations for one file. No cross-file state.
///
/// A line is classified exactly once: empty beats comment beats code, so a
/// whitespace-only line is empty rather than code.
pub fn extract_stats(profile: &LanguageProfile, filename: &str, code: &str) -> CodeStats {
    let mut total_lines = 0;
    let mut code_lines = 0;
    let mut comment_lines = 0;
    let mut empty_lines = 0;
    let mut functions = 0;
    let mut classes = 0;

    for line in code.lines() {
        total_lines += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            empty_lines += 1;
        } else if trimmed.starts_with(profile.comment_marker) {
            comment_lines += 1;
        } else {
            code_lines += 1;
        }

        if trimmed.starts_with(profile.function_keyword) {
            functions += 1;
        }
        if trimmed.starts_with(profile.class_keyword) {
            classes += 1;
        }
    }

    CodeStats {
        filename: filename.to_string(),
        total_lines,
        code_lines,
        comment_lines,
        empty_lines,
        functions,
        classes,
    }
}
