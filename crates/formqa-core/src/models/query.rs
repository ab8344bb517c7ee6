use crate::error::{FormqaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user question, validated to be non-blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

impl Query {
    /// Create a query, rejecting blank text before any network call is made
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(FormqaError::empty("question"));
        }
        Ok(Self { text: trimmed.to_string() })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// How the model is asked to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    /// Plain prose answer
    FreeForm,
    /// JSON object following the form record schema
    Structured,
}

/// Words that mark a request for structured output
const STRUCTURED_KEYWORDS: &[&str] =
    &["generate", "json", "extract", "export", "excel", "spreadsheet", "structured"];

impl TaskMode {
    /// Pick a mode from the wording of the question
    pub fn detect(question: &str) -> Self {
        let lowered = question.to_lowercase();
        let structured = lowered
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| STRUCTURED_KEYWORDS.contains(&word));

        if structured {
            TaskMode::Structured
        } else {
            TaskMode::FreeForm
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, TaskMode::Structured)
    }
}

impl FromStr for TaskMode {
    type Err = FormqaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "free" | "freeform" | "free-form" | "free_form" | "prose" => Ok(TaskMode::FreeForm),
            "structured" | "json" | "extract" => Ok(TaskMode::Structured),
            _ => Err(FormqaError::ConfigInvalid {
                key: "mode".to_string(),
                reason: format!("Invalid task mode: {}. Use free or structured", s),
            }),
        }
    }
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskMode::FreeForm => f.write_str("free"),
            TaskMode::Structured => f.write_str("structured"),
        }
    }
}

/// Which JSON objects of a structured reply become records
///
/// A reply may carry one object per requested form number. `First` keeps only
/// the first object that parses; `All` keeps every top-level object in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    #[default]
    First,
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_blank() {
        assert!(matches!(Query::new("   "), Err(FormqaError::EmptyInput { .. })));
        assert!(Query::new("").is_err());
    }

    #[test]
    fn test_query_trims() {
        let query = Query::new("  what is form 100?\n").unwrap();
        assert_eq!(query.text, "what is form 100?");
    }

    #[test]
    fn test_detect_structured() {
        assert_eq!(TaskMode::detect("generate data for form 100"), TaskMode::Structured);
        assert_eq!(TaskMode::detect("Give me the JSON for CG 00 01"), TaskMode::Structured);
        assert_eq!(TaskMode::detect("Which forms expire in 2024?"), TaskMode::FreeForm);
        // substrings do not count
        assert_eq!(TaskMode::detect("regenerated forms?"), TaskMode::FreeForm);
    }

    #[test]
    fn test_parse_task_mode() {
        assert_eq!("free".parse::<TaskMode>().unwrap(), TaskMode::FreeForm);
        assert_eq!("STRUCTURED".parse::<TaskMode>().unwrap(), TaskMode::Structured);
        assert!("tabular".parse::<TaskMode>().is_err());
    }

    #[test]
    fn test_extraction_policy_default_is_first() {
        assert_eq!(ExtractionPolicy::default(), ExtractionPolicy::First);
    }
}
