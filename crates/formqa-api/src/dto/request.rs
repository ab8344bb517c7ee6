use serde::Deserialize;

/// Ask request body
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// `auto` (default), `free` or `structured`
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Export every JSON object in a structured reply instead of the first
    #[serde(default)]
    pub all_records: bool,
}
