use anyhow::Result;
use dialoguer::Input;

/// Prompt for a question; an empty answer ends the session
pub fn prompt_question() -> Result<Option<String>> {
    let question: String = Input::new()
        .with_prompt("Ask a question (empty to quit)")
        .allow_empty(true)
        .interact_text()?;

    let question = question.trim();
    if question.is_empty() || question.eq_ignore_ascii_case("exit") {
        Ok(None)
    } else {
        Ok(Some(question.to_string()))
    }
}
