//! Prompt assembly
//!
//! Pure string building: the same inputs always give the same prompt.

use formqa_core::models::record::{FREE_TEXT_COLUMN, NOT_AVAILABLE, SENTINEL_EXPIRATION_DATE};
use formqa_core::models::{Query, RecordField, ScoredDocument, TaskMode};

const PREAMBLE: &str =
    "You are a helpful assistant that reads insurance form metadata and answers questions based on the data.";

const CONTEXT_INTRO: &str = "Here are some rows from the data relevant to the user's question:";

/// Build the generator prompt for a question
///
/// `delegated` is set when the backend retrieves on its own (hosted store):
/// no context block is emitted and a free-form question is sent unchanged.
pub fn assemble_prompt(
    query: &Query,
    retrieved: &[ScoredDocument],
    mode: TaskMode,
    delegated: bool,
) -> String {
    match (mode, delegated) {
        (TaskMode::FreeForm, true) => query.text.clone(),
        (TaskMode::FreeForm, false) => format!(
            "{}\n\n{}\n\n{}\n\nNow answer the following question in a clear, human-readable paragraph:\n{}",
            PREAMBLE,
            CONTEXT_INTRO,
            context_block(retrieved),
            query.text
        ),
        (TaskMode::Structured, true) => {
            format!("{}\n\nRequest:\n{}", extraction_instructions(), query.text)
        }
        (TaskMode::Structured, false) => format!(
            "{}\n\n{}\n\n{}\n\n{}\n\nRequest:\n{}",
            PREAMBLE,
            CONTEXT_INTRO,
            context_block(retrieved),
            extraction_instructions(),
            query.text
        ),
    }
}

/// Retrieved rows verbatim, one blank line apart
fn context_block(retrieved: &[ScoredDocument]) -> String {
    retrieved.iter().map(|hit| hit.document.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

fn extraction_instructions() -> String {
    let mut out = String::from(
        "Extract the requested form data as JSON. Build one object per form number the request asks for, \
         using exactly these keys:\n",
    );

    for field in RecordField::ALL {
        let line = match field.source_column() {
            Some(column) => format!("- \"{}\": the \"{}\" column\n", field.key(), column),
            None => format!(
                "- \"{}\": {}, quoted or paraphrased from the \"{}\" column\n",
                field.key(),
                field.description(),
                FREE_TEXT_COLUMN
            ),
        };
        out.push_str(&line);
    }

    out.push_str(&format!(
        "\nRules:\n\
         - If the expiration date is missing or blank, set \"{}\" to \"{}\".\n\
         - If no clause matches a field taken from \"{}\", use the literal string \"{}\".\n\
         - Output valid JSON only, with exactly the keys above and no commentary.\n\
         - If several form numbers are requested, output one JSON object per form number.\n\
         - If the request is not asking for structured data, answer in plain prose instead.",
        RecordField::EndEffectiveDate.key(),
        SENTINEL_EXPIRATION_DATE,
        FREE_TEXT_COLUMN,
        NOT_AVAILABLE
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use formqa_core::models::RowDocument;

    fn hits() -> Vec<ScoredDocument> {
        vec![
            ScoredDocument {
                document: RowDocument::new(0, "Form Number: 100\nForm Title: GL"),
                score: 0.9,
            },
            ScoredDocument { document: RowDocument::new(2, "Form Number: 300"), score: 0.4 },
        ]
    }

    #[test]
    fn test_free_form_local_prompt() {
        let query = Query::new("What is form 100?").unwrap();
        let prompt = assemble_prompt(&query, &hits(), TaskMode::FreeForm, false);

        assert_eq!(
            prompt,
            "You are a helpful assistant that reads insurance form metadata and answers questions based on the data.\n\n\
             Here are some rows from the data relevant to the user's question:\n\n\
             Form Number: 100\nForm Title: GL\n\nForm Number: 300\n\n\
             Now answer the following question in a clear, human-readable paragraph:\n\
             What is form 100?"
        );
    }

    #[test]
    fn test_free_form_delegated_sends_question_unchanged() {
        let query = Query::new("What is form 100?").unwrap();
        assert_eq!(assemble_prompt(&query, &[], TaskMode::FreeForm, true), "What is form 100?");
    }

    #[test]
    fn test_structured_prompt_lists_every_key() {
        let query = Query::new("generate data for form 100").unwrap();
        let prompt = assemble_prompt(&query, &hits(), TaskMode::Structured, false);

        for field in RecordField::ALL {
            assert!(prompt.contains(&format!("\"{}\"", field.key())), "missing {}", field.key());
        }
        assert!(prompt.contains("\"Form Number\" column"));
        assert!(prompt.contains("31-12-9999"));
        assert!(prompt.contains("\"NA\""));
        assert!(prompt.contains("Form Number: 300"));
        assert!(prompt.ends_with("Request:\ngenerate data for form 100"));
    }

    #[test]
    fn test_structured_delegated_has_no_context() {
        let query = Query::new("generate data for form 100").unwrap();
        let prompt = assemble_prompt(&query, &hits(), TaskMode::Structured, true);

        assert!(!prompt.contains(CONTEXT_INTRO));
        assert!(!prompt.contains("Form Number: 300"));
        assert!(prompt.starts_with("Extract the requested form data as JSON."));
    }

    #[test]
    fn test_deterministic() {
        let query = Query::new("generate json for 100").unwrap();
        assert_eq!(
            assemble_prompt(&query, &hits(), TaskMode::Structured, false),
            assemble_prompt(&query, &hits(), TaskMode::Structured, false)
        );
    }
}
