use console::style;
use formqa_core::FormqaError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for an unreadable or unsupported spreadsheet
pub fn spreadsheet_invalid(reason: &str) -> CliError {
    CliError::new("Cannot read spreadsheet")
        .with_context(format!("The input file could not be loaded.\n\nReason: {}", reason))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Supported formats: xlsx, xlsm, xls, xlsb, ods")
        .with_suggestion("The first sheet must have a header row")
        .with_help("Run: formqa convert --help")
}

/// Create error for a blank question or empty sheet
pub fn empty_input(what: &str) -> CliError {
    CliError::new(format!("Nothing to do: {} is empty", what))
        .with_context("No request was sent.")
        .with_suggestion("Pass a question: formqa ask forms.xlsx \"What is form 100?\"")
        .with_suggestion("Or ask interactively: formqa ask forms.xlsx --interactive")
        .with_help("Run: formqa ask --help")
}

/// Create error for missing configuration
pub fn config_missing(key: &str) -> CliError {
    CliError::new(format!("Missing required configuration: {}", key))
        .with_context("The selected backend needs this value before it can run.")
        .with_suggestion("Set it in formqa.toml or in a .env file next to it")
        .with_suggestion("Or choose the other backend: --backend local | --backend hosted")
        .with_suggestion("Check where each value comes from: formqa config")
        .with_help("Run: formqa config")
}

/// Create error for an invalid configuration value
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check formqa.toml for syntax errors")
        .with_suggestion("Check FORMQA_* and AZURE_OPENAI_* environment variables")
        .with_help("Run: formqa config")
}

/// Create error for a failed remote call
pub fn upstream_failed(error: &FormqaError) -> CliError {
    CliError::new("Remote service call failed")
        .with_context(format!("Error: {}", error))
        .with_suggestion("Check the endpoint URLs and API keys: formqa config")
        .with_suggestion("Retry later if the service reported a 5xx status")
        .with_help("Run: formqa config")
}

/// Create error for asking before an index exists
pub fn index_not_built() -> CliError {
    CliError::new("Index not built")
        .with_context("The spreadsheet has not been indexed yet.")
        .with_suggestion("Pass a spreadsheet with data rows to formqa ask")
        .with_help("Run: formqa ask --help")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(e) = error.downcast_ref::<FormqaError>() {
        return match e {
            FormqaError::Spreadsheet { reason } => spreadsheet_invalid(reason),
            FormqaError::EmptyInput { what } => empty_input(what),
            FormqaError::ConfigMissing { key } => config_missing(key),
            FormqaError::ConfigInvalid { key, reason } => invalid_config(key, reason),
            FormqaError::IndexNotBuilt => index_not_built(),
            e if e.is_upstream() => upstream_failed(e),
            e => CliError::new(e.to_string()),
        };
    }

    let message = format!("{:#}", error);

    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_maps_to_suggestions() {
        let err = anyhow::Error::new(FormqaError::ConfigMissing { key: "hosted.qa_url".into() });
        let cli = from_anyhow(err);
        assert_eq!(cli.message, "Missing required configuration: hosted.qa_url");
        assert!(cli.suggestions.iter().any(|s| s.contains("formqa config")));
    }

    #[test]
    fn test_upstream_keeps_status_in_context() {
        let err = anyhow::Error::new(FormqaError::Upstream {
            service: "hosted-qa".into(),
            status: 503,
            body: "unavailable".into(),
        });
        let cli = from_anyhow(err);
        assert_eq!(cli.message, "Remote service call failed");
        assert!(cli.context.unwrap().contains("503"));
    }

    #[test]
    fn test_context_wrapped_error_still_recognised() {
        let err = anyhow::Error::new(FormqaError::empty("question")).context("Failed to answer");
        let cli = from_anyhow(err);
        assert_eq!(cli.message, "Nothing to do: question is empty");
    }

    #[test]
    fn test_plain_error_passes_through() {
        let cli = from_anyhow(anyhow::anyhow!("something odd"));
        assert_eq!(cli.message, "something odd");
        assert!(cli.suggestions.is_empty());
    }
}
