use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
///
/// Hidden when `quiet` is set so JSON output is not interleaved with
/// terminal control codes.
pub fn create_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Run a future under a spinner, finishing it according to the outcome
pub async fn with_spinner<T, E, F>(
    message: &str,
    quiet: bool,
    fut: F,
    done: impl FnOnce(&T) -> String,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let pb = create_spinner(message, quiet);
    let result = fut.await;
    match &result {
        Ok(value) => finish_success(&pb, &done(value)),
        Err(_) => finish_error(&pb, message.trim_end_matches("...")),
    }
    result
}
