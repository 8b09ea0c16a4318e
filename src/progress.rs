use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Spinner on stderr for the duration of a search.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✔"])
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|err| {
            warn!(error = %err, "invalid spinner template");
            ProgressStyle::default_spinner()
        });
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
