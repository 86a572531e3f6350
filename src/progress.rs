//! Progress UI (spinner) for build runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Creates the stage spinner when requested.
///
/// Returns `None` when the spinner is disabled (quiet mode or
/// non-terminal output); callers then rely on log lines alone.
pub(crate) fn stage_spinner(enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

#[cfg(test)]
mod tests {
    use super::stage_spinner;

    #[test]
    fn disabled_spinner_returns_none() {
        assert!(stage_spinner(false).is_none());
    }

    #[test]
    fn enabled_spinner_accepts_messages() {
        let spinner = stage_spinner(true).unwrap();
        spinner.set_message("Installing dependencies...");
        spinner.finish_and_clear();
    }
}
