//! Build lifecycle events delivered to the caller.
//!
//! A started build produces zero or more [`ProgressEvent`]s followed by
//! exactly one [`TerminalResult`]. Consumers render the human-readable
//! message and may branch on [`Stage`], but must not parse message text to
//! infer control flow.

use std::path::PathBuf;

use serde::Serialize;

/// Identifies which step of the build pipeline a progress message belongs to.
///
/// Emitted alongside every progress message so consumers never have to
/// string-match on the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Temporary workspace directory created.
    Workspace,
    /// Icon resolution attempted (custom, fetched, or none).
    Icon,
    /// Generated project files written into the workspace.
    Scaffold,
    /// Dependency installation running.
    Install,
    /// Package/compile step running.
    Package,
    /// Scanning the build output for the final executable.
    Extract,
}

/// A single informational message about build progress.
///
/// Ordered by emission; purely for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// The pipeline step this message belongs to.
    pub stage: Stage,
    /// Human-readable description of what just happened.
    pub message: String,
}

/// The single outcome event closing a build session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminalResult {
    /// The pipeline ran to completion. `artifact_path` is `None` when the
    /// packaging tool exited cleanly but no executable was found in its
    /// output directory.
    Success {
        /// Final executable copied into the destination, if one was found.
        artifact_path: Option<PathBuf>,
        /// Directory the caller should open to find the result.
        containing_dir: PathBuf,
    },
    /// The build did not complete.
    Aborted {
        /// True when the user cancelled (including destination-picker
        /// cancellation); false for tool failures and internal faults.
        user_initiated: bool,
        /// Failure description for display. Always `None` on user
        /// cancellation.
        error_detail: Option<String>,
    },
}

impl TerminalResult {
    /// The acknowledgement emitted for user cancellation.
    #[must_use]
    pub fn user_cancelled() -> Self {
        Self::Aborted {
            user_initiated: true,
            error_detail: None,
        }
    }

    /// A non-user abort carrying a failure description.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Aborted {
            user_initiated: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// Everything a build session can send to its consumer.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// Informational stage message.
    Progress(ProgressEvent),
    /// Session outcome; always the last event on the stream.
    Done(TerminalResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_cancelled_carries_no_error_detail() {
        let result = TerminalResult::user_cancelled();
        assert_eq!(
            result,
            TerminalResult::Aborted {
                user_initiated: true,
                error_detail: None,
            }
        );
    }

    #[test]
    fn failed_wraps_detail_and_is_not_user_initiated() {
        let result = TerminalResult::failed("npm install exit code 1");
        let TerminalResult::Aborted {
            user_initiated,
            error_detail,
        } = result
        else {
            panic!("expected Aborted");
        };
        assert!(!user_initiated);
        assert_eq!(error_detail.as_deref(), Some("npm install exit code 1"));
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::Install).unwrap();
        assert_eq!(json, "\"install\"");
    }
}
