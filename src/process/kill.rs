//! Best-effort termination of a process and its descendants.
//!
//! Packaging tools spawn sub-tools, so cancellation must take down the
//! whole tree, not just the direct child. Failures are swallowed: this
//! runs only during cancellation cleanup and must never block the
//! terminal event.

use tracing::debug;

/// Forcibly terminates `pid` and all of its descendants.
///
/// On Unix the child is spawned into its own process group (see the
/// runner), so a single `SIGKILL` to the negative pid covers the tree; a
/// direct kill follows as a fallback for children that changed group.
/// On Windows `taskkill /T /F` enumerates and kills the tree.
///
/// Best-effort by contract: errors (already-exited process, missing
/// taskkill, permissions) are ignored.
pub async fn kill_tree(pid: u32) {
    debug!(pid, "Terminating process tree");
    imp::kill_tree(pid).await;
}

#[cfg(unix)]
mod imp {
    #[allow(clippy::cast_possible_wrap)]
    pub(super) async fn kill_tree(pid: u32) {
        let pid = pid as i32;
        // Negative pid addresses the process group.
        unsafe {
            let _ = libc::kill(-pid, libc::SIGKILL);
            let _ = libc::kill(pid, libc::SIGKILL);
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::process::Stdio;

    use tokio::process::Command;

    pub(super) async fn kill_tree(pid: u32) {
        let _ = Command::new("taskkill")
            .args(["/pid", &pid.to_string(), "/T", "/F"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
    }
}
