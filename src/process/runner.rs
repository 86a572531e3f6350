//! Streaming external command runner.
//!
//! Runs one build tool in a working directory, feeds its stderr into a
//! bounded tail buffer, and reports the exit code. Spawn failures never
//! propagate as errors: they are converted into a synthetic non-zero exit
//! code with the failure message appended to the tail, so callers handle
//! exactly one shape of outcome.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Synthetic exit code reported when the command could not be spawned.
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Exit code reported when the process was terminated by a signal and has
/// no real exit code (forced cancellation lands here on Unix).
const TERMINATED_CODE: i32 = -1;

/// An external tool invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments, already split.
    pub args: Vec<String>,
    /// Short tool name used in user-facing failure messages
    /// (e.g. "npm install").
    pub label: String,
}

impl CommandSpec {
    /// Builds a spec from string-ish parts.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            label: label.into(),
        }
    }
}

/// Shared slot holding the pid of the currently running external process.
///
/// The orchestrator hands the same slot to the runner (which fills and
/// clears it) and to the cancellation path (which reads it to kill the
/// process tree).
pub type PidSlot = Arc<Mutex<Option<u32>>>;

/// Bounded FIFO buffer retaining the newest stderr lines of a stage.
///
/// When full, the oldest line is evicted so failure reports always show
/// the most recent tool output.
#[derive(Debug)]
pub struct ErrorTail {
    lines: VecDeque<String>,
    cap: usize,
}

impl ErrorTail {
    /// Creates a tail retaining at most `cap` lines.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(cap.min(64)),
            cap,
        }
    }

    /// Appends a line, evicting the oldest when at capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.cap == 0 {
            return;
        }
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for ErrorTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in &self.lines {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
            first = false;
        }
        Ok(())
    }
}

/// Runs `spec` in `cwd`, streaming stderr into `tail`, and returns the
/// exit code.
///
/// The child's environment gets `CI=true` so build tools run in
/// non-interactive mode and never block on terminal prompts. Stdout is
/// drained and discarded (it is not part of failure reports). While the
/// child runs, its pid is published in `pid_slot` for the cancellation
/// path; the slot is cleared before returning. `cancel` is re-checked
/// right after the pid is published: a cancellation that read the slot
/// while it was still empty is finished here by killing the fresh child.
///
/// Never fails: spawn errors yield [`SPAWN_FAILURE_CODE`] with the error
/// message appended to `tail`, and a signal-terminated child reports `-1`.
pub async fn run_streaming(
    spec: &CommandSpec,
    cwd: &Path,
    pid_slot: &PidSlot,
    cancel: &AtomicBool,
    tail: &mut ErrorTail,
) -> i32 {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(cwd)
        .env("CI", "true")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    command.process_group(0);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(error) => {
            warn!(tool = %spec.label, %error, "Failed to spawn build tool");
            tail.push(format!("failed to spawn {}: {error}", spec.program));
            return SPAWN_FAILURE_CODE;
        }
    };

    let pid = child.id();
    if let Ok(mut slot) = pid_slot.lock() {
        *slot = pid;
    }
    debug!(tool = %spec.label, pid, "Build tool started");

    // A cancel that raced the spawn may have found the slot still empty
    // and skipped its kill; it has set the flag, so finish its work here.
    if cancel.load(Ordering::SeqCst) {
        if let Some(pid) = pid {
            super::kill::kill_tree(pid).await;
        }
    }

    // Stdout must be consumed even though it is discarded, otherwise the
    // child can block on a full pipe.
    let stdout = child.stdout.take();
    let drain = tokio::spawn(async move {
        if let Some(mut stdout) = stdout {
            let mut sink = [0u8; 4096];
            while matches!(stdout.read(&mut sink).await, Ok(n) if n > 0) {}
        }
    });

    if let Some(stderr) = child.stderr.take() {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tail.push(line);
        }
    }

    let code = match child.wait().await {
        Ok(status) => status.code().unwrap_or(TERMINATED_CODE),
        Err(error) => {
            tail.push(format!("failed to wait for {}: {error}", spec.program));
            SPAWN_FAILURE_CODE
        }
    };
    drain.abort();

    if let Ok(mut slot) = pid_slot.lock() {
        *slot = None;
    }
    debug!(tool = %spec.label, code, "Build tool exited");
    code
}
