//! Build orchestration: one single-flight session from start request to
//! terminal event.
//!
//! The orchestrator sequences workspace creation, icon resolution,
//! project scaffolding, dependency install, packaging, and artifact
//! extraction. Progress events stream to the caller in strict stage
//! order; exactly one [`TerminalResult`] closes every accepted session,
//! on every path (success, tool failure, cancellation, internal fault).
//! At most one session is active process-wide.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, instrument, warn};

use crate::config::BuildConfig;
use crate::events::{BuildEvent, ProgressEvent, Stage, TerminalResult};
use crate::icon::IconResolver;
use crate::picker::DestinationPicker;
use crate::process::{CommandSpec, ErrorTail, PidSlot, kill_tree, run_streaming};
use crate::scaffold::{generate_project, product_name};
use crate::workspace;

/// Lines of tool stderr retained for failure reports.
pub const ERROR_TAIL_LINES: usize = 200;

/// External commands for the two build stages.
///
/// Defaults match the packaging toolchain contract: a quiet,
/// non-interactive dependency install and a manifest-driven build.
/// Tests substitute their own commands.
#[derive(Debug, Clone)]
pub struct ToolCommands {
    /// Dependency-install stage command.
    pub install: CommandSpec,
    /// Package/compile stage command.
    pub package: CommandSpec,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            install: CommandSpec::new(
                "npm",
                ["install", "--no-fund", "--no-audit", "--loglevel=error"],
                "npm install",
            ),
            package: CommandSpec::new("npm", ["run", "build"], "electron-builder"),
        }
    }
}

/// Errors surfaced directly by orchestrator entry points.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A session is already active; the start request is dropped without
    /// side effects.
    #[error("a build is already in progress")]
    BuildInProgress,
}

/// Shared handles of the active session, visible to both the pipeline
/// task and the cancellation path.
#[derive(Clone)]
struct SessionRefs {
    /// Set by `cancel()`; checked before every stage and before any
    /// terminal event is shaped, so cancellation and natural stage
    /// failure cannot both produce one.
    cancel: Arc<AtomicBool>,
    /// Pid of the currently running external process, if any.
    pid: PidSlot,
    /// Workspace path once created; lets the panic watcher clean up.
    workspace: Arc<Mutex<Option<PathBuf>>>,
}

impl SessionRefs {
    fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            pid: Arc::new(Mutex::new(None)),
            workspace: Arc::new(Mutex::new(None)),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn set_workspace(&self, path: Option<PathBuf>) {
        if let Ok(mut guard) = self.workspace.lock() {
            *guard = path;
        }
    }

    fn workspace_path(&self) -> Option<PathBuf> {
        self.workspace.lock().ok().and_then(|guard| guard.clone())
    }
}

struct Inner {
    active: Mutex<Option<SessionRefs>>,
    tools: ToolCommands,
    icons: IconResolver,
}

impl Inner {
    /// Poisoning can only come from a panicked holder; the slot stays
    /// usable either way.
    fn active_slot(&self) -> MutexGuard<'_, Option<SessionRefs>> {
        match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// The build orchestrator. Cheap to clone via internal `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Orchestrator with the default toolchain and icon resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_components(ToolCommands::default(), IconResolver::new())
    }

    /// Orchestrator with substituted collaborators (tests inject stub
    /// commands and a mock favicon proxy here).
    #[must_use]
    pub fn with_components(tools: ToolCommands, icons: IconResolver) -> Self {
        Self {
            inner: Arc::new(Inner {
                active: Mutex::new(None),
                tools,
                icons,
            }),
        }
    }

    /// Starts a build session.
    ///
    /// Returns the event stream for the session: zero or more progress
    /// events followed by exactly one terminal event. The session runs in
    /// a background task; this call returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::BuildInProgress`] while another
    /// session is active. The rejected request has no side effects: no
    /// workspace is created and no events are emitted for it.
    #[instrument(skip_all, fields(app = %config.name))]
    pub fn start_build(
        &self,
        config: BuildConfig,
        picker: Arc<dyn DestinationPicker>,
    ) -> Result<UnboundedReceiver<BuildEvent>, OrchestratorError> {
        let session = {
            let mut slot = self.inner.active_slot();
            if slot.is_some() {
                warn!("Build request dropped: a session is already active");
                return Err(OrchestratorError::BuildInProgress);
            }
            let session = SessionRefs::new();
            *slot = Some(session.clone());
            session
        };

        info!("Build session started");
        let (tx, rx) = unbounded_channel();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(run_session(inner, config, picker, tx, session));
        Ok(rx)
    }

    /// Requests cancellation of the active session.
    ///
    /// With no active session this is acknowledged immediately by the
    /// returned `Aborted { user_initiated: true }` and has no side
    /// effects. With an active session it returns `None`: the flag is
    /// set, any running external process tree is killed, and the
    /// acknowledgement arrives as that session's single terminal event.
    pub async fn cancel(&self) -> Option<TerminalResult> {
        let session = self.inner.active_slot().clone();
        let Some(session) = session else {
            debug!("Cancel with no active session: immediate acknowledgement");
            return Some(TerminalResult::user_cancelled());
        };

        session.cancel.store(true, Ordering::SeqCst);
        let pid = session.pid.lock().ok().and_then(|guard| *guard);
        if let Some(pid) = pid {
            info!(pid, "Cancelling active build, killing process tree");
            kill_tree(pid).await;
        } else {
            info!("Cancelling active build");
        }
        None
    }

    /// True while a session is active.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.inner.active_slot().is_some()
    }
}

fn progress(tx: &UnboundedSender<BuildEvent>, stage: Stage, message: impl Into<String>) {
    let _ = tx.send(BuildEvent::Progress(ProgressEvent {
        stage,
        message: message.into(),
    }));
}

/// Session wrapper: supervises the pipeline task so even a panic inside
/// it still yields exactly one terminal event and a cleaned workspace,
/// and clears the single-flight slot before the terminal event is sent.
async fn run_session(
    inner: Arc<Inner>,
    config: BuildConfig,
    picker: Arc<dyn DestinationPicker>,
    tx: UnboundedSender<BuildEvent>,
    session: SessionRefs,
) {
    let driver = {
        let inner = Arc::clone(&inner);
        let tx = tx.clone();
        let session = session.clone();
        tokio::spawn(async move { drive_build(&inner, &config, picker, &tx, &session).await })
    };

    let terminal = match driver.await {
        Ok(terminal) => terminal,
        Err(join_error) => {
            warn!(%join_error, "Build pipeline task failed");
            if let Some(ws) = session.workspace_path() {
                workspace::destroy_workspace(&ws).await;
            }
            if session.cancelled() {
                TerminalResult::user_cancelled()
            } else {
                TerminalResult::failed(format!("internal fault: {join_error}"))
            }
        }
    };

    *inner.active_slot() = None;
    match &terminal {
        TerminalResult::Success { artifact_path, .. } => {
            info!(artifact = ?artifact_path, "Build session finished");
        }
        TerminalResult::Aborted { user_initiated, .. } => {
            info!(user_initiated, "Build session aborted");
        }
    }
    let _ = tx.send(BuildEvent::Done(terminal));
}

/// Runs the pipeline up to the terminal outcome. Owns workspace
/// creation/destruction; all inner failures are already converted to a
/// `TerminalResult` here.
async fn drive_build(
    inner: &Inner,
    config: &BuildConfig,
    picker: Arc<dyn DestinationPicker>,
    tx: &UnboundedSender<BuildEvent>,
    session: &SessionRefs,
) -> TerminalResult {
    // Destination selection happens before any resource allocation;
    // cancelling the picker aborts the session outright.
    let Some(dest) = picker.pick_destination().await else {
        debug!("Destination selection cancelled");
        return TerminalResult::user_cancelled();
    };
    if session.cancelled() {
        return TerminalResult::user_cancelled();
    }

    let workspace = match workspace::create_workspace().await {
        Ok(path) => path,
        Err(error) => return TerminalResult::failed(error.to_string()),
    };
    session.set_workspace(Some(workspace.clone()));
    progress(tx, Stage::Workspace, "Preparing workspace...");

    let terminal = match build_in_workspace(inner, config, &dest, &workspace, tx, session).await {
        Ok(terminal) => terminal,
        Err(fault) => {
            if session.cancelled() {
                TerminalResult::user_cancelled()
            } else {
                TerminalResult::failed(fault)
            }
        }
    };

    // Cleanup precedes the terminal event on every path.
    workspace::destroy_workspace(&workspace).await;
    session.set_workspace(None);
    terminal
}

/// The stages that run inside an existing workspace. `Err` carries a
/// fault description for non-cancellation failures.
async fn build_in_workspace(
    inner: &Inner,
    config: &BuildConfig,
    dest: &std::path::Path,
    workspace: &std::path::Path,
    tx: &UnboundedSender<BuildEvent>,
    session: &SessionRefs,
) -> Result<TerminalResult, String> {
    if session.cancelled() {
        return Ok(TerminalResult::user_cancelled());
    }

    let (icon_path, icon_outcome) = inner
        .icons
        .resolve(config.icon.as_ref(), &config.url, workspace)
        .await;
    progress(tx, Stage::Icon, icon_outcome.message());
    if session.cancelled() {
        return Ok(TerminalResult::user_cancelled());
    }

    progress(tx, Stage::Scaffold, "Generating project files...");
    let files = generate_project(config, icon_path.is_some());
    workspace::write_project_files(workspace, &files)
        .await
        .map_err(|error| error.to_string())?;
    if session.cancelled() {
        return Ok(TerminalResult::user_cancelled());
    }

    progress(tx, Stage::Install, "Installing dependencies...");
    if let Some(abort) = run_stage(&inner.tools.install, workspace, session).await {
        return Ok(abort);
    }

    let product = product_name(&config.name);
    progress(
        tx,
        Stage::Package,
        format!(
            "Creating application \"{product}.{}\"",
            workspace::artifact_extension()
        ),
    );
    if let Some(abort) = run_stage(&inner.tools.package, workspace, session).await {
        return Ok(abort);
    }

    progress(tx, Stage::Extract, "Collecting build artifact...");
    let artifact_path = workspace::extract_artifact(workspace, dest)
        .await
        .map_err(|error| error.to_string())?;
    progress(tx, Stage::Extract, "Build finished successfully!");

    Ok(TerminalResult::Success {
        artifact_path,
        containing_dir: dest.to_path_buf(),
    })
}

/// Runs one external stage. Returns `Some(abort)` when the stage failed
/// or was cancelled, `None` when the build should continue.
///
/// The cancellation flag is the idempotency guard for the race between a
/// killed process's non-zero exit and the user's cancel request: if the
/// flag is set by the time the process exits, the abort is reported as
/// user-initiated with no error text.
async fn run_stage(
    spec: &CommandSpec,
    workspace: &std::path::Path,
    session: &SessionRefs,
) -> Option<TerminalResult> {
    if session.cancelled() {
        return Some(TerminalResult::user_cancelled());
    }
    let mut tail = ErrorTail::new(ERROR_TAIL_LINES);
    let code = run_streaming(spec, workspace, &session.pid, &session.cancel, &mut tail).await;

    if session.cancelled() {
        return Some(TerminalResult::user_cancelled());
    }
    if code != 0 {
        return Some(TerminalResult::failed(format!(
            "{} exit code {code}\n\n{tail}",
            spec.label
        )));
    }
    None
}
