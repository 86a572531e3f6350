//! Workspace lifecycle: one isolated temporary directory per build attempt.
//!
//! The workspace holds the generated project and all intermediate build
//! output. It is created fresh for every session and removed on every exit
//! path; removal is best-effort and idempotent so cleanup can never block
//! the terminal result.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Output subdirectory the packaging tool writes artifacts into.
pub const OUTPUT_SUBDIR: &str = "dist";

/// Errors from workspace filesystem operations.
///
/// Only creation, project writes, and artifact extraction can fail;
/// destruction swallows its errors by contract.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Could not allocate the temporary directory.
    #[error("cannot create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Could not write a generated project file.
    #[error("cannot write project file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Could not copy the built artifact out of the workspace.
    #[error("cannot extract artifact to {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One generated file to materialize inside the workspace.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// Path relative to the workspace root.
    pub relative_path: PathBuf,
    /// File contents, written verbatim.
    pub contents: Vec<u8>,
}

impl ProjectFile {
    /// Convenience constructor.
    pub fn new(relative_path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }
}

/// Creates a fresh, uniquely named temporary directory for one session.
///
/// Uniqueness comes from a nanosecond timestamp; on the (rare) collision
/// with a directory left by a rapid prior build, a numeric suffix is
/// appended and the creation retried.
///
/// # Errors
///
/// Returns [`WorkspaceError::Create`] when the directory cannot be made.
pub async fn create_workspace() -> Result<PathBuf, WorkspaceError> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let base = std::env::temp_dir();

    let mut last_error: Option<std::io::Error> = None;
    for attempt in 0..8u32 {
        let name = if attempt == 0 {
            format!("sitewrap_build_{nanos}")
        } else {
            format!("sitewrap_build_{nanos}_{attempt}")
        };
        let path = base.join(name);
        match fs::create_dir(&path).await {
            Ok(()) => {
                debug!(workspace = %path.display(), "Workspace created");
                return Ok(path);
            }
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                last_error = Some(error);
            }
            Err(error) => {
                return Err(WorkspaceError::Create {
                    path,
                    source: error,
                });
            }
        }
    }

    Err(WorkspaceError::Create {
        path: base,
        source: last_error
            .unwrap_or_else(|| std::io::Error::other("workspace name collision persisted")),
    })
}

/// Writes the generated project files into `workspace`.
///
/// Parent directories of nested relative paths are created as needed.
/// Pure file I/O; no build semantics.
///
/// # Errors
///
/// Returns [`WorkspaceError::Write`] on the first failing write.
pub async fn write_project_files(
    workspace: &Path,
    files: &[ProjectFile],
) -> Result<(), WorkspaceError> {
    for file in files {
        let path = workspace.join(&file.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| WorkspaceError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        fs::write(&path, &file.contents)
            .await
            .map_err(|source| WorkspaceError::Write { path, source })?;
    }
    debug!(count = files.len(), "Project files written");
    Ok(())
}

/// Executable suffix the packaging tool produces on this platform.
#[must_use]
pub fn artifact_extension() -> &'static str {
    if cfg!(windows) {
        "exe"
    } else if cfg!(target_os = "macos") {
        "dmg"
    } else {
        "AppImage"
    }
}

/// Scans the workspace's output directory for a built executable and
/// copies the first match into `target_dir`.
///
/// Returns `Ok(None)` when the output directory is missing or holds no
/// file with the expected suffix; a clean tool exit without a findable
/// artifact is not an error. Matches are sorted by name so the result is
/// deterministic.
///
/// # Errors
///
/// Returns [`WorkspaceError::Extract`] when the copy itself fails.
pub async fn extract_artifact(
    workspace: &Path,
    target_dir: &Path,
) -> Result<Option<PathBuf>, WorkspaceError> {
    let output_dir = workspace.join(OUTPUT_SUBDIR);
    let Ok(mut entries) = fs::read_dir(&output_dir).await else {
        debug!(dir = %output_dir.display(), "No output directory to scan");
        return Ok(None);
    };

    let suffix = format!(".{}", artifact_extension());
    let mut matches: Vec<PathBuf> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(&suffix) {
            matches.push(entry.path());
        }
    }
    matches.sort();

    let Some(source) = matches.first() else {
        debug!(dir = %output_dir.display(), "No artifact with expected suffix");
        return Ok(None);
    };

    let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();
    let target = target_dir.join(file_name);
    fs::copy(source, &target)
        .await
        .map_err(|source| WorkspaceError::Extract {
            path: target.clone(),
            source,
        })?;
    debug!(artifact = %target.display(), "Artifact extracted");
    Ok(Some(target))
}

/// Recursively removes the workspace directory tree.
///
/// Idempotent and infallible by contract: a missing path is a no-op and
/// removal failures are logged and swallowed, since cleanup is advisory.
pub async fn destroy_workspace(path: &Path) {
    match fs::remove_dir_all(path).await {
        Ok(()) => debug!(workspace = %path.display(), "Workspace removed"),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            warn!(workspace = %path.display(), %error, "Workspace cleanup failed (ignored)");
        }
    }
}
