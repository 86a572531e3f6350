//! Sitewrap Core Library
//!
//! This library packages an arbitrary website URL into a standalone
//! desktop application: it scaffolds a minimal wrapper project, resolves
//! an icon, runs the external install and packaging tools, and extracts
//! the built executable.
//!
//! # Architecture
//!
//! - [`orchestrator`] - single-flight build state machine with progress
//!   events and cancellation
//! - [`process`] - streaming external command runner and process-tree
//!   termination
//! - [`workspace`] - per-session temporary directory lifecycle and
//!   artifact extraction
//! - [`icon`] - best-effort favicon/custom icon resolution
//! - [`scaffold`] - generation of the wrapped application's project files
//! - [`config`] / [`events`] - the build input and event data model

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod events;
pub mod icon;
pub mod net;
pub mod orchestrator;
pub mod picker;
pub mod process;
pub mod scaffold;
pub mod workspace;

// Re-export commonly used types
pub use config::{
    AssetFormat, BuildConfig, ButtonAsset, ButtonRole, FrameMode, IconPayload, TitlebarOptions,
    TitlebarTheme, WindowOptions,
};
pub use events::{BuildEvent, ProgressEvent, Stage, TerminalResult};
pub use icon::{IconOutcome, IconResolver};
pub use orchestrator::{ERROR_TAIL_LINES, Orchestrator, OrchestratorError, ToolCommands};
pub use picker::{CancelledPicker, DestinationPicker, FixedDestination};
pub use process::{CommandSpec, ErrorTail};
