//! Build configuration: everything the caller supplies for one session.
//!
//! The config is immutable once a build starts. It mirrors the JSON shape a
//! GUI front end would send, so all types are serde-derived.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Window geometry and behavior for the generated application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Initial content width in pixels (used until a persisted size exists).
    pub width: u32,
    /// Initial content height in pixels.
    pub height: u32,
    /// Whether the window may be resized.
    pub resizable: bool,
    /// Whether the window may be minimized.
    pub minimizable: bool,
    /// Whether the window may be maximized.
    pub maximizable: bool,
    /// Suppress page scrollbars in the generated app (wheel scrolling stays
    /// functional).
    pub no_scrollbar: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            resizable: true,
            minimizable: true,
            maximizable: true,
            no_scrollbar: false,
        }
    }
}

/// Color theme for the custom titlebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlebarTheme {
    #[default]
    Light,
    Dark,
}

/// Titlebar button roles; used as deterministic asset file name keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonRole {
    Back,
    Forward,
    Reload,
    Minimize,
    Maximize,
    Restore,
    Close,
}

impl ButtonRole {
    /// Stable lowercase name used in generated asset file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Reload => "reload",
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
            Self::Restore => "restore",
            Self::Close => "close",
        }
    }
}

/// Container format of a user-supplied titlebar button image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Ico,
}

impl AssetFormat {
    /// File extension for generated asset names.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Ico => "ico",
        }
    }
}

/// A user-supplied image for one titlebar button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonAsset {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Container format, decides the generated file extension.
    pub format: AssetFormat,
}

/// Custom-titlebar configuration (only meaningful in frameless mode).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlebarOptions {
    /// Light or dark topbar chrome.
    pub theme: TitlebarTheme,
    /// Stroke color for the built-in SVG button icons.
    pub color: Option<String>,
    /// Per-button image overrides; buttons without an entry fall back to
    /// the built-in SVG icons.
    pub assets: HashMap<ButtonRole, ButtonAsset>,
}

/// Window frame mode for the generated application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FrameMode {
    /// Native OS window chrome; the site loads directly in the window.
    System,
    /// Frameless window with a generated custom titlebar hosting the site
    /// in an embedded view.
    Custom(TitlebarOptions),
}

/// A user-supplied icon image, normalized at ingestion.
///
/// This is the single canonical binary payload type at the boundary:
/// whatever shape the front end hands over (file read, buffer, upload) is
/// converted to this once, and a present-but-empty buffer is rejected here
/// rather than checked at every consumption site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconPayload(Vec<u8>);

impl IconPayload {
    /// Wraps raw icon bytes; returns `None` for an empty buffer so an
    /// empty upload degrades to favicon resolution.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() { None } else { Some(Self(bytes)) }
    }

    /// The raw image bytes; never empty.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Immutable input for one build session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Website to package.
    pub url: String,
    /// Display name of the produced application.
    pub name: String,
    /// Window geometry and behavior flags.
    #[serde(default)]
    pub window: WindowOptions,
    /// System chrome or generated custom titlebar.
    pub frame: FrameMode,
    /// Explicit icon; always wins over favicon fetching when present.
    #[serde(default)]
    pub icon: Option<IconPayload>,
}
