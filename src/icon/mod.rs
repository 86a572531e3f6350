//! Best-effort icon resolution for the generated application.
//!
//! Precedence, first success wins:
//! 1. user-supplied icon bytes, written verbatim;
//! 2. high-resolution favicon from a proxy service, wrapped into an ICO
//!    container;
//! 3. the site's own `/favicon.ico`, written unconverted;
//! 4. no icon.
//!
//! Every step degrades silently to the next: a missing icon only affects
//! icon quality, never the build outcome.

mod ico;

pub use ico::{IcoWrapError, wrap_png_in_ico};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::IconPayload;

/// Icon file name inside the workspace.
pub const ICON_FILE_NAME: &str = "icon.ico";

/// Default high-resolution favicon proxy.
const FAVICON_PROXY_BASE: &str = "https://www.google.com/s2/favicons";

/// Requested favicon size in pixels.
const FAVICON_SIZE: u32 = 256;

/// Redirect hop ceiling for icon fetches.
const MAX_REDIRECTS: usize = 10;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Which policy branch produced the icon (drives the progress message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconOutcome {
    /// User-supplied bytes written verbatim.
    Custom,
    /// Proxy favicon fetched and wrapped into an ICO container.
    FaviconConverted,
    /// Site's `/favicon.ico` fetched and written unconverted.
    FaviconDirect,
    /// All branches failed; the build proceeds without an icon.
    NotFound,
}

impl IconOutcome {
    /// Progress-log wording for this branch.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Custom => "Using custom icon",
            Self::FaviconConverted => "Using site favicon",
            Self::FaviconDirect => "Using site favicon (favicon.ico)",
            Self::NotFound => "No icon found, continuing without one",
        }
    }
}

/// Errors from a single icon fetch attempt.
///
/// Internal to resolution: every variant makes the step fall through to
/// the next policy branch.
#[derive(Debug, Error)]
enum FetchError {
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("redirect loop at {url}")]
    RedirectLoop { url: String },
    #[error("too many redirects starting from {url}")]
    TooManyRedirects { url: String },
    #[error("redirect from {url} without a usable Location")]
    BadRedirect { url: String },
}

/// Resolves an icon for one build session.
pub struct IconResolver {
    /// `None` when HTTP client construction failed; network branches are
    /// then skipped and only a custom icon can succeed.
    client: Option<Client>,
    favicon_proxy_base: String,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IconResolver {
    /// Builds a resolver with the default favicon proxy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_favicon_proxy_base(FAVICON_PROXY_BASE)
    }

    /// Builds a resolver against a custom favicon proxy base URL
    /// (tests point this at a mock server).
    #[must_use]
    pub fn with_favicon_proxy_base(base: impl Into<String>) -> Self {
        // Redirects are followed manually in fetch_bytes so repeat-URL
        // loop detection stays explicit.
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .user_agent(concat!("sitewrap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| {
                warn!(%error, "Icon HTTP client construction failed; favicon fetching disabled");
            })
            .ok();
        Self {
            client,
            favicon_proxy_base: base.into(),
        }
    }

    /// Runs the resolution policy and writes at most one icon file into
    /// `workspace`.
    ///
    /// Returns the written path (if any) and the branch that produced it.
    /// Never fails: all step failures degrade to the next branch.
    pub async fn resolve(
        &self,
        icon: Option<&IconPayload>,
        site_url: &str,
        workspace: &Path,
    ) -> (Option<PathBuf>, IconOutcome) {
        let icon_path = workspace.join(ICON_FILE_NAME);

        if let Some(payload) = icon {
            match tokio::fs::write(&icon_path, payload.as_bytes()).await {
                Ok(()) => return (Some(icon_path), IconOutcome::Custom),
                Err(error) => {
                    warn!(%error, "Custom icon write failed, falling back to favicon");
                }
            }
        }

        let Ok(site) = Url::parse(site_url) else {
            debug!(url = site_url, "Unparseable site URL, no favicon lookup");
            return (None, IconOutcome::NotFound);
        };

        if let Some(host) = site.host_str() {
            let proxy_url = format!(
                "{}?sz={FAVICON_SIZE}&domain={host}",
                self.favicon_proxy_base
            );
            match self.fetch_bytes(&proxy_url).await {
                Ok(png) if !png.is_empty() => match wrap_png_in_ico(&png) {
                    Ok(ico_bytes) => {
                        if tokio::fs::write(&icon_path, &ico_bytes).await.is_ok() {
                            return (Some(icon_path), IconOutcome::FaviconConverted);
                        }
                    }
                    Err(error) => {
                        debug!(%error, "Proxy favicon not wrappable, trying favicon.ico");
                    }
                },
                Ok(_) => debug!("Proxy favicon response was empty"),
                Err(error) => debug!(%error, "Proxy favicon fetch failed, trying favicon.ico"),
            }
        }

        let direct_url = format!("{}/favicon.ico", site.origin().ascii_serialization());
        match self.fetch_bytes(&direct_url).await {
            Ok(ico_bytes) if !ico_bytes.is_empty() => {
                if tokio::fs::write(&icon_path, &ico_bytes).await.is_ok() {
                    return (Some(icon_path), IconOutcome::FaviconDirect);
                }
            }
            Ok(_) => debug!("Direct favicon response was empty"),
            Err(error) => debug!(%error, "Direct favicon fetch failed"),
        }

        (None, IconOutcome::NotFound)
    }

    /// Bounded redirect-following GET: rejects repeated URLs (loops),
    /// caps hop count, and treats any non-2xx as failure. One attempt,
    /// no retries.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let Some(client) = &self.client else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 0,
            });
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut current = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            if !visited.insert(current.clone()) {
                return Err(FetchError::RedirectLoop { url: current });
            }

            let response =
                client
                    .get(&current)
                    .send()
                    .await
                    .map_err(|source| FetchError::Transport {
                        url: current.clone(),
                        source,
                    })?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                let Some(location) = location else {
                    return Err(FetchError::BadRedirect { url: current });
                };
                // Relative Location targets resolve against the current URL.
                let next = Url::parse(&current)
                    .ok()
                    .and_then(|base| base.join(&location).ok())
                    .map_or(location, Into::into);
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    url: current,
                    status: status.as_u16(),
                });
            }

            return response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|source| FetchError::Transport {
                    url: current,
                    source,
                });
        }

        Err(FetchError::TooManyRedirects {
            url: url.to_string(),
        })
    }
}
