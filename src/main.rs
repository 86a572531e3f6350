//! CLI entry point for the sitewrap tool.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use sitewrap_core::{
    BuildConfig, BuildEvent, FixedDestination, FrameMode, IconPayload, Orchestrator,
    TerminalResult, TitlebarOptions, TitlebarTheme, WindowOptions, net,
};
use tracing::{debug, info, warn};
use url::Url;

mod cli;
mod progress;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Sitewrap starting");

    let config = build_config(&args)?;

    if !args.skip_dns_check {
        if let Some(host) = Url::parse(&config.url).ok().and_then(|u| u.host_str().map(String::from))
        {
            if !net::domain_exists(&host).await {
                warn!(host, "Target host does not resolve; the packaged app may show an error page");
            }
        }
    }

    if !args.dest.exists() {
        std::fs::create_dir_all(&args.dest)
            .with_context(|| format!("cannot create destination {}", args.dest.display()))?;
    }

    let orchestrator = Orchestrator::new();
    let picker = Arc::new(FixedDestination::new(args.dest.clone()));
    let mut events = orchestrator
        .start_build(config, picker)
        .context("build could not be started")?;

    let spinner = progress::stage_spinner(!args.quiet && io::stdout().is_terminal());

    let mut terminal = None;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(BuildEvent::Progress(event)) => {
                    if let Some(spinner) = &spinner {
                        spinner.set_message(event.message.clone());
                    }
                    info!(stage = ?event.stage, "{}", event.message);
                }
                Some(BuildEvent::Done(result)) => {
                    terminal = Some(result);
                    break;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Cancellation requested");
                orchestrator.cancel().await;
            }
        }
    }
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    match terminal {
        Some(TerminalResult::Success {
            artifact_path,
            containing_dir,
        }) => {
            match artifact_path {
                Some(path) => info!(artifact = %path.display(), "Build succeeded"),
                None => warn!(
                    dir = %containing_dir.display(),
                    "Build finished but no executable was found in the output"
                ),
            }
            Ok(())
        }
        Some(TerminalResult::Aborted {
            user_initiated: true,
            ..
        }) => {
            info!("Build cancelled");
            Ok(())
        }
        Some(TerminalResult::Aborted {
            error_detail, ..
        }) => {
            bail!(
                "build failed:\n{}",
                error_detail.unwrap_or_else(|| "unknown failure".to_string())
            )
        }
        None => bail!("build event stream closed without a terminal result"),
    }
}

/// Assembles the build configuration from a JSON file or from flags.
fn build_config(args: &Args) -> Result<BuildConfig> {
    if let Some(config_path) = &args.config {
        let raw = std::fs::read(config_path)
            .with_context(|| format!("cannot read config {}", config_path.display()))?;
        let config: BuildConfig = serde_json::from_slice(&raw)
            .with_context(|| format!("invalid config {}", config_path.display()))?;
        return Ok(config);
    }

    let Some(url) = args.url.clone() else {
        bail!("either a URL or --config is required");
    };
    Url::parse(&url).with_context(|| format!("invalid URL: {url}"))?;
    let Some(name) = args.name.clone() else {
        bail!("--name is required when not using --config");
    };

    let icon = match &args.icon {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("cannot read icon {}", path.display()))?;
            let payload = IconPayload::from_bytes(bytes);
            if payload.is_none() {
                warn!(icon = %path.display(), "Icon file is empty, falling back to favicon");
            }
            payload
        }
        None => None,
    };

    let frame = if args.frameless {
        FrameMode::Custom(TitlebarOptions {
            theme: if args.dark_titlebar {
                TitlebarTheme::Dark
            } else {
                TitlebarTheme::Light
            },
            color: args.titlebar_color.clone(),
            assets: std::collections::HashMap::new(),
        })
    } else {
        FrameMode::System
    };

    Ok(BuildConfig {
        url,
        name,
        window: WindowOptions {
            width: args.width,
            height: args.height,
            resizable: !args.fixed_size,
            minimizable: !args.no_minimize,
            maximizable: !args.no_maximize,
            no_scrollbar: args.no_scrollbar,
        },
        frame,
        icon,
    })
}
