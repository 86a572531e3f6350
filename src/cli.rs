//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Package a website URL into a standalone desktop application.
///
/// Sitewrap scaffolds a minimal wrapper project for the given URL,
/// resolves an icon, runs the packaging toolchain, and copies the built
/// executable into the destination directory.
#[derive(Parser, Debug)]
#[command(name = "sitewrap")]
#[command(author, version, about)]
pub struct Args {
    /// Website URL to package
    pub url: Option<String>,

    /// Display name of the produced application
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory the built executable is copied into
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Read the full build configuration from a JSON file
    /// (overrides the individual window/name/url flags)
    #[arg(long, conflicts_with_all = ["url", "name", "icon"])]
    pub config: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(200..=10000))]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 768, value_parser = clap::value_parser!(u32).range(200..=10000))]
    pub height: u32,

    /// Make the window non-resizable
    #[arg(long)]
    pub fixed_size: bool,

    /// Disable the minimize control
    #[arg(long)]
    pub no_minimize: bool,

    /// Disable the maximize control
    #[arg(long)]
    pub no_maximize: bool,

    /// Hide page scrollbars in the generated app (wheel scrolling stays)
    #[arg(long)]
    pub no_scrollbar: bool,

    /// Use a frameless window with a generated custom titlebar
    #[arg(long)]
    pub frameless: bool,

    /// Dark titlebar chrome (frameless mode only)
    #[arg(long)]
    pub dark_titlebar: bool,

    /// Stroke color for the titlebar button icons, e.g. "#6b7280"
    #[arg(long)]
    pub titlebar_color: Option<String>,

    /// Icon file (.ico) used instead of the site favicon
    #[arg(long)]
    pub icon: Option<PathBuf>,

    /// Skip the DNS reachability warning for the target host
    #[arg(long)]
    pub skip_dns_check: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal_invocation_parses() {
        let args =
            Args::try_parse_from(["sitewrap", "https://example.com", "-n", "Demo", "-d", "out"])
                .unwrap();
        assert_eq!(args.url.as_deref(), Some("https://example.com"));
        assert_eq!(args.name.as_deref(), Some("Demo"));
        assert_eq!(args.dest, PathBuf::from("out"));
        assert_eq!(args.width, 1024);
        assert!(!args.frameless);
    }

    #[test]
    fn test_cli_dest_is_required() {
        let result = Args::try_parse_from(["sitewrap", "https://example.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_conflicts_with_url() {
        let result = Args::try_parse_from([
            "sitewrap",
            "https://example.com",
            "--config",
            "build.json",
            "-d",
            "out",
        ]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_cli_window_flags() {
        let args = Args::try_parse_from([
            "sitewrap",
            "https://example.com",
            "-n",
            "Demo",
            "-d",
            "out",
            "--width",
            "800",
            "--height",
            "600",
            "--fixed-size",
            "--no-scrollbar",
            "--frameless",
            "--dark-titlebar",
        ])
        .unwrap();
        assert_eq!(args.width, 800);
        assert_eq!(args.height, 600);
        assert!(args.fixed_size);
        assert!(args.no_scrollbar);
        assert!(args.frameless);
        assert!(args.dark_titlebar);
    }

    #[test]
    fn test_cli_width_range_is_enforced() {
        let result = Args::try_parse_from([
            "sitewrap",
            "https://example.com",
            "-n",
            "Demo",
            "-d",
            "out",
            "--width",
            "10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from([
            "sitewrap",
            "https://example.com",
            "-n",
            "Demo",
            "-d",
            "out",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
    }
}
