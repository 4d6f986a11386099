//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Sentinel-file reload trigger
#[derive(Parser)]
#[command(
    name = "retouch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Touch a sentinel file to force a reload",
    long_about = "Watch a sentinel file and source directories; every debounced change yields a fresh reload token.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .retouch directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .retouch/settings.toml")]
    Config,

    /// Update the sentinel timestamp
    #[command(
        about = "Touch the sentinel file to trigger a reload",
        after_help = "Examples:\n  retouch touch\n  retouch touch --sentinel /tmp/app.reload"
    )]
    Touch {
        /// Sentinel file (overrides config)
        #[arg(long, value_name = "PATH")]
        sentinel: Option<PathBuf>,
    },

    /// Companion process: touch the sentinel on every source save
    #[command(
        about = "Watch source directories and touch the sentinel on save",
        after_help = "Examples:\n  retouch watch src\n  retouch watch src assets --ext swift --ext json\n  retouch watch . --exclude build --debounce-ms 250"
    )]
    Watch {
        /// Directories to watch recursively (overrides config)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Extension of interest, repeatable (overrides config)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        /// Path fragment to ignore, repeatable (overrides config)
        #[arg(long = "exclude", value_name = "FRAGMENT")]
        excluded: Vec<String>,

        /// Debounce window in milliseconds (overrides config)
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Sentinel file (overrides config)
        #[arg(long, value_name = "PATH")]
        sentinel: Option<PathBuf>,
    },

    /// Run a coordinator and print each reload token
    #[command(
        about = "Print a new token for every accepted reload",
        long_about = "Run a reload coordinator with the active settings and print each new token on stdout.\nPress Enter to trigger a reload manually; Ctrl-C to exit."
    )]
    Listen {
        /// Source directories to watch (overrides config)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Debounce window in milliseconds (overrides config)
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Sentinel file (overrides config)
        #[arg(long, value_name = "PATH")]
        sentinel: Option<PathBuf>,
    },
}
