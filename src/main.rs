//! retouch command-line entry point.

mod cli;

use std::path::PathBuf;

use clap::Parser;
use retouch::{Settings, logging};

use cli::commands::{init, listen, touch, watch};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });

    logging::init_with_config(&settings.logging);

    if let Err(e) = run(cli.command, &mut settings).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: &mut Settings) -> anyhow::Result<()> {
    match command {
        Commands::Init { force } => init::run_init(force),

        Commands::Config => init::run_config(settings),

        Commands::Touch { sentinel } => {
            apply_sentinel(settings, sentinel);
            touch::run_touch(&settings.watch.sentinel_path)
        }

        Commands::Watch {
            paths,
            extensions,
            excluded,
            debounce_ms,
            sentinel,
        } => {
            apply_sentinel(settings, sentinel);
            apply_paths(settings, paths);
            if let Some(ms) = debounce_ms {
                settings.watch.debounce_ms = ms;
            }
            if !extensions.is_empty() {
                settings.watch.extensions = extensions;
            }
            if !excluded.is_empty() {
                settings.watch.excluded = excluded;
            }
            watch::run_watch(settings.watch_config()?).await
        }

        Commands::Listen {
            paths,
            debounce_ms,
            sentinel,
        } => {
            apply_sentinel(settings, sentinel);
            apply_paths(settings, paths);
            if let Some(ms) = debounce_ms {
                settings.watch.debounce_ms = ms;
            }
            listen::run_listen(settings.watch_config()?).await
        }
    }
}

fn apply_sentinel(settings: &mut Settings, sentinel: Option<PathBuf>) {
    if let Some(path) = sentinel {
        settings.watch.sentinel_path = path;
    }
}

fn apply_paths(settings: &mut Settings, paths: Vec<PathBuf>) {
    if !paths.is_empty() {
        settings.watch.paths = paths;
    }
}
