//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments, sets up file logging
//! and runs the selected command.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    " ",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "dggterm")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal client for destiny.gg-style chat rooms")]
#[command(
    long_about = "dggterm is a full-screen terminal chat client. It connects to a \
destiny.gg-style websocket chat, waits for the room's user list, then shows the \
live transcript next to the list of users.\n\n\
Configuration:\n\
  Settings are read from config.toml in the platform config directory, or from\n\
  the file given with --config. Run 'dggterm config' to see the resolved values.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Up/Down           Browse previously sent lines\n\
  PgUp/PgDn         Scroll the transcript\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /help             Show commands and keys\n\
  /users            Refresh the user list\n\
  /clear            Clear the transcript\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the log to this file instead of the cache directory
    #[arg(short = 'l', long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Print the configuration file location and resolved settings
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let (config, config_path) = match Config::resolve(args.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Config => {
            println!("Config file: {}", path_display(&config_path));
            config.print_all();
            Ok(())
        }
        Commands::Chat => {
            let log_path = args.log_file.or_else(Config::default_log_path);
            if let Some(log_path) = &log_path {
                init_logging(log_path, args.verbose)?;
            }
            info!(
                config = %path_display(&config_path),
                url = config.url(),
                "starting dggterm"
            );

            if let Err(err) = run_chat(config).await {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Default filter directive; `RUST_LOG` takes precedence when set.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "dggterm=debug,info"
    } else {
        "info"
    }
}

/// Route tracing output to `path`. The terminal is owned by the UI, so
/// nothing is ever logged to stdout or stderr.
fn init_logging(path: &Path, verbose: bool) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}
