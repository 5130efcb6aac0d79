//! pixhide - hide bytes in the pixels of an image
//!
//! A thin command-line front end over the codec library.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CodecsCommand, CommandExecutor, DecodeCommand, EncodeCommand};
use pixhide::config::Config;

/// pixhide - hide bytes in the pixels of an image
///
/// Several interchangeable codecs are available; run `pixhide codecs` to list
/// them with their parameters. Encoded images are always written as PNG.
#[derive(Parser)]
#[command(name = "pixhide")]
#[command(version)]
#[command(about = "Image steganography with interchangeable codecs")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of ~/.pixhide/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message inside an image
    Encode(EncodeCommand),

    /// Extract a hidden message from an image
    Decode(DecodeCommand),

    /// List available codecs and their parameters
    Codecs(CodecsCommand),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load().context("Failed to load ~/.pixhide/config.toml"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Encode(cmd) => cmd.execute(&config),
        Commands::Decode(cmd) => cmd.execute(&config),
        Commands::Codecs(cmd) => cmd.execute(&config),
    }
}
