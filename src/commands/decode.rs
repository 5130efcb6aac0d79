//! Decode command - extract a hidden message from an image.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use pixhide::config::Config;
use pixhide::stego::DecoyCodec;
use pixhide::{Carrier, Codec, CodecParams};

use super::{resolve_codec, resolve_params, CommandExecutor};

/// Extract a hidden message from an image.
///
/// Use -o/--output to write raw bytes to a file (required for binary data).
/// Without -o, output is printed as text (lossy UTF-8 conversion).
/// The `not` codec hides an image, which is always saved to --output as PNG.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Encoded image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Codec short name used for encoding
    #[arg(short, long)]
    pub codec: Option<String>,

    /// Output file for decoded data
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Codec parameter as NAME=VALUE (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, config: &Config) -> Result<()> {
        let codec = resolve_codec(self.codec.as_deref(), config)?;
        let params = resolve_params(codec, config, &self.params)?;

        let hides_image = codec.short_name() == DecoyCodec::default().short_name();
        if hides_image && self.output.is_none() {
            bail!("The {} codec hides an image, use -o/--output to save it", codec.short_name());
        }

        let carrier = Carrier::open(&self.input)
            .with_context(|| format!("Failed to read image {}", self.input.display()))?;
        info!(codec = codec.short_name(), mode = %carrier.mode(), "decoding");

        match &self.output {
            Some(path) if hides_image => recover_image(&carrier, &params, path),
            Some(path) => {
                let decoded = decode(codec, &carrier, &params)?;
                std::fs::write(path, &decoded)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Decoded {} bytes to {}", decoded.len(), path.display());
                Ok(())
            }
            None => {
                let decoded = decode(codec, &carrier, &params)?;
                println!("{}", String::from_utf8_lossy(&decoded));
                Ok(())
            }
        }
    }
}

fn decode(codec: &dyn Codec, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>> {
    codec
        .decode(carrier, params)
        .with_context(|| format!("{} decoding failed", codec.display_name()))
}

fn recover_image(carrier: &Carrier, params: &CodecParams, path: &Path) -> Result<()> {
    let recovered = DecoyCodec::default()
        .recover(carrier, params)
        .context("Failed to recover the hidden image")?;
    recovered
        .save_png(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    eprintln!(
        "Recovered {}x{} image to {}",
        recovered.width(),
        recovered.height(),
        path.display()
    );
    Ok(())
}
