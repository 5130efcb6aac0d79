//! Encode command - hide a message or file in an image.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use pixhide::config::Config;
use pixhide::Carrier;

use super::{resolve_codec, resolve_params, CommandExecutor};

/// Hide a message inside an image.
///
/// The message comes from --message, --file, or stdin when neither is given.
/// The output is always written as PNG, whatever its extension says, since
/// lossy formats destroy the embedded bits.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Carrier image (PNG, BMP, JPEG or WebP; read as 8-bit samples)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the encoded PNG
    #[arg(short, long)]
    pub output: PathBuf,

    /// Codec short name (see `pixhide codecs`)
    #[arg(short, long)]
    pub codec: Option<String>,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File whose bytes to hide (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Codec parameter as NAME=VALUE (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, config: &Config) -> Result<()> {
        let codec = resolve_codec(self.codec.as_deref(), config)?;
        let params = resolve_params(codec, config, &self.params)?;

        let message = self.read_message()?;
        let carrier = Carrier::open(&self.input)
            .with_context(|| format!("Failed to read carrier image {}", self.input.display()))?;
        info!(
            codec = codec.short_name(),
            width = carrier.width(),
            height = carrier.height(),
            mode = %carrier.mode(),
            bytes = message.len(),
            "encoding"
        );

        let encoded = codec
            .encode(&carrier, &message, &params)
            .with_context(|| format!("{} encoding failed", codec.display_name()))?;

        encoded
            .save_png(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        eprintln!(
            "Encoded {} bytes with {} into {} ({}x{})",
            message.len(),
            codec.short_name(),
            self.output.display(),
            encoded.width(),
            encoded.height()
        );
        Ok(())
    }
}

impl EncodeCommand {
    fn read_message(&self) -> Result<Vec<u8>> {
        if let Some(text) = &self.message {
            return Ok(text.as_bytes().to_vec());
        }

        if let Some(path) = &self.file {
            return std::fs::read(path)
                .with_context(|| format!("Failed to read message file {}", path.display()));
        }

        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read message from stdin")?;
        Ok(buffer)
    }
}
