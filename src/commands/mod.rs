//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod codecs;
mod decode;
mod encode;

pub use codecs::CodecsCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use anyhow::{Context, Result};
use tracing::debug;

use pixhide::config::Config;
use pixhide::{find_codec, Codec, CodecParams};

/// Codec used when neither `--codec` nor the config file names one.
pub const DEFAULT_CODEC: &str = "lsb";

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and the loaded config.
    fn execute(&self, config: &Config) -> Result<()>;
}

/// Picks the codec from the command line, then the config, then the default.
pub fn resolve_codec(requested: Option<&str>, config: &Config) -> Result<&'static dyn Codec> {
    let name = requested
        .or(config.codec.as_deref())
        .unwrap_or(DEFAULT_CODEC);
    Ok(find_codec(name)?)
}

/// Layers `--param` assignments over the config's values for `codec`.
pub fn resolve_params(
    codec: &dyn Codec,
    config: &Config,
    assignments: &[String],
) -> Result<CodecParams> {
    let mut params = config.params_for(codec.short_name());
    let schema = codec.params();

    let mut overrides = CodecParams::new();
    for assignment in assignments {
        overrides
            .parse_assignment(&schema, assignment)
            .with_context(|| format!("Invalid --param '{}'", assignment))?;
    }
    params.merge(overrides);

    debug!(codec = codec.short_name(), params = ?params, "resolved codec parameters");
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixhide::ParamValue;

    #[test]
    fn test_resolve_codec_precedence() {
        let mut config = Config::default();
        assert_eq!(resolve_codec(None, &config).unwrap().short_name(), "lsb");

        config.codec = Some("ssdb".to_string());
        assert_eq!(resolve_codec(None, &config).unwrap().short_name(), "ssdb");
        assert_eq!(resolve_codec(Some("edges"), &config).unwrap().short_name(), "edges");
        assert!(resolve_codec(Some("nope"), &config).is_err());
    }

    #[test]
    fn test_cli_params_override_config() {
        let mut config = Config::default();
        config.set_param("lsb", "bits", 2);
        config.set_param("lsb", "msb", true);

        let codec = find_codec("lsb").unwrap();
        let params = resolve_params(codec, &config, &["bits=4".to_string()]).unwrap();
        assert_eq!(params.get("bits"), Some(&ParamValue::Int(4)));
        assert_eq!(params.get("msb"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_unknown_cli_param() {
        let codec = find_codec("edges").unwrap();
        assert!(resolve_params(codec, &Config::default(), &["bits=1".to_string()]).is_err());
    }
}
