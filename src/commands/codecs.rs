//! Codecs command - list the available codecs and their parameters.

use anyhow::Result;
use clap::Args;

use pixhide::config::Config;
use pixhide::{codecs, Codec, CodecParam, ParamDefault};

use super::CommandExecutor;

/// List available codecs with their parameters.
#[derive(Args, Debug)]
pub struct CodecsCommand {
    /// Only show this codec
    pub name: Option<String>,
}

impl CommandExecutor for CodecsCommand {
    fn execute(&self, config: &Config) -> Result<()> {
        let selected: Vec<&dyn Codec> = match &self.name {
            Some(name) => vec![pixhide::find_codec(name)?],
            None => codecs().to_vec(),
        };

        for codec in selected {
            print!("{}", describe(codec, config.codec.as_deref()));
        }
        Ok(())
    }
}

fn describe_default(default: ParamDefault) -> Option<String> {
    match default {
        ParamDefault::None => None,
        ParamDefault::Bool(b) => Some(b.to_string()),
        ParamDefault::Int(i) => Some(i.to_string()),
        ParamDefault::Str(s) => Some(format!("\"{}\"", s)),
    }
}

fn describe_param(param: &CodecParam, scope: &str) -> String {
    let mut line = format!("    {:<10} {:<7}", param.name, param.kind.to_string());
    if param.required {
        line.push_str(" required");
    }
    if let Some(default) = describe_default(param.default) {
        line.push_str(&format!(" default={}", default));
    }
    if let Some((min, max)) = param.range {
        line.push_str(&format!(" range={}..={}", min, max));
    }
    if !scope.is_empty() {
        line.push_str(&format!(" ({} only)", scope));
    }
    line.push_str(&format!("\n        {}\n", param.help));
    line
}

fn describe(codec: &dyn Codec, configured: Option<&str>) -> String {
    let marker = if configured == Some(codec.short_name()) { " [default]" } else { "" };
    let modes: Vec<&str> = codec.accepted_modes().iter().map(|m| m.name()).collect();

    let mut out = format!(
        "{} - {}{}\n  {}\n  modes: {}\n",
        codec.short_name(),
        codec.display_name(),
        marker,
        codec.help(),
        modes.join(", ")
    );

    let schema = codec.params();
    if schema.common.is_empty() && schema.encode.is_empty() && schema.decode.is_empty() {
        out.push_str("  no parameters\n");
    } else {
        out.push_str("  parameters:\n");
        for param in schema.common {
            out.push_str(&describe_param(param, ""));
        }
        for param in schema.encode {
            out.push_str(&describe_param(param, "encode"));
        }
        for param in schema.decode {
            out.push_str(&describe_param(param, "decode"));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixhide::find_codec;

    #[test]
    fn test_describe_lsb() {
        let text = describe(find_codec("lsb").unwrap(), None);
        assert!(text.starts_with("lsb - LSB\n"));
        assert!(text.contains("modes: L, LA, RGB, RGBA"));
        assert!(text.contains("default=1 range=1..=8"));
        assert!(text.contains("msb"));
    }

    #[test]
    fn test_describe_marks_configured_default() {
        let text = describe(find_codec("ssdb").unwrap(), Some("ssdb"));
        assert!(text.starts_with("ssdb - Seed Spaced [default]"));
        assert!(text.contains("password   string  required"));
    }

    #[test]
    fn test_describe_codec_without_params() {
        let text = describe(find_codec("edges").unwrap(), None);
        assert!(text.contains("no parameters"));
        assert!(text.contains("modes: RGB, RGBA"));
    }
}
