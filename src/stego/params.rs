//! Codec parameter schemas and caller-supplied parameter values.
//!
//! Each codec declares its tunable knobs as [`CodecParam`] records grouped in
//! a [`ParamSchema`]. Callers pass values in a [`CodecParams`] map; codecs read
//! them back through typed lookups that apply defaults, enforce required
//! parameters and check numeric ranges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::CodecError;

/// Value type of a codec parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    String,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Compile-time default of a codec parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    None,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl ParamDefault {
    fn value(self) -> Option<ParamValue> {
        match self {
            Self::None => None,
            Self::Bool(b) => Some(ParamValue::Bool(b)),
            Self::Int(i) => Some(ParamValue::Int(i)),
            Self::Str(s) => Some(ParamValue::Str(s.to_string())),
        }
    }
}

/// A concrete parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Parses a textual value (CLI or form input) as the given type.
    pub fn parse(kind: ParamType, name: &str, raw: &str) -> Result<Self, CodecError> {
        match kind {
            ParamType::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Self::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Self::Bool(false)),
                other => Err(CodecError::invalid_parameter(
                    name,
                    format!("'{}' is not a boolean", other),
                )),
            },
            ParamType::Int => raw.trim().parse::<i64>().map(Self::Int).map_err(|_| {
                CodecError::invalid_parameter(name, format!("'{}' is not an integer", raw))
            }),
            ParamType::String => Ok(Self::Str(raw.to_string())),
        }
    }

    pub fn kind(&self) -> ParamType {
        match self {
            Self::Bool(_) => ParamType::Bool,
            Self::Int(_) => ParamType::Int,
            Self::Str(_) => ParamType::String,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Declaration of one tunable knob of a codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecParam {
    pub name: &'static str,
    pub kind: ParamType,
    pub default: ParamDefault,
    pub required: bool,
    pub help: &'static str,
    /// Inclusive bounds for integer parameters.
    pub range: Option<(i64, i64)>,
}

/// A codec's parameters, split by the direction they apply to.
#[derive(Debug, Clone, Copy)]
pub struct ParamSchema {
    /// Applicable to both encode and decode.
    pub common: &'static [CodecParam],
    pub encode: &'static [CodecParam],
    pub decode: &'static [CodecParam],
}

impl ParamSchema {
    pub const EMPTY: ParamSchema = ParamSchema {
        common: &[],
        encode: &[],
        decode: &[],
    };

    /// Parameters accepted by `encode`.
    pub fn for_encode(&self) -> impl Iterator<Item = &'static CodecParam> {
        self.common.iter().chain(self.encode.iter())
    }

    /// Parameters accepted by `decode`.
    pub fn for_decode(&self) -> impl Iterator<Item = &'static CodecParam> {
        self.common.iter().chain(self.decode.iter())
    }

    /// Looks a parameter up by name in any group.
    pub fn find(&self, name: &str) -> Option<&'static CodecParam> {
        self.common
            .iter()
            .chain(self.encode.iter())
            .chain(self.decode.iter())
            .find(|param| param.name == name)
    }
}

/// Parameter values supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecParams {
    values: BTreeMap<String, ParamValue>,
}

impl CodecParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// Overlays `other` on top of these values.
    pub fn merge(&mut self, other: CodecParams) {
        self.values.extend(other.values);
    }

    /// Parses a `name=value` assignment, typing the value from `schema`.
    pub fn parse_assignment(
        &mut self,
        schema: &ParamSchema,
        assignment: &str,
    ) -> Result<(), CodecError> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            CodecError::invalid_parameter(assignment, "expected NAME=VALUE")
        })?;
        let name = name.trim();
        let param = schema
            .find(name)
            .ok_or_else(|| CodecError::invalid_parameter(name, "not accepted by this codec"))?;

        let value = ParamValue::parse(param.kind, name, raw)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Checks that every supplied value is declared by `accepted` and has the
    /// declared type.
    pub fn validate<'a>(
        &self,
        accepted: impl IntoIterator<Item = &'a CodecParam>,
    ) -> Result<(), CodecError> {
        let accepted: Vec<&CodecParam> = accepted.into_iter().collect();

        for (name, value) in &self.values {
            let param = accepted
                .iter()
                .find(|param| param.name == name.as_str())
                .ok_or_else(|| CodecError::invalid_parameter(name, "unexpected parameter"))?;

            if value.kind() != param.kind {
                return Err(CodecError::invalid_parameter(
                    name,
                    format!("expected {}, got {}", param.kind, value.kind()),
                ));
            }
        }

        Ok(())
    }

    fn resolve(&self, param: &CodecParam) -> Result<ParamValue, CodecError> {
        self.values
            .get(param.name)
            .cloned()
            .or_else(|| param.default.value())
            .ok_or_else(|| CodecError::MissingParameter(param.name.to_string()))
    }

    /// Reads a boolean parameter, falling back to its default.
    pub fn bool(&self, param: &CodecParam) -> Result<bool, CodecError> {
        match self.resolve(param)? {
            ParamValue::Bool(b) => Ok(b),
            other => Err(type_mismatch(param, &other)),
        }
    }

    /// Reads an integer parameter, falling back to its default and checking
    /// its declared range.
    pub fn int(&self, param: &CodecParam) -> Result<i64, CodecError> {
        let value = match self.resolve(param)? {
            ParamValue::Int(i) => i,
            other => return Err(type_mismatch(param, &other)),
        };

        if let Some((min, max)) = param.range {
            if value < min || value > max {
                return Err(CodecError::ParameterOutOfRange {
                    name: param.name.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }

        Ok(value)
    }

    /// Reads a string parameter, falling back to its default.
    pub fn string(&self, param: &CodecParam) -> Result<String, CodecError> {
        match self.resolve(param)? {
            ParamValue::Str(s) => Ok(s),
            other => Err(type_mismatch(param, &other)),
        }
    }
}

fn type_mismatch(param: &CodecParam, value: &ParamValue) -> CodecError {
    CodecError::invalid_parameter(
        param.name,
        format!("expected {}, got {}", param.kind, value.kind()),
    )
}
