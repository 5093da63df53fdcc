// ============================================================
// DIALECT CONFIGURATION
// ============================================================
// Parsing options controlling how bytes are tokenized into fields

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, TapError};

/// Raw dialect options as they appear in a stream's configuration.
/// Every option is optional; missing ones take the documented default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialectOptions {
    /// Field separator (default: `,`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    /// Whether `""` inside a quoted field is a literal quote (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doublequote: Option<bool>,

    /// Escape character used when doublequote is off (default: none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escapechar: Option<String>,

    /// Field quoting character (default: `"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotechar: Option<String>,

    /// Ignore whitespace right after a delimiter (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipinitialspace: Option<bool>,

    /// Malformed byte policy (default: false, i.e. strict)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_errors: Option<EncodingErrorsSetting>,

    /// Thousands-grouping character for numeric fields (default: none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thousands: Option<String>,

    /// Decimal-point character for numeric fields (default: `.`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal: Option<String>,

    /// Text encoding label (default: utf-8)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// `encoding_errors` accepts either a flag or a policy name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodingErrorsSetting {
    Flag(bool),
    Policy(String),
}

/// What to do with byte sequences the configured encoding cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingErrors {
    /// Fail the read with a row parse error
    #[default]
    Strict,

    /// Substitute U+FFFD for each malformed sequence
    Replace,

    /// Drop malformed sequences
    Ignore,
}

impl EncodingErrors {
    fn from_setting(setting: &EncodingErrorsSetting) -> Result<Self> {
        match setting {
            EncodingErrorsSetting::Flag(false) => Ok(EncodingErrors::Strict),
            EncodingErrorsSetting::Flag(true) => Ok(EncodingErrors::Replace),
            EncodingErrorsSetting::Policy(policy) => match policy.to_ascii_lowercase().as_str() {
                "strict" | "false" => Ok(EncodingErrors::Strict),
                "replace" | "true" => Ok(EncodingErrors::Replace),
                "ignore" => Ok(EncodingErrors::Ignore),
                other => Err(TapError::Config(format!(
                    "encoding_errors must be one of strict, replace, ignore (got '{}')",
                    other
                ))),
            },
        }
    }
}

/// Frozen, validated dialect shared read-only by schema inference and
/// record streaming.
#[derive(Debug, Clone)]
pub struct DialectConfig {
    pub delimiter: u8,
    pub doublequote: bool,
    pub escapechar: Option<u8>,
    pub quotechar: u8,
    pub skipinitialspace: bool,
    pub encoding_errors: EncodingErrors,
    pub thousands: Option<u8>,
    pub decimal: u8,
    pub encoding: &'static Encoding,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            doublequote: true,
            escapechar: None,
            quotechar: b'"',
            skipinitialspace: false,
            encoding_errors: EncodingErrors::Strict,
            thousands: None,
            decimal: b'.',
            encoding: UTF_8,
        }
    }
}

impl DialectConfig {
    /// Resolve raw options into a dialect, applying defaults and
    /// rejecting values the parser cannot honor.
    pub fn resolve(options: &DialectOptions) -> Result<Self> {
        let defaults = Self::default();

        let delimiter = optional_char("delimiter", options.delimiter.as_deref())?
            .unwrap_or(defaults.delimiter);
        let quotechar = optional_char("quotechar", options.quotechar.as_deref())?
            .unwrap_or(defaults.quotechar);
        let escapechar = optional_char("escapechar", options.escapechar.as_deref())?;
        let thousands = optional_char("thousands", options.thousands.as_deref())?;
        let decimal =
            optional_char("decimal", options.decimal.as_deref())?.unwrap_or(defaults.decimal);

        if delimiter == quotechar {
            return Err(TapError::Config(
                "delimiter and quotechar must be different characters".to_string(),
            ));
        }
        if thousands == Some(decimal) {
            return Err(TapError::Config(
                "thousands and decimal must be different characters".to_string(),
            ));
        }

        let encoding = match options.encoding.as_deref() {
            Some(label) => resolve_encoding(label)?,
            None => defaults.encoding,
        };

        let encoding_errors = match &options.encoding_errors {
            Some(setting) => EncodingErrors::from_setting(setting)?,
            None => defaults.encoding_errors,
        };

        Ok(Self {
            delimiter,
            doublequote: options.doublequote.unwrap_or(defaults.doublequote),
            escapechar,
            quotechar,
            skipinitialspace: options.skipinitialspace.unwrap_or(defaults.skipinitialspace),
            encoding_errors,
            thousands,
            decimal,
            encoding,
        })
    }

    /// Whether numeric-looking fields get rewritten to canonical text
    pub fn normalizes_numbers(&self) -> bool {
        self.thousands.is_some() || self.decimal != b'.'
    }
}

fn optional_char(option: &str, value: Option<&str>) -> Result<Option<u8>> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(Some(*byte)),
        _ => Err(TapError::Config(format!(
            "{} must be a single ASCII character (got {:?})",
            option, value
        ))),
    }
}

fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| TapError::Config(format!("Unknown encoding '{}'", label)))?;

    // Byte-level tokenizing only works when delimiters and quotes keep
    // their ASCII byte values.
    if !encoding.is_ascii_compatible() {
        return Err(TapError::Config(format!(
            "Encoding '{}' is not ASCII-compatible and cannot be parsed as delimited text",
            encoding.name()
        )));
    }

    Ok(encoding)
}
