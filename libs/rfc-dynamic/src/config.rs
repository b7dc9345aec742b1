use serde::Deserialize;

use crate::error::DynamicError;

/// Extraction settings shared by every view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractConfig {
    /// Initial buffer for character fields, in UTF-16 code units.
    /// Longer values cost one extra length query and one retry.
    #[serde(default = "default_string_buffer_len")]
    pub string_buffer_len: usize,

    /// Initial buffer for byte fields, in bytes.
    #[serde(default = "default_bytes_buffer_len")]
    pub bytes_buffer_len: usize,

    /// Decode initial dates (`00000000` or blanks) and blank times as
    /// [`Value::Absent`](crate::value::Value::Absent) instead of failing.
    #[serde(default = "default_null_initial_dates")]
    pub null_initial_dates: bool,
}

fn default_string_buffer_len() -> usize {
    256
}

fn default_bytes_buffer_len() -> usize {
    256
}

fn default_null_initial_dates() -> bool {
    true
}

impl ExtractConfig {
    pub const DEFAULT: ExtractConfig = ExtractConfig {
        string_buffer_len: 256,
        bytes_buffer_len: 256,
        null_initial_dates: true,
    };

    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, DynamicError> {
        let content = std::fs::read_to_string(path).map_err(|e| DynamicError::from(e).with_context(path))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, DynamicError> {
        toml::from_str(toml_str).map_err(|e| DynamicError::Config(e.to_string()))
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
