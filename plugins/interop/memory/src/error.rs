use rfc_api::{RfcErrorInfo, RfcType};

/// Failure while building arena content or loading a fixture.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The arena rejected the operation the way the native library would.
    #[error("{0}")]
    Native(#[from] RfcErrorInfo),

    #[error("field '{field}' of type {ty} cannot hold a {value} value")]
    TypeMismatch {
        field: String,
        ty: RfcType,
        value: &'static str,
    },

    #[error("field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MemoryError>,
    },
}

impl MemoryError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Add context to the error. Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MemoryError::Fixture(msg) => MemoryError::Fixture(format!("{ctx}: {msg}")),
            other => MemoryError::Context {
                context: ctx.to_string(),
                source: Box::new(other),
            },
        }
    }
}
