use rfc_dynamic::DynamicError;
use rfc_interop_memory::MemoryError;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("fixture: {0}")]
    Fixture(#[from] MemoryError),

    #[error(transparent)]
    Dynamic(#[from] DynamicError),

    #[error("function has no parameter '{0}'")]
    UnknownParameter(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
