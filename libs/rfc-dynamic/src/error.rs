use rfc_api::{RfcErrorInfo, RfcResult, RfcType};

/// Fatal failure of a marshalling operation.
///
/// Soft outcomes (unknown field, value not convertible to the requested
/// kind) are not errors: they surface as `Ok(None)` / `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum DynamicError {
    /// A native call failed; the diagnostic record is kept verbatim.
    #[error("{call} failed: {info}")]
    Native {
        call: &'static str,
        info: RfcErrorInfo,
    },

    /// The marshalling table has no extractor for this type tag.
    #[error("field type {0} is not supported")]
    UnsupportedType(RfcType),

    /// The native layer returned text that does not decode as the field's type.
    #[error("field '{field}' holds malformed {kind}: {text:?}")]
    Malformed {
        field: String,
        kind: &'static str,
        text: String,
    },

    /// The descriptor reported `count` entries but entry `index` is missing.
    #[error("descriptor reports {count} entries but entry {index} cannot be described")]
    MissingField { index: usize, count: usize },

    /// Row index not representable by the native layer.
    #[error("row index {0} is out of range")]
    RowIndex(usize),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DynamicError>,
    },
}

impl DynamicError {
    pub fn native(call: &'static str, info: RfcErrorInfo) -> Self {
        Self::Native { call, info }
    }

    pub fn malformed(field: &str, kind: &'static str, text: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.to_string(),
            kind,
            text: text.into(),
        }
    }

    /// Add context to the error.
    ///
    /// Produces: `"context: original message"`. The original error stays
    /// reachable through [`root`](Self::root).
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            DynamicError::Config(msg) => DynamicError::Config(format!("{ctx}: {msg}")),
            other => DynamicError::Context {
                context: ctx.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with all context layers peeled off.
    pub fn root(&self) -> &DynamicError {
        match self {
            DynamicError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Native diagnostic record, if a native call caused this error.
    pub fn native_info(&self) -> Option<&RfcErrorInfo> {
        match self.root() {
            DynamicError::Native { info, .. } => Some(info),
            _ => None,
        }
    }
}

/// Classification of native results into the value layer's outcomes.
pub(crate) trait NativeResultExt<T> {
    /// Any failure is fatal.
    fn fatal(self, call: &'static str) -> Result<T, DynamicError>;

    /// `InvalidParameter` means "not found" and maps to `Ok(None)`;
    /// everything else is fatal.
    fn soft(self, call: &'static str) -> Result<Option<T>, DynamicError>;
}

impl<T> NativeResultExt<T> for RfcResult<T> {
    fn fatal(self, call: &'static str) -> Result<T, DynamicError> {
        self.map_err(|info| DynamicError::native(call, info))
    }

    fn soft(self, call: &'static str) -> Result<Option<T>, DynamicError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(info) if info.is_not_found() => Ok(None),
            Err(info) => Err(DynamicError::native(call, info)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rfc_api::RfcResultCode;

    use super::*;

    #[test]
    fn soft_maps_invalid_parameter_to_none() {
        let r: RfcResult<u32> = Err(RfcErrorInfo::new(RfcResultCode::InvalidParameter, "no such field"));
        assert!(matches!(r.soft("RfcGetFieldDescByName"), Ok(None)));
    }

    #[test]
    fn soft_keeps_other_failures_fatal() {
        let r: RfcResult<u32> = Err(RfcErrorInfo::new(RfcResultCode::InvalidHandle, "stale"));
        let err = r.soft("RfcGetFieldDescByName").unwrap_err();
        assert_eq!(err.native_info().map(|i| i.code), Some(RfcResultCode::InvalidHandle));
    }

    #[test]
    fn fatal_rejects_invalid_parameter_too() {
        let r: RfcResult<u32> = Err(RfcErrorInfo::new(RfcResultCode::InvalidParameter, "no such field"));
        assert!(r.fatal("RfcGetParameterDescByName").is_err());
    }

    #[test]
    fn context_wraps_and_root_unwraps() {
        let err = DynamicError::UnsupportedType(RfcType::XmlData)
            .with_context("field 'DOC'")
            .with_context("structure 'ZHEAD'");
        assert_eq!(
            err.to_string(),
            "structure 'ZHEAD': field 'DOC': field type RFCTYPE_XMLDATA is not supported"
        );
        assert!(matches!(err.root(), DynamicError::UnsupportedType(RfcType::XmlData)));
    }

    #[test]
    fn config_context_is_inlined() {
        let err = DynamicError::Config("bad value".into()).with_context("extract.toml");
        assert_eq!(err.to_string(), "config error: extract.toml: bad value");
    }
}
