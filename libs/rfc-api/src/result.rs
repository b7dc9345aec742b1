use std::fmt;

/// Result code returned by every native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum RfcResultCode {
    #[default]
    Ok = 0,
    CommunicationFailure = 1,
    LogonFailure = 2,
    AbapRuntimeFailure = 3,
    AbapMessage = 4,
    AbapException = 5,
    Closed = 6,
    Canceled = 7,
    Timeout = 8,
    MemoryInsufficient = 9,
    VersionMismatch = 10,
    InvalidProtocol = 11,
    SerializationFailure = 12,
    InvalidHandle = 13,
    Retry = 14,
    ExternalFailure = 15,
    Executed = 16,
    NotFound = 17,
    NotSupported = 18,
    IllegalState = 19,
    InvalidParameter = 20,
    CodepageConversionFailure = 21,
    ConversionFailure = 22,
    BufferTooSmall = 23,
    TableMoveBof = 24,
    TableMoveEof = 25,
    StartSapGuiFailure = 26,
    AbapClassException = 27,
    UnknownError = 28,
    AuthorizationFailure = 29,
}

/// How the value layer treats a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Ok,
    /// Unknown field/parameter name or index: reported as absence, never raised.
    NotFound,
    /// Everything else: raised with the diagnostic record attached.
    Fatal,
}

impl RfcResultCode {
    pub const fn class(self) -> ResultClass {
        match self {
            Self::Ok => ResultClass::Ok,
            Self::InvalidParameter => ResultClass::NotFound,
            _ => ResultClass::Fatal,
        }
    }

    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Ok => "RFC_OK",
            Self::CommunicationFailure => "RFC_COMMUNICATION_FAILURE",
            Self::LogonFailure => "RFC_LOGON_FAILURE",
            Self::AbapRuntimeFailure => "RFC_ABAP_RUNTIME_FAILURE",
            Self::AbapMessage => "RFC_ABAP_MESSAGE",
            Self::AbapException => "RFC_ABAP_EXCEPTION",
            Self::Closed => "RFC_CLOSED",
            Self::Canceled => "RFC_CANCELED",
            Self::Timeout => "RFC_TIMEOUT",
            Self::MemoryInsufficient => "RFC_MEMORY_INSUFFICIENT",
            Self::VersionMismatch => "RFC_VERSION_MISMATCH",
            Self::InvalidProtocol => "RFC_INVALID_PROTOCOL",
            Self::SerializationFailure => "RFC_SERIALIZATION_FAILURE",
            Self::InvalidHandle => "RFC_INVALID_HANDLE",
            Self::Retry => "RFC_RETRY",
            Self::ExternalFailure => "RFC_EXTERNAL_FAILURE",
            Self::Executed => "RFC_EXECUTED",
            Self::NotFound => "RFC_NOT_FOUND",
            Self::NotSupported => "RFC_NOT_SUPPORTED",
            Self::IllegalState => "RFC_ILLEGAL_STATE",
            Self::InvalidParameter => "RFC_INVALID_PARAMETER",
            Self::CodepageConversionFailure => "RFC_CODEPAGE_CONVERSION_FAILURE",
            Self::ConversionFailure => "RFC_CONVERSION_FAILURE",
            Self::BufferTooSmall => "RFC_BUFFER_TOO_SMALL",
            Self::TableMoveBof => "RFC_TABLE_MOVE_BOF",
            Self::TableMoveEof => "RFC_TABLE_MOVE_EOF",
            Self::StartSapGuiFailure => "RFC_START_SAPGUI_FAILURE",
            Self::AbapClassException => "RFC_ABAP_CLASS_EXCEPTION",
            Self::UnknownError => "RFC_UNKNOWN_ERROR",
            Self::AuthorizationFailure => "RFC_AUTHORIZATION_FAILURE",
        }
    }
}

impl fmt::Display for RfcResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

/// Error group reported alongside the result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum RfcErrorGroup {
    #[default]
    Ok = 0,
    AbapApplicationFailure = 1,
    AbapRuntimeFailure = 2,
    LogonFailure = 3,
    CommunicationFailure = 4,
    ExternalRuntimeFailure = 5,
    ExternalApplicationFailure = 6,
    ExternalAuthorizationFailure = 7,
}

/// Diagnostic record filled by the native library on failure.
///
/// Carried verbatim into fatal errors raised by the value layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RfcErrorInfo {
    pub code: RfcResultCode,
    pub group: RfcErrorGroup,
    pub key: String,
    pub message: String,
    pub abap_msg_class: String,
    pub abap_msg_type: String,
    pub abap_msg_number: String,
    pub abap_msg_v1: String,
    pub abap_msg_v2: String,
    pub abap_msg_v3: String,
    pub abap_msg_v4: String,
}

impl RfcErrorInfo {
    /// Record for a failure raised by the library runtime itself.
    pub fn new(code: RfcResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            group: RfcErrorGroup::ExternalRuntimeFailure,
            key: code.native_name().to_string(),
            message: message.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn class(&self) -> ResultClass {
        self.code.class()
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.class() == ResultClass::NotFound
    }
}

impl fmt::Display for RfcErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if !self.abap_msg_class.is_empty() {
            write!(
                f,
                " [{}/{}{}]",
                self.abap_msg_class, self.abap_msg_type, self.abap_msg_number
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RfcErrorInfo {}

/// Outcome of a native call: the value, or the diagnostic record.
pub type RfcResult<T> = Result<T, RfcErrorInfo>;
