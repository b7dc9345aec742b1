//! Per-type field extractors.
//!
//! Each extractor pulls one typed value out of a container handle by field
//! name. Character and byte extractors size their buffer from
//! [`ExtractConfig`](crate::config::ExtractConfig) and, if the native layer
//! reports `BufferTooSmall`, ask for the real length and retry exactly once.

use chrono::{NaiveDate, NaiveTime};
use rfc_api::{DataHandle, RfcResultCode};

use crate::context::RfcContext;
use crate::decimal::Decimal;
use crate::error::{DynamicError, NativeResultExt};
use crate::value::{parse_date, parse_time};

/// `Extract(handle, name) -> value` contract shared by all extractors.
pub trait FieldExtractor {
    type Output;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<Self::Output, DynamicError>;
}

pub struct StringField;
pub struct IntField;
pub struct LongField;
pub struct DoubleField;
pub struct DecimalField;
pub struct DateField;
pub struct TimeField;
pub struct BytesField;

impl FieldExtractor for StringField {
    type Output = String;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<String, DynamicError> {
        let interop = ctx.interop();
        let mut buffer = vec![0u16; ctx.config().string_buffer_len];

        let len = match interop.get_string(data, name, &mut buffer) {
            Ok(len) => len,
            Err(info) if info.code == RfcResultCode::BufferTooSmall => {
                let required = interop
                    .get_string_length(data, name)
                    .fatal("RfcGetStringLength")?;
                tracing::debug!(field = name, initial = buffer.len(), required, "string buffer too small, retrying");
                buffer = vec![0u16; required + 1];
                interop.get_string(data, name, &mut buffer).fatal("RfcGetString")?
            }
            Err(info) => return Err(DynamicError::native("RfcGetString", info)),
        };

        buffer.truncate(len);
        String::from_utf16(&buffer)
            .map_err(|_| DynamicError::malformed(name, "UTF-16 text", String::from_utf16_lossy(&buffer)))
    }
}

impl FieldExtractor for IntField {
    type Output = i32;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<i32, DynamicError> {
        ctx.interop().get_int(data, name).fatal("RfcGetInt")
    }
}

impl FieldExtractor for LongField {
    type Output = i64;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<i64, DynamicError> {
        ctx.interop().get_int8(data, name).fatal("RfcGetInt8")
    }
}

impl FieldExtractor for DoubleField {
    type Output = f64;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<f64, DynamicError> {
        ctx.interop().get_float(data, name).fatal("RfcGetFloat")
    }
}

impl FieldExtractor for DecimalField {
    type Output = Decimal;

    /// Decimal floats are read through their textual form.
    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<Decimal, DynamicError> {
        let text = StringField::extract(ctx, data, name)?;
        text.parse()
            .map_err(|_| DynamicError::malformed(name, "decimal", text))
    }
}

impl FieldExtractor for DateField {
    /// `None` for an initial date when the config maps those to absence.
    type Output = Option<NaiveDate>;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<Option<NaiveDate>, DynamicError> {
        let raw = ctx.interop().get_date(data, name).fatal("RfcGetDate")?;
        let text = String::from_utf16_lossy(&raw);

        if ctx.config().null_initial_dates && text.chars().all(|c| c == '0' || c == ' ') {
            return Ok(None);
        }
        parse_date(&text)
            .filter(|_| text.len() == 8)
            .map(Some)
            .ok_or_else(|| DynamicError::malformed(name, "date", text))
    }
}

impl FieldExtractor for TimeField {
    /// `None` for a blank time when the config maps those to absence.
    /// `000000` is midnight, not an initial value.
    type Output = Option<NaiveTime>;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<Option<NaiveTime>, DynamicError> {
        let raw = ctx.interop().get_time(data, name).fatal("RfcGetTime")?;
        let text = String::from_utf16_lossy(&raw);

        if ctx.config().null_initial_dates && text.chars().all(|c| c == ' ') {
            return Ok(None);
        }
        parse_time(&text)
            .filter(|_| text.len() == 6)
            .map(Some)
            .ok_or_else(|| DynamicError::malformed(name, "time", text))
    }
}

impl FieldExtractor for BytesField {
    type Output = Vec<u8>;

    fn extract(ctx: RfcContext<'_>, data: DataHandle, name: &str) -> Result<Vec<u8>, DynamicError> {
        let interop = ctx.interop();
        let mut buffer = vec![0u8; ctx.config().bytes_buffer_len];

        let len = match interop.get_bytes(data, name, &mut buffer) {
            Ok(len) => len,
            Err(info) if info.code == RfcResultCode::BufferTooSmall => {
                let required = interop
                    .get_bytes_length(data, name)
                    .fatal("RfcGetBytesLength")?;
                tracing::debug!(field = name, initial = buffer.len(), required, "byte buffer too small, retrying");
                buffer = vec![0u8; required];
                interop.get_bytes(data, name, &mut buffer).fatal("RfcGetBytes")?
            }
            Err(info) => return Err(DynamicError::native("RfcGetBytes", info)),
        };

        buffer.truncate(len);
        Ok(buffer)
    }
}
