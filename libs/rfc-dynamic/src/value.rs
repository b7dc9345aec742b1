use base64::Engine;
use chrono::{NaiveDate, NaiveTime};

use crate::decimal::Decimal;
use crate::error::DynamicError;
use crate::structure::StructureView;
use crate::table::TableView;

/// Extracted field value.
///
/// Scalars are decoded eagerly. Nested structures and tables are views over
/// sub-handles: nothing inside them is read until the caller asks.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// Character, numeric-text, packed-decimal and string fields.
    String(String),
    /// 8/16/32-bit integers.
    Int(i32),
    /// 64-bit integers.
    Long(i64),
    Double(f64),
    /// Both decimal float precisions.
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Fixed-length bytes and byte strings.
    Bytes(Vec<u8>),
    Structure(StructureView<'a>),
    Table(TableView<'a>),
    /// Null field, or an initial date/time.
    Absent,
}

/// Result type requested from an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Whatever the field's type tag produces, unconverted.
    Any,
    String,
    Int,
    Long,
    Double,
    Decimal,
    Date,
    Time,
    Bytes,
    Structure,
    Table,
}

impl<'a> Value<'a> {
    /// Kind of this value; `None` for [`Value::Absent`].
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Double(_) => ValueKind::Double,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Structure(_) => ValueKind::Structure,
            Value::Table(_) => ValueKind::Table,
            Value::Absent => return None,
        };
        Some(kind)
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureView<'a>> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableView<'a>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Best-effort conversion to `kind`.
    ///
    /// `None` means the value cannot be represented as `kind` (a soft miss).
    /// Conversions never lose information: a fractional number does not
    /// become an integer, an out-of-range integer does not wrap.
    pub fn coerce(self, kind: ValueKind) -> Option<Value<'a>> {
        if kind == ValueKind::Any || self.kind() == Some(kind) {
            return Some(self);
        }

        match (kind, self) {
            (ValueKind::String, Value::Int(v)) => Some(Value::String(v.to_string())),
            (ValueKind::String, Value::Long(v)) => Some(Value::String(v.to_string())),
            (ValueKind::String, Value::Double(v)) => Some(Value::String(v.to_string())),
            (ValueKind::String, Value::Decimal(v)) => Some(Value::String(v.to_string())),
            (ValueKind::String, Value::Date(v)) => Some(Value::String(v.to_string())),
            (ValueKind::String, Value::Time(v)) => Some(Value::String(v.to_string())),

            (ValueKind::Int, Value::Long(v)) => i32::try_from(v).ok().map(Value::Int),
            (ValueKind::Int, Value::Double(v)) => integral_f64(v)
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int),
            (ValueKind::Int, Value::Decimal(v)) => v
                .to_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int),
            (ValueKind::Int, Value::String(s)) => s.trim().parse().ok().map(Value::Int),

            (ValueKind::Long, Value::Int(v)) => Some(Value::Long(v.into())),
            (ValueKind::Long, Value::Double(v)) => integral_f64(v).map(Value::Long),
            (ValueKind::Long, Value::Decimal(v)) => v.to_i64().map(Value::Long),
            (ValueKind::Long, Value::String(s)) => s.trim().parse().ok().map(Value::Long),

            (ValueKind::Double, Value::Int(v)) => Some(Value::Double(v.into())),
            (ValueKind::Double, Value::Long(v)) => Some(Value::Double(v as f64)),
            (ValueKind::Double, Value::Decimal(v)) => Some(Value::Double(v.to_f64())),
            (ValueKind::Double, Value::String(s)) => s.trim().parse().ok().map(Value::Double),

            (ValueKind::Decimal, Value::Int(v)) => Some(Value::Decimal(v.into())),
            (ValueKind::Decimal, Value::Long(v)) => Some(Value::Decimal(v.into())),
            (ValueKind::Decimal, Value::Double(v)) => Decimal::from_f64(v).map(Value::Decimal),
            (ValueKind::Decimal, Value::String(s)) => s.parse().ok().map(Value::Decimal),

            (ValueKind::Date, Value::String(s)) => parse_date(s.trim()).map(Value::Date),
            (ValueKind::Time, Value::String(s)) => parse_time(s.trim()).map(Value::Time),

            _ => None,
        }
    }

    /// Materialise the value as JSON, walking nested structures and tables.
    ///
    /// Structures keep descriptor field order. Decimals are rendered as
    /// strings to keep their precision, bytes as base64.
    pub fn to_json(&self) -> Result<serde_json::Value, DynamicError> {
        use serde_json::Value as Json;

        let json = match self {
            Value::String(s) => Json::String(s.clone()),
            Value::Int(v) => Json::from(*v),
            Value::Long(v) => Json::from(*v),
            Value::Double(v) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
            Value::Decimal(v) => Json::String(v.to_string()),
            Value::Date(v) => Json::String(v.to_string()),
            Value::Time(v) => Json::String(v.to_string()),
            Value::Bytes(v) => Json::String(base64::engine::general_purpose::STANDARD.encode(v)),
            Value::Structure(s) => {
                let mut map = serde_json::Map::new();
                for entry in s {
                    let (name, value) = entry?;
                    let json = value.to_json().map_err(|e| e.with_context(format!("field '{name}'")))?;
                    map.insert(name, json);
                }
                Json::Object(map)
            }
            Value::Table(t) => {
                let mut rows = Vec::new();
                for (index, row) in t.rows().enumerate() {
                    let row = Value::Structure(row?);
                    rows.push(row.to_json().map_err(|e| e.with_context(format!("row {index}")))?);
                }
                Json::Array(rows)
            }
            Value::Absent => Json::Null,
        };
        Ok(json)
    }
}

/// Scalars compare by value; views compare by the handle they wrap.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => a.handle() == b.handle(),
            (Value::Table(a), Value::Table(b)) => a.handle() == b.handle(),
            (Value::Absent, Value::Absent) => true,
            _ => false,
        }
    }
}

fn integral_f64(v: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it does not fit.
    if v.is_finite() && v.fract() == 0.0 && v >= -(2f64.powi(63)) && v < 2f64.powi(63) {
        Some(v as i64)
    } else {
        None
    }
}

/// `YYYYMMDD` (native form) or `YYYY-MM-DD`.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// `HHMMSS` (native form) or `HH:MM:SS`.
pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H%M%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

// ---------------------------------------------------------------------------
// Typed access
// ---------------------------------------------------------------------------

/// Rust types a field can be read as.
///
/// `KIND` is passed to the dispatcher as the requested kind; `from_value`
/// unwraps the coerced result.
pub trait FromValue<'a>: Sized {
    const KIND: ValueKind;

    fn from_value(value: Value<'a>) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $kind:ident) => {
        impl<'a> FromValue<'a> for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn from_value(value: Value<'a>) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(String, String);
impl_from_value!(i32, Int);
impl_from_value!(i64, Long);
impl_from_value!(f64, Double);
impl_from_value!(Decimal, Decimal);
impl_from_value!(NaiveDate, Date);
impl_from_value!(NaiveTime, Time);
impl_from_value!(Vec<u8>, Bytes);
impl_from_value!(StructureView<'a>, Structure);
impl_from_value!(TableView<'a>, Table);

impl<'a> FromValue<'a> for Value<'a> {
    const KIND: ValueKind = ValueKind::Any;

    fn from_value(value: Value<'a>) -> Option<Self> {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn any_returns_value_unchanged() {
        assert_eq!(Value::Int(3).coerce(ValueKind::Any), Some(Value::Int(3)));
        assert_eq!(Value::Absent.coerce(ValueKind::Any), Some(Value::Absent));
    }

    #[test]
    fn integers_widen_and_narrow_without_loss() {
        assert_eq!(Value::Int(10).coerce(ValueKind::Long), Some(Value::Long(10)));
        assert_eq!(Value::Long(10).coerce(ValueKind::Int), Some(Value::Int(10)));
        assert_eq!(Value::Long(i64::MAX).coerce(ValueKind::Int), None);
        assert_eq!(Value::Double(4.0).coerce(ValueKind::Int), Some(Value::Int(4)));
        assert_eq!(Value::Double(4.5).coerce(ValueKind::Int), None);
        assert_eq!(Value::Double(1e300).coerce(ValueKind::Long), None);
    }

    #[test]
    fn decimals_convert_to_numbers() {
        let d: Decimal = "1.1".parse().unwrap();
        assert_eq!(Value::Decimal(d).coerce(ValueKind::Double), Some(Value::Double(1.1)));
        assert_eq!(Value::Decimal(d).coerce(ValueKind::Long), None);
        assert_eq!(
            Value::Decimal("12.00".parse().unwrap()).coerce(ValueKind::Int),
            Some(Value::Int(12))
        );
        assert_eq!(Value::Int(5).coerce(ValueKind::Decimal), Some(Value::Decimal(Decimal::from(5i32))));
    }

    #[test]
    fn strings_parse_into_scalars() {
        let s = |v: &str| Value::String(v.to_string());
        assert_eq!(s(" 0042").coerce(ValueKind::Int), Some(Value::Int(42)));
        assert_eq!(s("x").coerce(ValueKind::Int), None);
        assert_eq!(s("20200405").coerce(ValueKind::Date), Some(Value::Date(date(2020, 4, 5))));
        assert_eq!(s("2020-04-05").coerce(ValueKind::Date), Some(Value::Date(date(2020, 4, 5))));
        assert_eq!(
            s("123456").coerce(ValueKind::Time),
            Some(Value::Time(NaiveTime::from_hms_opt(12, 34, 56).unwrap()))
        );
        assert_eq!(s("1.25").coerce(ValueKind::Decimal), Some(Value::Decimal("1.25".parse().unwrap())));
        assert_eq!(s("1e-9223372036854775808").coerce(ValueKind::Decimal), None);
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(Value::Int(-7).coerce(ValueKind::String), Some(Value::String("-7".into())));
        assert_eq!(
            Value::Date(date(2020, 4, 5)).coerce(ValueKind::String),
            Some(Value::String("2020-04-05".into()))
        );
    }

    #[test]
    fn absent_and_bytes_do_not_convert() {
        assert_eq!(Value::Absent.coerce(ValueKind::String), None);
        assert_eq!(Value::Bytes(vec![1]).coerce(ValueKind::String), None);
        assert_eq!(Value::String("a".into()).coerce(ValueKind::Bytes), None);
        assert_eq!(Value::Int(1).coerce(ValueKind::Structure), None);
    }

    #[test]
    fn scalar_json() {
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_json().unwrap(), serde_json::json!("AQID"));
        assert_eq!(
            Value::Decimal("2.50".parse().unwrap()).to_json().unwrap(),
            serde_json::json!("2.50")
        );
        assert_eq!(Value::Double(f64::NAN).to_json().unwrap(), serde_json::Value::Null);
        assert_eq!(
            Value::Time(NaiveTime::from_hms_opt(1, 2, 3).unwrap()).to_json().unwrap(),
            serde_json::json!("01:02:03")
        );
        assert_eq!(Value::Absent.to_json().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn typed_unwrap() {
        assert_eq!(i32::from_value(Value::Int(9)), Some(9));
        assert_eq!(i64::from_value(Value::Int(9)), None);
        assert_eq!(<Value as FromValue>::KIND, ValueKind::Any);
        assert_eq!(<NaiveDate as FromValue>::KIND, ValueKind::Date);
    }
}
