use rfc_api::{DataHandle, RfcType, TableHandle};

/// Raw field content as the native library would store it.
///
/// Dates and times are kept in their native text form (`YYYYMMDD`,
/// `HHMMSS`); decimals and packed numbers are kept as text in `Chars`.
#[derive(Debug, Clone, PartialEq)]
pub enum MemValue {
    Chars(String),
    Int(i32),
    Int8(i64),
    Float(f64),
    Date(String),
    Time(String),
    Bytes(Vec<u8>),
    Structure(DataHandle),
    Table(TableHandle),
}

impl MemValue {
    pub fn chars(s: impl Into<String>) -> Self {
        MemValue::Chars(s.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            MemValue::Chars(_) => "chars",
            MemValue::Int(_) => "int",
            MemValue::Int8(_) => "int8",
            MemValue::Float(_) => "float",
            MemValue::Date(_) => "date",
            MemValue::Time(_) => "time",
            MemValue::Bytes(_) => "bytes",
            MemValue::Structure(_) => "structure",
            MemValue::Table(_) => "table",
        }
    }

    /// Whether a field of type `ty` can hold this value.
    ///
    /// Text is accepted by every scalar type, as the native setters convert.
    pub fn fits(&self, ty: RfcType) -> bool {
        match self {
            MemValue::Chars(_) => !matches!(ty, RfcType::Structure | RfcType::Table | RfcType::Null),
            MemValue::Int(_) => matches!(ty, RfcType::Int | RfcType::Int1 | RfcType::Int2 | RfcType::Int8),
            MemValue::Int8(_) => ty == RfcType::Int8,
            MemValue::Float(_) => ty == RfcType::Float,
            MemValue::Date(_) => ty == RfcType::Date,
            MemValue::Time(_) => ty == RfcType::Time,
            MemValue::Bytes(_) => matches!(ty, RfcType::Byte | RfcType::XString),
            MemValue::Structure(_) => ty == RfcType::Structure,
            MemValue::Table(_) => ty == RfcType::Table,
        }
    }

    /// Content of a field that was never set. Containers have none: they
    /// are created on first access.
    pub fn initial(ty: RfcType) -> Option<MemValue> {
        let value = match ty {
            RfcType::Int | RfcType::Int1 | RfcType::Int2 => MemValue::Int(0),
            RfcType::Int8 => MemValue::Int8(0),
            RfcType::Float => MemValue::Float(0.0),
            RfcType::Date => MemValue::Date("00000000".into()),
            RfcType::Time => MemValue::Time("000000".into()),
            RfcType::Byte | RfcType::XString => MemValue::Bytes(Vec::new()),
            RfcType::Bcd | RfcType::Decf16 | RfcType::Decf34 => MemValue::chars("0"),
            RfcType::Structure | RfcType::Table | RfcType::Null => return None,
            _ => MemValue::chars(""),
        };
        Some(value)
    }

    /// Text rendering used by the string getters.
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            MemValue::Chars(s) | MemValue::Date(s) | MemValue::Time(s) => s.clone(),
            MemValue::Int(v) => v.to_string(),
            MemValue::Int8(v) => v.to_string(),
            MemValue::Float(v) => v.to_string(),
            MemValue::Bytes(b) => b.iter().map(|byte| format!("{byte:02X}")).collect(),
            MemValue::Structure(_) | MemValue::Table(_) => return None,
        };
        Some(text)
    }
}
