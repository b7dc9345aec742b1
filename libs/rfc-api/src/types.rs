use std::fmt;

/// Native field type tag.
///
/// Discriminants are the codes used by the native library. The enumeration
/// is closed over everything the library can report; whether a tag can be
/// marshalled is decided by the value layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum RfcType {
    Char = 0,
    Date = 1,
    Bcd = 2,
    Time = 3,
    Byte = 4,
    Table = 5,
    Num = 6,
    Float = 7,
    Int = 8,
    Int2 = 9,
    Int1 = 10,
    Null = 14,
    AbapObject = 16,
    Structure = 17,
    Decf16 = 23,
    Decf34 = 24,
    XmlData = 28,
    String = 29,
    XString = 30,
    Int8 = 31,
    UtcLong = 32,
    UtcSecond = 33,
    UtcMinute = 34,
    DtDay = 35,
    DtWeek = 36,
    DtMonth = 37,
    TSecond = 38,
    TMinute = 39,
    CDay = 40,
    Box = 41,
    GenericBox = 42,
}

impl RfcType {
    /// Native code of this tag.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Name as spelled by the native headers (`RFCTYPE_*`).
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Char => "RFCTYPE_CHAR",
            Self::Date => "RFCTYPE_DATE",
            Self::Bcd => "RFCTYPE_BCD",
            Self::Time => "RFCTYPE_TIME",
            Self::Byte => "RFCTYPE_BYTE",
            Self::Table => "RFCTYPE_TABLE",
            Self::Num => "RFCTYPE_NUM",
            Self::Float => "RFCTYPE_FLOAT",
            Self::Int => "RFCTYPE_INT",
            Self::Int2 => "RFCTYPE_INT2",
            Self::Int1 => "RFCTYPE_INT1",
            Self::Null => "RFCTYPE_NULL",
            Self::AbapObject => "RFCTYPE_ABAPOBJECT",
            Self::Structure => "RFCTYPE_STRUCTURE",
            Self::Decf16 => "RFCTYPE_DECF16",
            Self::Decf34 => "RFCTYPE_DECF34",
            Self::XmlData => "RFCTYPE_XMLDATA",
            Self::String => "RFCTYPE_STRING",
            Self::XString => "RFCTYPE_XSTRING",
            Self::Int8 => "RFCTYPE_INT8",
            Self::UtcLong => "RFCTYPE_UTCLONG",
            Self::UtcSecond => "RFCTYPE_UTCSECOND",
            Self::UtcMinute => "RFCTYPE_UTCMINUTE",
            Self::DtDay => "RFCTYPE_DTDAY",
            Self::DtWeek => "RFCTYPE_DTWEEK",
            Self::DtMonth => "RFCTYPE_DTMONTH",
            Self::TSecond => "RFCTYPE_TSECOND",
            Self::TMinute => "RFCTYPE_TMINUTE",
            Self::CDay => "RFCTYPE_CDAY",
            Self::Box => "RFCTYPE_BOX",
            Self::GenericBox => "RFCTYPE_GENERIC_BOX",
        }
    }

    /// Tags whose values are containers with their own descriptor.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Structure | Self::Table)
    }
}

impl fmt::Display for RfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

/// A type code the native library reported but this crate does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTypeCode(pub u32);

impl fmt::Display for UnknownTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown native type code {}", self.0)
    }
}

impl std::error::Error for UnknownTypeCode {}

impl TryFrom<u32> for RfcType {
    type Error = UnknownTypeCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        let ty = match code {
            0 => Self::Char,
            1 => Self::Date,
            2 => Self::Bcd,
            3 => Self::Time,
            4 => Self::Byte,
            5 => Self::Table,
            6 => Self::Num,
            7 => Self::Float,
            8 => Self::Int,
            9 => Self::Int2,
            10 => Self::Int1,
            14 => Self::Null,
            16 => Self::AbapObject,
            17 => Self::Structure,
            23 => Self::Decf16,
            24 => Self::Decf34,
            28 => Self::XmlData,
            29 => Self::String,
            30 => Self::XString,
            31 => Self::Int8,
            32 => Self::UtcLong,
            33 => Self::UtcSecond,
            34 => Self::UtcMinute,
            35 => Self::DtDay,
            36 => Self::DtWeek,
            37 => Self::DtMonth,
            38 => Self::TSecond,
            39 => Self::TMinute,
            40 => Self::CDay,
            41 => Self::Box,
            42 => Self::GenericBox,
            other => return Err(UnknownTypeCode(other)),
        };
        Ok(ty)
    }
}

/// Direction of a function parameter. Bit-compatible with the native enum:
/// `Changing` is import|export, `Tables` is changing|0x04.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum RfcDirection {
    Import = 0x01,
    Export = 0x02,
    Changing = 0x03,
    Tables = 0x07,
}

impl RfcDirection {
    /// Whether the caller supplies this parameter.
    #[inline]
    pub const fn is_import(self) -> bool {
        (self as u32) & 0x01 != 0
    }

    /// Whether the callee fills this parameter.
    #[inline]
    pub const fn is_export(self) -> bool {
        (self as u32) & 0x02 != 0
    }
}

impl TryFrom<u32> for RfcDirection {
    type Error = u32;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(Self::Import),
            0x02 => Ok(Self::Export),
            0x03 => Ok(Self::Changing),
            0x07 => Ok(Self::Tables),
            other => Err(other),
        }
    }
}
