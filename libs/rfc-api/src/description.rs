use crate::handle::TypeDescHandle;
use crate::types::{RfcDirection, RfcType};

/// Shape of one field of a structure or table line type.
///
/// Lengths and offsets are in bytes, for the non-Unicode (`nuc_*`) and
/// Unicode (`uc_*`) layouts of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub ty: RfcType,
    pub nuc_length: u32,
    pub nuc_offset: u32,
    pub uc_length: u32,
    pub uc_offset: u32,
    pub decimals: u32,
    /// Line type of a nested structure or table; null for scalars.
    pub type_desc: TypeDescHandle,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, ty: RfcType) -> Self {
        Self {
            name: name.into(),
            ty,
            nuc_length: 0,
            nuc_offset: 0,
            uc_length: 0,
            uc_offset: 0,
            decimals: 0,
            type_desc: TypeDescHandle::null(),
        }
    }
}

/// Shape of one function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescription {
    pub name: String,
    pub ty: RfcType,
    pub direction: RfcDirection,
    pub nuc_length: u32,
    pub uc_length: u32,
    pub decimals: u32,
    /// Line type of a structure or table parameter; null for scalars.
    pub type_desc: TypeDescHandle,
    pub default_value: String,
    pub parameter_text: String,
    pub optional: bool,
}

impl ParameterDescription {
    pub fn new(name: impl Into<String>, ty: RfcType, direction: RfcDirection) -> Self {
        Self {
            name: name.into(),
            ty,
            direction,
            nuc_length: 0,
            uc_length: 0,
            decimals: 0,
            type_desc: TypeDescHandle::null(),
            default_value: String::new(),
            parameter_text: String::new(),
            optional: false,
        }
    }
}
