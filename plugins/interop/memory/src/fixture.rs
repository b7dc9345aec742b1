//! Serde fixture format for a complete function call.
//!
//! ```toml
//! function = "STFC_STRUCTURE"
//!
//! [[types]]
//! name = "RFCTEST"
//! fields = [
//!     { name = "RFCINT4", type = "int" },
//!     { name = "RFCDATE", type = "date" },
//! ]
//!
//! [[parameters]]
//! name = "IMPORTSTRUCT"
//! type = "structure"
//! type_name = "RFCTEST"
//! value = { RFCINT4 = 10, RFCDATE = "2020-04-05" }
//! ```
//!
//! Types are defined in order; a nested `type_name` must name a type listed
//! earlier. Values are plain JSON/TOML data converted by field type: dates
//! and times accept their native or ISO form, byte fields take base64.

use std::path::Path;

use base64::Engine;
use rfc_api::{DataHandle, FieldDescription, ParameterDescription, RfcDirection, RfcType, TypeDescHandle};
use serde::Deserialize;

use crate::arena::MemoryInterop;
use crate::error::MemoryError;
use crate::value::MemValue;

#[derive(Debug, Clone, Deserialize)]
pub struct CallFixture {
    pub function: String,
    #[serde(default)]
    pub types: Vec<TypeFixture>,
    #[serde(default)]
    pub parameters: Vec<ParameterFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeFixture {
    pub name: String,
    pub fields: Vec<FieldFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldFixture {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: RfcType,
    /// Length in characters or bytes; defaults by type.
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub decimals: u32,
    /// Line type of a structure or table field.
    #[serde(default)]
    pub type_name: Option<String>,
}

fn default_direction() -> RfcDirection {
    RfcDirection::Import
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterFixture {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: RfcType,
    #[serde(default = "default_direction")]
    pub direction: RfcDirection,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl CallFixture {
    pub fn from_toml(s: &str) -> Result<Self, MemoryError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json(s: &str) -> Result<Self, MemoryError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a fixture file; `.json` files are JSON, anything else TOML.
    pub fn load(path: &Path) -> Result<Self, MemoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| MemoryError::from(e).with_context(path.display()))?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        };
        parsed.map_err(|e| e.with_context(path.display()))
    }

    /// Define the fixture's types and function in `mem` and fill a new
    /// function call container with the parameter values.
    pub fn build(&self, mem: &MemoryInterop) -> Result<DataHandle, MemoryError> {
        let mut types: Vec<(&str, TypeDescHandle)> = Vec::with_capacity(self.types.len());

        for ty in &self.types {
            let mut offset = (0u32, 0u32);
            let mut fields = Vec::with_capacity(ty.fields.len());
            for f in &ty.fields {
                let line_type = resolve_line_type(&types, &f.name, f.ty, f.type_name.as_deref())?;
                let (nuc_length, uc_length) = lengths(f.ty, f.length);
                fields.push(FieldDescription {
                    nuc_length,
                    nuc_offset: offset.0,
                    uc_length,
                    uc_offset: offset.1,
                    decimals: f.decimals,
                    type_desc: line_type,
                    ..FieldDescription::new(f.name.clone(), f.ty)
                });
                offset = (offset.0 + nuc_length, offset.1 + uc_length);
            }
            let handle = mem.define_type(ty.name.clone(), fields);
            types.push((ty.name.as_str(), handle));
        }

        let mut params = Vec::with_capacity(self.parameters.len());
        for p in &self.parameters {
            let line_type = resolve_line_type(&types, &p.name, p.ty, p.type_name.as_deref())?;
            let (nuc_length, uc_length) = lengths(p.ty, p.length);
            params.push(ParameterDescription {
                nuc_length,
                uc_length,
                decimals: p.decimals,
                type_desc: line_type,
                default_value: p.default.clone(),
                parameter_text: p.text.clone(),
                optional: p.optional,
                ..ParameterDescription::new(p.name.clone(), p.ty, p.direction)
            });
        }

        let function = mem.define_function(self.function.clone(), params);
        let call = mem.create_function(function)?;

        for p in &self.parameters {
            if let Some(value) = &p.value {
                let line_type = resolve_line_type(&types, &p.name, p.ty, p.type_name.as_deref())?;
                fill(mem, call, &p.name, p.ty, line_type, value)
                    .map_err(|e| e.with_context(format!("parameter '{}'", p.name)))?;
            }
        }

        tracing::debug!(function = %self.function, parameters = self.parameters.len(), "fixture loaded");
        Ok(call)
    }
}

/// Load `path` and build its call in `mem`.
pub fn load_call(mem: &MemoryInterop, path: &Path) -> Result<DataHandle, MemoryError> {
    CallFixture::load(path)?.build(mem)
}

fn resolve_line_type(
    types: &[(&str, TypeDescHandle)],
    field: &str,
    ty: RfcType,
    type_name: Option<&str>,
) -> Result<TypeDescHandle, MemoryError> {
    match (ty.is_container(), type_name) {
        (true, Some(name)) => types
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, h)| *h)
            .ok_or_else(|| MemoryError::Fixture(format!("field '{field}': type '{name}' is not defined before use"))),
        (true, None) => Err(MemoryError::Fixture(format!("field '{field}': {ty} needs a type_name"))),
        (false, _) => Ok(TypeDescHandle::null()),
    }
}

/// `(nuc_length, uc_length)` in bytes.
fn lengths(ty: RfcType, length: Option<u32>) -> (u32, u32) {
    let chars = |n: u32| (n, n * 2);
    match ty {
        RfcType::Char | RfcType::Num => chars(length.unwrap_or(1)),
        RfcType::Date => chars(8),
        RfcType::Time => chars(6),
        RfcType::Int => (4, 4),
        RfcType::Int2 => (2, 2),
        RfcType::Int1 => (1, 1),
        RfcType::Int8 | RfcType::Float | RfcType::Decf16 => (8, 8),
        RfcType::Decf34 => (16, 16),
        // Variable-length and nested fields are stored as references.
        RfcType::String | RfcType::XString | RfcType::Table => (8, 8),
        _ => {
            let n = length.unwrap_or(0);
            (n, n)
        }
    }
}

fn fill(
    mem: &MemoryInterop,
    data: DataHandle,
    name: &str,
    ty: RfcType,
    line_type: TypeDescHandle,
    value: &serde_json::Value,
) -> Result<(), MemoryError> {
    match ty {
        RfcType::Structure => {
            let object = value
                .as_object()
                .ok_or_else(|| MemoryError::invalid_value(name, "expected an object"))?;
            let structure = mem.create_structure(line_type)?;
            fill_structure(mem, structure, line_type, object)?;
            mem.set_value(data, name, MemValue::Structure(structure))
        }
        RfcType::Table => {
            let rows = value
                .as_array()
                .ok_or_else(|| MemoryError::invalid_value(name, "expected an array of rows"))?;
            let table = mem.create_table(line_type)?;
            for (index, row) in rows.iter().enumerate() {
                let object = row
                    .as_object()
                    .ok_or_else(|| MemoryError::invalid_value(name, format!("row {index} is not an object")))?;
                let handle = mem.append_row(table)?;
                fill_structure(mem, handle, line_type, object).map_err(|e| e.with_context(format!("row {index}")))?;
            }
            mem.set_value(data, name, MemValue::Table(table))
        }
        RfcType::Null => Ok(()),
        _ => mem.set_value(data, name, scalar(name, ty, value)?),
    }
}

fn fill_structure(
    mem: &MemoryInterop,
    structure: DataHandle,
    line_type: TypeDescHandle,
    object: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), MemoryError> {
    for (field, value) in object {
        mem.field_description(line_type, field)
            .and_then(|desc| fill(mem, structure, field, desc.ty, desc.type_desc, value))
            .map_err(|e| e.with_context(format!("field '{field}'")))?;
    }
    Ok(())
}

fn scalar(name: &str, ty: RfcType, value: &serde_json::Value) -> Result<MemValue, MemoryError> {
    use serde_json::Value as Json;

    let text = || match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(if *b { "X".into() } else { String::new() }),
        _ => Err(MemoryError::invalid_value(name, format!("expected a scalar, got {value}"))),
    };

    let converted = match ty {
        RfcType::Int | RfcType::Int1 | RfcType::Int2 => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(MemValue::Int)
            .ok_or_else(|| MemoryError::invalid_value(name, format!("expected a 32-bit integer, got {value}")))?,
        RfcType::Int8 => value
            .as_i64()
            .map(MemValue::Int8)
            .ok_or_else(|| MemoryError::invalid_value(name, format!("expected an integer, got {value}")))?,
        RfcType::Float => value
            .as_f64()
            .map(MemValue::Float)
            .ok_or_else(|| MemoryError::invalid_value(name, format!("expected a number, got {value}")))?,
        RfcType::Date => MemValue::Date(text()?.replace('-', "")),
        RfcType::Time => MemValue::Time(text()?.replace(':', "")),
        RfcType::Byte | RfcType::XString => {
            let encoded = text()?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| MemoryError::invalid_value(name, format!("invalid base64: {e}")))?;
            MemValue::Bytes(bytes)
        }
        _ => MemValue::Chars(text()?),
    };
    Ok(converted)
}
