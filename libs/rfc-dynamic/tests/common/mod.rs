#![allow(dead_code)]

use std::path::PathBuf;

use rfc_api::{DataHandle, FieldDescription, RfcType, TableHandle, TypeDescHandle};
use rfc_interop_memory::{MemValue, MemoryInterop};

pub fn field(name: &str, ty: RfcType) -> FieldDescription {
    FieldDescription::new(name, ty)
}

pub fn nested(name: &str, ty: RfcType, line_type: TypeDescHandle) -> FieldDescription {
    FieldDescription {
        type_desc: line_type,
        ..FieldDescription::new(name, ty)
    }
}

/// Structure with a single field, optionally set.
pub fn single(mem: &MemoryInterop, name: &str, ty: RfcType, value: Option<MemValue>) -> DataHandle {
    let line = mem.define_type("ZSINGLE", vec![field(name, ty)]);
    let s = mem.create_structure(line).unwrap();
    if let Some(value) = value {
        mem.set_value(s, name, value).unwrap();
    }
    s
}

/// Line type with one integer field `TEST`.
pub fn test_type(mem: &MemoryInterop) -> TypeDescHandle {
    mem.define_type("ZTEST", vec![field("TEST", RfcType::Int)])
}

/// Structure of [`test_type`] holding `TEST = 10`.
pub fn test_structure(mem: &MemoryInterop) -> DataHandle {
    let s = mem.create_structure(test_type(mem)).unwrap();
    mem.set_value(s, "TEST", MemValue::Int(10)).unwrap();
    s
}

/// Table of [`test_type`] rows, one per value.
pub fn test_table(mem: &MemoryInterop, values: &[i32]) -> TableHandle {
    let t = mem.create_table(test_type(mem)).unwrap();
    for v in values {
        let row = mem.append_row(t).unwrap();
        mem.set_value(row, "TEST", MemValue::Int(*v)).unwrap();
    }
    t
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../plugins/interop/memory/fixtures")
        .join(name)
}
