mod common;

use pretty_assertions::assert_eq;
use rfc_api::{RfcDirection, RfcResultCode, RfcType};
use rfc_dynamic::{FunctionView, RfcContext, StructureView};
use rfc_interop_memory::{MemoryInterop, load_call};

use common::{fixture_path, test_structure};

#[test]
fn function_metadata_from_fixture() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let meta = FunctionView::new(ctx, call).metadata().unwrap();

    assert_eq!(meta.name().unwrap(), "STFC_STRUCTURE");
    assert_eq!(meta.parameter_count().unwrap(), 4);

    let params = meta.parameters().unwrap();
    let summary: Vec<_> = params.iter().map(|p| (p.name(), p.ty(), p.direction())).collect();
    assert_eq!(
        summary,
        vec![
            ("IMPORTSTRUCT", RfcType::Structure, RfcDirection::Import),
            ("ECHOSTRUCT", RfcType::Structure, RfcDirection::Export),
            ("RESPTEXT", RfcType::Char, RfcDirection::Export),
            ("RFCTABLE", RfcType::Table, RfcDirection::Tables),
        ]
    );

    let table = meta.parameter_by_name("RFCTABLE").unwrap();
    assert!(table.is_optional());
    assert_eq!(table.text(), "Table of test rows");
    assert_eq!(table.default_value(), "");

    let resp = meta.parameter(2).unwrap();
    assert_eq!(resp.nuc_length(), 255);
    assert_eq!(resp.uc_length(), 510);
    assert!(resp.type_metadata().is_none());
}

#[test]
fn nested_type_metadata() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let meta = FunctionView::new(ctx, call).metadata().unwrap();

    let line = meta.parameter_by_name("RFCTABLE").unwrap().type_metadata().unwrap();
    assert_eq!(line.name().unwrap(), "RFCTEST");
    assert_eq!(line.field_count().unwrap(), 12);

    let names: Vec<String> = line.fields().unwrap().iter().map(|f| f.name().to_string()).collect();
    assert_eq!(&names[..4], ["RFCFLOAT", "RFCCHAR1", "RFCINT2", "RFCINT1"]);

    let date = line.field_by_name("RFCDATE").unwrap();
    assert_eq!(date.ty(), RfcType::Date);
    assert_eq!(date.nuc_length(), 8);
    assert_eq!(date.uc_length(), 16);
    // FLOAT 8, CHAR1 1, INT2 2, INT1 1, CHAR4 4, INT 4, BYTE 3, CHAR2 2, TIME 6.
    assert_eq!(date.nuc_offset(), 31);
    assert!(date.type_metadata().is_none());

    let float = line.field(0).unwrap();
    assert_eq!(float.ty(), RfcType::Float);
    assert_eq!(float.description().nuc_offset, 0);
}

#[test]
fn structure_view_exposes_its_type() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));

    let ty = view.type_metadata().unwrap();
    assert_eq!(ty.name().unwrap(), "ZTEST");
    assert_eq!(ty.field(0).unwrap().name(), "TEST");
}

#[test]
fn metadata_lookups_do_not_soften_not_found() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let meta = FunctionView::new(ctx, call).metadata().unwrap();

    let err = meta.parameter_by_name("NOPE").unwrap_err();
    assert_eq!(err.native_info().map(|i| i.code), Some(RfcResultCode::InvalidParameter));
    assert!(err.to_string().starts_with("parameter 'NOPE': "), "{err}");

    assert!(meta.parameter(4).is_err());

    let line = meta.parameter(0).unwrap().type_metadata().unwrap();
    assert!(line.field(99).is_err());
    assert!(line.field_by_name("NOPE").is_err());
}

#[test]
fn metadata_propagates_native_failures() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let meta = FunctionView::new(ctx, call).metadata().unwrap();
    mem.fail_next("RfcGetFunctionName", RfcResultCode::CommunicationFailure);

    assert!(meta.name().is_err());
    assert_eq!(meta.name().unwrap(), "STFC_STRUCTURE");
}
