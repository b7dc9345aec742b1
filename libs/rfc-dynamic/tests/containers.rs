mod common;

use pretty_assertions::assert_eq;
use rfc_api::{RfcInterop, RfcResultCode, RfcType};
use rfc_dynamic::{DynamicError, FunctionView, RfcContext, StructureView, TableView, Value, ValueKind};
use rfc_interop_memory::{MemValue, MemoryInterop, load_call};

use common::{field, fixture_path, nested, test_structure, test_type};

#[test]
fn structure_with_one_integer_field() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));

    assert_eq!(view.count().unwrap(), 1);
    assert_eq!(view.get("TEST").unwrap(), Some(Value::Int(10)));
    assert_eq!(view.get_index(0).unwrap(), Some(("TEST".to_string(), Value::Int(10))));

    let pairs: Vec<_> = view.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(pairs, vec![("TEST".to_string(), Value::Int(10))]);
}

#[test]
fn unknown_names_are_soft_misses() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));

    assert!(view.contains_key("TEST").unwrap());
    assert!(!view.contains_key("NOPE").unwrap());
    assert_eq!(view.get("NOPE").unwrap(), None);
    assert_eq!(view.get_as::<i32>("NOPE").unwrap(), None);
    assert_eq!(view.get_index(1).unwrap(), None);
    assert_eq!(view.get_index(usize::MAX).unwrap(), None);
}

#[test]
fn typed_access_converts_or_misses() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));

    assert_eq!(view.get_as::<i32>("TEST").unwrap(), Some(10));
    assert_eq!(view.get_as::<i64>("TEST").unwrap(), Some(10));
    assert_eq!(view.get_as::<String>("TEST").unwrap(), Some("10".to_string()));
    assert_eq!(view.get_as::<Vec<u8>>("TEST").unwrap(), None);
    assert_eq!(
        view.get_index_with(0, ValueKind::Double).unwrap(),
        Some(("TEST".to_string(), Value::Double(10.0)))
    );
    assert_eq!(view.get_index_with(0, ValueKind::Date).unwrap(), None);
}

#[test]
fn shape_is_resolved_once() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));
    mem.clear_calls();

    for _ in 0..3 {
        assert_eq!(view.count().unwrap(), 1);
        assert!(view.contains_key("TEST").unwrap());
        view.iter().for_each(drop);
    }
    assert_eq!(mem.call_count("RfcDescribeType"), 1);
    assert_eq!(mem.call_count("RfcGetFieldCount"), 1);
    // Field lookups and values are not cached.
    assert_eq!(mem.call_count("RfcGetFieldDescByName"), 3);
    assert_eq!(mem.call_count("RfcGetInt"), 3);
}

#[test]
fn values_are_read_fresh_on_every_access() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let s = test_structure(&mem);
    let view = StructureView::new(ctx, s);

    assert_eq!(view.get_as::<i32>("TEST").unwrap(), Some(10));
    mem.set_value(s, "TEST", MemValue::Int(11)).unwrap();
    assert_eq!(view.get_as::<i32>("TEST").unwrap(), Some(11));
}

#[test]
fn iteration_follows_descriptor_order_and_restarts() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let ty = mem.define_type(
        "ZORDER",
        vec![
            field("ZULU", RfcType::Int),
            field("ALPHA", RfcType::Char),
            field("MIKE", RfcType::Float),
        ],
    );
    let s = mem.create_structure(ty).unwrap();
    mem.set_value(s, "ZULU", MemValue::Int(26)).unwrap();
    mem.set_value(s, "ALPHA", MemValue::chars("A")).unwrap();
    mem.set_value(s, "MIKE", MemValue::Float(13.0)).unwrap();
    let view = StructureView::new(ctx, s);

    let keys: Vec<String> = view.keys().collect::<Result<_, _>>().unwrap();
    assert_eq!(keys, ["ZULU", "ALPHA", "MIKE"]);

    let values: Vec<Value> = view.values().collect::<Result<_, _>>().unwrap();
    assert_eq!(values, vec![Value::Int(26), Value::String("A".into()), Value::Double(13.0)]);

    let first: Vec<_> = view.iter().collect::<Result<_, _>>().unwrap();
    let second: Vec<_> = (&view).into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(first, second);

    let indexed: Vec<_> = (0..view.count().unwrap())
        .map(|i| view.get_index(i).unwrap().unwrap())
        .collect();
    assert_eq!(first, indexed);
}

#[test]
fn iterator_size_is_known_after_count() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));

    assert_eq!(view.keys().size_hint(), (0, None));
    view.count().unwrap();
    let mut keys = view.keys();
    assert_eq!(keys.size_hint(), (1, Some(1)));
    keys.next();
    assert_eq!(keys.size_hint(), (0, Some(0)));
}

#[test]
fn failed_describe_is_fatal_and_not_cached() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));
    mem.fail_next("RfcDescribeType", RfcResultCode::InvalidHandle);

    let err = view.count().unwrap_err();
    assert!(matches!(err, DynamicError::Native { call: "RfcDescribeType", .. }));
    // Not-found only softens field lookups, never the descriptor itself.
    mem.fail_next("RfcDescribeType", RfcResultCode::InvalidParameter);
    assert!(view.contains_key("TEST").is_err());

    assert_eq!(view.count().unwrap(), 1);
}

#[test]
fn fatal_field_lookup_is_not_a_miss() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));
    mem.fail_next("RfcGetFieldDescByName", RfcResultCode::CommunicationFailure);

    let err = view.contains_key("TEST").unwrap_err();
    assert_eq!(err.native_info().map(|i| i.code), Some(RfcResultCode::CommunicationFailure));
}

#[test]
fn hole_in_descriptor_ends_iteration_with_an_error() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let view = StructureView::new(ctx, test_structure(&mem));
    mem.fail_next("RfcGetFieldDescByIndex", RfcResultCode::InvalidParameter);

    let mut iter = view.iter();
    let err = iter.next().unwrap().unwrap_err();
    assert!(matches!(err, DynamicError::MissingField { index: 0, count: 1 }));
    assert!(iter.next().is_none());

    // A fresh iteration starts over.
    assert_eq!(view.iter().count(), 1);
}

#[test]
fn value_failure_during_iteration_fuses() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let ty = mem.define_type("ZTWO", vec![field("A", RfcType::Int), field("B", RfcType::Int)]);
    let view = StructureView::new(ctx, mem.create_structure(ty).unwrap());
    mem.fail_next("RfcGetInt", RfcResultCode::Timeout);

    let results: Vec<_> = view.values().collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn nested_containers_are_lazy_views() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let line = test_type(&mem);
    let outer_ty = mem.define_type(
        "ZOUTER",
        vec![
            nested("HEAD", RfcType::Structure, line),
            nested("ITEMS", RfcType::Table, line),
        ],
    );
    let outer = mem.create_structure(outer_ty).unwrap();
    let head = mem.create_structure(line).unwrap();
    mem.set_value(head, "TEST", MemValue::Int(5)).unwrap();
    mem.set_value(outer, "HEAD", MemValue::Structure(head)).unwrap();

    let view = StructureView::new(ctx, outer);
    mem.clear_calls();

    let head_view = view.get_as::<StructureView>("HEAD").unwrap().unwrap();
    assert_eq!(head_view.handle(), head);
    // Nothing inside the nested structure has been read yet.
    assert_eq!(mem.call_count("RfcDescribeType"), 1);
    assert_eq!(mem.call_count("RfcGetInt"), 0);
    assert_eq!(head_view.get_as::<i32>("TEST").unwrap(), Some(5));

    let items = view.get_as::<TableView>("ITEMS").unwrap().unwrap();
    assert_eq!(items.count().unwrap(), 0);
}

#[test]
fn structure_materialises_as_json() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let line = test_type(&mem);
    let ty = mem.define_type(
        "ZDOC",
        vec![
            field("NAME", RfcType::Char),
            field("RAW", RfcType::Byte),
            field("DUE", RfcType::Date),
            nested("ROWS", RfcType::Table, line),
        ],
    );
    let s = mem.create_structure(ty).unwrap();
    mem.set_value(s, "NAME", MemValue::chars("X1")).unwrap();
    mem.set_value(s, "RAW", MemValue::Bytes(vec![1, 2, 3])).unwrap();
    let rows = mem.get_table(s, "ROWS").unwrap();
    for v in [1, 2] {
        let row = mem.append_row(rows).unwrap();
        mem.set_value(row, "TEST", MemValue::Int(v)).unwrap();
    }

    let json = Value::Structure(StructureView::new(ctx, s)).to_json().unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "NAME": "X1",
            "RAW": "AQID",
            "DUE": null,
            "ROWS": [{ "TEST": 1 }, { "TEST": 2 }],
        })
    );
    assert_eq!(json.as_object().unwrap().keys().collect::<Vec<_>>(), ["NAME", "RAW", "DUE", "ROWS"]);
}

#[test]
fn function_view_over_a_fixture_call() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let view = FunctionView::new(ctx, call);

    assert_eq!(view.count().unwrap(), 4);
    let keys: Vec<String> = view.keys().collect::<Result<_, _>>().unwrap();
    assert_eq!(keys, ["IMPORTSTRUCT", "ECHOSTRUCT", "RESPTEXT", "RFCTABLE"]);
    assert_eq!(
        view.get_as::<String>("RESPTEXT").unwrap().as_deref(),
        Some("SAP R/3 Rel. 750 Sysid: NPL")
    );
    assert!(!view.contains_key("RFCINT4").unwrap());

    let echo = view.get_as::<StructureView>("ECHOSTRUCT").unwrap().unwrap();
    assert_eq!(echo.count().unwrap(), 12);
    assert_eq!(echo.get_as::<i32>("RFCINT4").unwrap(), Some(10));
    assert_eq!(echo.get("RFCHEX3").unwrap(), Some(Value::Bytes(vec![1, 2, 3])));

    let table = view.get_as::<TableView>("RFCTABLE").unwrap().unwrap();
    assert_eq!(table.count().unwrap(), 2);
}

#[test]
fn function_view_with_known_descriptor_skips_describe() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();
    let desc = mem.describe_function(call).unwrap();
    mem.clear_calls();

    let view = FunctionView::with_descriptor(ctx, call, desc);
    assert_eq!(view.count().unwrap(), 4);
    assert_eq!(mem.call_count("RfcDescribeFunction"), 0);
    assert_eq!(mem.call_count("RfcGetParameterCount"), 1);
}

#[test]
fn structure_strategy_rejects_function_handles() {
    let mem = MemoryInterop::new();
    let ctx = RfcContext::with_defaults(&mem);
    let call = load_call(&mem, &fixture_path("stfc_structure.toml")).unwrap();

    let wrong = StructureView::new(ctx, call);
    let err = wrong.count().unwrap_err();
    assert_eq!(err.native_info().map(|i| i.code), Some(RfcResultCode::InvalidHandle));
}
