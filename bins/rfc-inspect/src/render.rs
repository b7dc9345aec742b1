//! JSON rendering of call values and call shapes.

use rfc_api::RfcResultCode;
use rfc_dynamic::{FieldMetadata, FunctionMetadata, FunctionView, ParameterMetadata, TypeMetadata};
use serde_json::{Map, Value as Json, json};

use crate::error::InspectError;

/// Parameter values keyed by name, in declaration order.
pub fn values(view: &FunctionView<'_>, parameter: Option<&str>) -> Result<Json, InspectError> {
    let mut map = Map::new();
    match parameter {
        Some(name) => {
            let value = view
                .get(name)?
                .ok_or_else(|| InspectError::UnknownParameter(name.to_string()))?;
            map.insert(name.to_string(), value.to_json()?);
        }
        None => {
            for entry in view {
                let (name, value) = entry?;
                let json = value.to_json().map_err(|e| e.with_context(format!("parameter '{name}'")))?;
                map.insert(name, json);
            }
        }
    }
    Ok(Json::Object(map))
}

/// Function name plus the full shape of every (or one) parameter.
pub fn metadata(meta: &FunctionMetadata<'_>, parameter: Option<&str>) -> Result<Json, InspectError> {
    let parameters = match parameter {
        Some(name) => match meta.parameter_by_name(name) {
            Ok(p) => vec![p],
            Err(e) if e.native_info().is_some_and(|i| i.code == RfcResultCode::InvalidParameter) => {
                return Err(InspectError::UnknownParameter(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        },
        None => meta.parameters()?,
    };

    let parameters = parameters.iter().map(parameter_json).collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "function": meta.name()?,
        "parameters": parameters,
    }))
}

fn parameter_json(p: &ParameterMetadata<'_>) -> Result<Json, InspectError> {
    Ok(json!({
        "name": p.name(),
        "type": serde_json::to_value(p.ty())?,
        "direction": serde_json::to_value(p.direction())?,
        "optional": p.is_optional(),
        "nuc_length": p.nuc_length(),
        "uc_length": p.uc_length(),
        "decimals": p.decimals(),
        "default": p.default_value(),
        "text": p.text(),
        "line_type": line_type(p.type_metadata())?,
    }))
}

fn field_json(f: &FieldMetadata<'_>) -> Result<Json, InspectError> {
    Ok(json!({
        "name": f.name(),
        "type": serde_json::to_value(f.ty())?,
        "nuc_length": f.nuc_length(),
        "nuc_offset": f.nuc_offset(),
        "uc_length": f.uc_length(),
        "uc_offset": f.uc_offset(),
        "decimals": f.decimals(),
        "line_type": line_type(f.type_metadata())?,
    }))
}

fn line_type(ty: Option<TypeMetadata<'_>>) -> Result<Json, InspectError> {
    let Some(ty) = ty else {
        return Ok(Json::Null);
    };
    let fields = ty.fields()?.iter().map(field_json).collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "name": ty.name()?,
        "fields": fields,
    }))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rfc_api::DataHandle;
    use rfc_dynamic::RfcContext;
    use rfc_interop_memory::{MemoryInterop, load_call};

    use super::*;

    fn stfc_structure(mem: &MemoryInterop) -> DataHandle {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../plugins/interop/memory/fixtures/stfc_structure.toml");
        load_call(mem, &path).unwrap()
    }

    #[test]
    fn renders_all_parameters_in_order() {
        let mem = MemoryInterop::new();
        let view = FunctionView::new(RfcContext::with_defaults(&mem), stfc_structure(&mem));

        let json = values(&view, None).unwrap();
        let names: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(names, ["IMPORTSTRUCT", "ECHOSTRUCT", "RESPTEXT", "RFCTABLE"]);

        assert_eq!(json["ECHOSTRUCT"]["RFCINT4"], json!(10));
        assert_eq!(json["ECHOSTRUCT"]["RFCDATE"], json!("2020-04-05"));
        assert_eq!(json["ECHOSTRUCT"]["RFCHEX3"], json!("AQID"));
        assert_eq!(json["RFCTABLE"].as_array().unwrap().len(), 2);
        assert_eq!(json["RFCTABLE"][1]["RFCINT4"], json!(2));
        assert_eq!(json["RFCTABLE"][1]["RFCDATE"], Json::Null);
    }

    #[test]
    fn renders_one_parameter() {
        let mem = MemoryInterop::new();
        let view = FunctionView::new(RfcContext::with_defaults(&mem), stfc_structure(&mem));

        let json = values(&view, Some("RFCTABLE")).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["RFCTABLE"][0]["RFCCHAR4"], json!("ROW1"));
    }

    #[test]
    fn renders_parameter_shape() {
        let mem = MemoryInterop::new();
        let view = FunctionView::new(RfcContext::with_defaults(&mem), stfc_structure(&mem));
        let meta = view.metadata().unwrap();

        let json = metadata(&meta, Some("RFCTABLE")).unwrap();
        assert_eq!(json["function"], json!("STFC_STRUCTURE"));
        let table = &json["parameters"][0];
        assert_eq!(table["type"], json!("table"));
        assert_eq!(table["direction"], json!("tables"));
        assert_eq!(table["optional"], json!(true));
        assert_eq!(table["line_type"]["name"], json!("RFCTEST"));
        assert_eq!(table["line_type"]["fields"].as_array().unwrap().len(), 12);
        assert_eq!(table["line_type"]["fields"][6]["type"], json!("byte"));
        assert_eq!(table["line_type"]["fields"][6]["nuc_length"], json!(3));

        let all = metadata(&meta, None).unwrap();
        assert_eq!(all["parameters"].as_array().unwrap().len(), 4);
        assert_eq!(all["parameters"][2]["line_type"], Json::Null);
    }

    #[test]
    fn unknown_parameter_is_reported_by_name() {
        let mem = MemoryInterop::new();
        let view = FunctionView::new(RfcContext::with_defaults(&mem), stfc_structure(&mem));
        let meta = view.metadata().unwrap();

        let err = values(&view, Some("NOPE")).unwrap_err();
        assert!(matches!(err, InspectError::UnknownParameter(ref p) if p == "NOPE"));
        let err = metadata(&meta, Some("NOPE")).unwrap_err();
        assert_eq!(err.to_string(), "function has no parameter 'NOPE'");
    }
}
