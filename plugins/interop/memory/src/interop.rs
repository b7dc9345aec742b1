use rfc_api::{
    DataHandle, FieldDescription, FunctionDescHandle, ParameterDescription, RfcErrorInfo, RfcInterop, RfcResult,
    RfcResultCode, TableHandle, TypeDescHandle,
};

use crate::arena::{MemoryInterop, Shape, invalid_handle, mismatch, not_found};
use crate::value::MemValue;

fn buffer_too_small(name: &str, required: usize, given: usize) -> RfcErrorInfo {
    RfcErrorInfo::new(
        RfcResultCode::BufferTooSmall,
        format!("field '{name}' needs {required} units, buffer holds {given}"),
    )
}

fn native_text<const N: usize>(name: &str, text: &str) -> RfcResult<[u16; N]> {
    let units: Vec<u16> = text.encode_utf16().collect();
    units.try_into().map_err(|_| {
        RfcErrorInfo::new(
            RfcResultCode::ConversionFailure,
            format!("field '{name}' holds {text:?}, expected {N} characters"),
        )
    })
}

impl MemoryInterop {
    fn text(&self, data: DataHandle, name: &str) -> RfcResult<Vec<u16>> {
        let (ty, value) = self.arena.borrow().scalar(data, name)?;
        let text = value.to_text().ok_or_else(|| mismatch(name, ty, "text"))?;
        Ok(text.encode_utf16().collect())
    }

    fn bytes(&self, data: DataHandle, name: &str) -> RfcResult<Vec<u8>> {
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Bytes(b)) => Ok(b),
            (ty, _) => Err(mismatch(name, ty, "bytes")),
        }
    }

    fn parse_text<T: std::str::FromStr>(name: &str, ty: rfc_api::RfcType, text: &str) -> RfcResult<T> {
        text.trim().parse().map_err(|_| mismatch(name, ty, "a number"))
    }
}

impl RfcInterop for MemoryInterop {
    fn describe_type(&self, data: DataHandle) -> RfcResult<TypeDescHandle> {
        self.enter("RfcDescribeType")?;
        match self.arena.borrow().container(data)?.shape {
            Shape::Type(ty) => Ok(ty),
            Shape::Function(_) => Err(invalid_handle("structure", data.addr())),
        }
    }

    fn describe_function(&self, function: DataHandle) -> RfcResult<FunctionDescHandle> {
        self.enter("RfcDescribeFunction")?;
        match self.arena.borrow().container(function)?.shape {
            Shape::Function(desc) => Ok(desc),
            Shape::Type(_) => Err(invalid_handle("function", function.addr())),
        }
    }

    fn get_field_count(&self, ty: TypeDescHandle) -> RfcResult<u32> {
        self.enter("RfcGetFieldCount")?;
        Ok(self.arena.borrow().type_def(ty)?.fields.len() as u32)
    }

    fn get_field_desc_by_index(&self, ty: TypeDescHandle, index: u32) -> RfcResult<FieldDescription> {
        self.enter("RfcGetFieldDescByIndex")?;
        let arena = self.arena.borrow();
        arena
            .type_def(ty)?
            .fields
            .get(index as usize)
            .cloned()
            .ok_or_else(|| not_found("field index", index))
    }

    fn get_field_desc_by_name(&self, ty: TypeDescHandle, name: &str) -> RfcResult<FieldDescription> {
        self.enter("RfcGetFieldDescByName")?;
        let arena = self.arena.borrow();
        arena
            .type_def(ty)?
            .fields
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| not_found("field", name))
    }

    fn get_type_name(&self, ty: TypeDescHandle) -> RfcResult<String> {
        self.enter("RfcGetTypeName")?;
        Ok(self.arena.borrow().type_def(ty)?.name.clone())
    }

    fn get_parameter_count(&self, function: FunctionDescHandle) -> RfcResult<u32> {
        self.enter("RfcGetParameterCount")?;
        Ok(self.arena.borrow().function_def(function)?.params.len() as u32)
    }

    fn get_parameter_desc_by_index(&self, function: FunctionDescHandle, index: u32) -> RfcResult<ParameterDescription> {
        self.enter("RfcGetParameterDescByIndex")?;
        let arena = self.arena.borrow();
        arena
            .function_def(function)?
            .params
            .get(index as usize)
            .cloned()
            .ok_or_else(|| not_found("parameter index", index))
    }

    fn get_parameter_desc_by_name(&self, function: FunctionDescHandle, name: &str) -> RfcResult<ParameterDescription> {
        self.enter("RfcGetParameterDescByName")?;
        let arena = self.arena.borrow();
        arena
            .function_def(function)?
            .params
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| not_found("parameter", name))
    }

    fn get_function_name(&self, function: FunctionDescHandle) -> RfcResult<String> {
        self.enter("RfcGetFunctionName")?;
        Ok(self.arena.borrow().function_def(function)?.name.clone())
    }

    // Strings need room for a terminating zero, like the native call.
    fn get_string(&self, data: DataHandle, name: &str, buffer: &mut [u16]) -> RfcResult<usize> {
        self.enter("RfcGetString")?;
        let units = self.text(data, name)?;
        if buffer.len() <= units.len() {
            return Err(buffer_too_small(name, units.len() + 1, buffer.len()));
        }
        buffer[..units.len()].copy_from_slice(&units);
        buffer[units.len()] = 0;
        Ok(units.len())
    }

    fn get_string_length(&self, data: DataHandle, name: &str) -> RfcResult<usize> {
        self.enter("RfcGetStringLength")?;
        Ok(self.text(data, name)?.len())
    }

    fn get_int(&self, data: DataHandle, name: &str) -> RfcResult<i32> {
        self.enter("RfcGetInt")?;
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Int(v)) => Ok(v),
            (ty, MemValue::Int8(v)) => i32::try_from(v).map_err(|_| mismatch(name, ty, "int")),
            (ty, MemValue::Chars(s)) => Self::parse_text(name, ty, &s),
            (ty, _) => Err(mismatch(name, ty, "int")),
        }
    }

    fn get_int8(&self, data: DataHandle, name: &str) -> RfcResult<i64> {
        self.enter("RfcGetInt8")?;
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Int(v)) => Ok(v.into()),
            (_, MemValue::Int8(v)) => Ok(v),
            (ty, MemValue::Chars(s)) => Self::parse_text(name, ty, &s),
            (ty, _) => Err(mismatch(name, ty, "int8")),
        }
    }

    fn get_float(&self, data: DataHandle, name: &str) -> RfcResult<f64> {
        self.enter("RfcGetFloat")?;
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Float(v)) => Ok(v),
            (_, MemValue::Int(v)) => Ok(v.into()),
            (_, MemValue::Int8(v)) => Ok(v as f64),
            (ty, MemValue::Chars(s)) => Self::parse_text(name, ty, &s),
            (ty, _) => Err(mismatch(name, ty, "float")),
        }
    }

    fn get_date(&self, data: DataHandle, name: &str) -> RfcResult<[u16; 8]> {
        self.enter("RfcGetDate")?;
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Date(s) | MemValue::Chars(s)) => native_text(name, &s),
            (ty, _) => Err(mismatch(name, ty, "date")),
        }
    }

    fn get_time(&self, data: DataHandle, name: &str) -> RfcResult<[u16; 6]> {
        self.enter("RfcGetTime")?;
        match self.arena.borrow().scalar(data, name)? {
            (_, MemValue::Time(s) | MemValue::Chars(s)) => native_text(name, &s),
            (ty, _) => Err(mismatch(name, ty, "time")),
        }
    }

    fn get_bytes(&self, data: DataHandle, name: &str, buffer: &mut [u8]) -> RfcResult<usize> {
        self.enter("RfcGetBytes")?;
        let bytes = self.bytes(data, name)?;
        if buffer.len() < bytes.len() {
            return Err(buffer_too_small(name, bytes.len(), buffer.len()));
        }
        buffer[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn get_bytes_length(&self, data: DataHandle, name: &str) -> RfcResult<usize> {
        self.enter("RfcGetBytesLength")?;
        Ok(self.bytes(data, name)?.len())
    }

    fn get_structure(&self, data: DataHandle, name: &str) -> RfcResult<DataHandle> {
        self.enter("RfcGetStructure")?;
        self.arena.borrow_mut().structure_field(data, name)
    }

    fn get_table(&self, data: DataHandle, name: &str) -> RfcResult<TableHandle> {
        self.enter("RfcGetTable")?;
        self.arena.borrow_mut().table_field(data, name)
    }

    fn get_row_count(&self, table: TableHandle) -> RfcResult<u32> {
        self.enter("RfcGetRowCount")?;
        Ok(self.arena.borrow().table(table)?.rows.len() as u32)
    }

    fn move_to(&self, table: TableHandle, index: u32) -> RfcResult<()> {
        self.enter("RfcMoveTo")?;
        let mut arena = self.arena.borrow_mut();
        let t = arena.table_mut(table)?;
        let index = index as usize;
        if index >= t.rows.len() {
            return Err(RfcErrorInfo::new(
                RfcResultCode::TableMoveEof,
                format!("row {index} is past the end of a {}-row table", t.rows.len()),
            ));
        }
        t.cursor = Some(index);
        Ok(())
    }

    fn move_to_first_row(&self, table: TableHandle) -> RfcResult<()> {
        self.enter("RfcMoveToFirstRow")?;
        let mut arena = self.arena.borrow_mut();
        let t = arena.table_mut(table)?;
        if t.rows.is_empty() {
            return Err(RfcErrorInfo::new(RfcResultCode::TableMoveBof, "table is empty"));
        }
        t.cursor = Some(0);
        Ok(())
    }

    fn move_to_next_row(&self, table: TableHandle) -> RfcResult<()> {
        self.enter("RfcMoveToNextRow")?;
        let mut arena = self.arena.borrow_mut();
        let t = arena.table_mut(table)?;
        let next = t.cursor.map_or(0, |i| i + 1);
        if next >= t.rows.len() {
            return Err(RfcErrorInfo::new(RfcResultCode::TableMoveEof, "no more rows"));
        }
        t.cursor = Some(next);
        Ok(())
    }

    fn get_current_row(&self, table: TableHandle) -> RfcResult<DataHandle> {
        self.enter("RfcGetCurrentRow")?;
        let arena = self.arena.borrow();
        let t = arena.table(table)?;
        t.cursor
            .and_then(|i| t.rows.get(i).copied())
            .ok_or_else(|| RfcErrorInfo::new(RfcResultCode::TableMoveBof, "cursor is not on a row"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rfc_api::{FieldDescription, RfcType};

    use super::*;

    fn structure(mem: &MemoryInterop, fields: Vec<FieldDescription>) -> DataHandle {
        let ty = mem.define_type("ZT", fields);
        mem.create_structure(ty).unwrap()
    }

    #[test]
    fn string_needs_room_for_terminator() {
        let mem = MemoryInterop::new();
        let s = structure(&mem, vec![FieldDescription::new("NAME", RfcType::Char)]);
        mem.set_value(s, "NAME", MemValue::chars("ABCD")).unwrap();

        let mut small = [0u16; 4];
        let err = mem.get_string(s, "NAME", &mut small).unwrap_err();
        assert_eq!(err.code, RfcResultCode::BufferTooSmall);
        assert_eq!(mem.get_string_length(s, "NAME").unwrap(), 4);

        let mut fits = [0u16; 5];
        assert_eq!(mem.get_string(s, "NAME", &mut fits).unwrap(), 4);
        assert_eq!(String::from_utf16(&fits[..4]).unwrap(), "ABCD");
    }

    #[test]
    fn unknown_field_is_invalid_parameter() {
        let mem = MemoryInterop::new();
        let s = structure(&mem, vec![FieldDescription::new("A", RfcType::Int)]);
        let err = mem.get_int(s, "B").unwrap_err();
        assert_eq!(err.code, RfcResultCode::InvalidParameter);
        let ty = mem.describe_type(s).unwrap();
        assert_eq!(mem.get_field_desc_by_index(ty, 1).unwrap_err().code, RfcResultCode::InvalidParameter);
    }

    #[test]
    fn unset_fields_read_as_initial() {
        let mem = MemoryInterop::new();
        let s = structure(
            &mem,
            vec![
                FieldDescription::new("N", RfcType::Int),
                FieldDescription::new("D", RfcType::Date),
            ],
        );
        assert_eq!(mem.get_int(s, "N").unwrap(), 0);
        assert_eq!(String::from_utf16_lossy(&mem.get_date(s, "D").unwrap()), "00000000");
    }

    #[test]
    fn cursor_walk() {
        let mem = MemoryInterop::new();
        let ty = mem.define_type("ROW", vec![FieldDescription::new("N", RfcType::Int)]);
        let t = mem.create_table(ty).unwrap();
        assert_eq!(mem.move_to_first_row(t).unwrap_err().code, RfcResultCode::TableMoveBof);

        let r0 = mem.append_row(t).unwrap();
        let r1 = mem.append_row(t).unwrap();
        mem.move_to_first_row(t).unwrap();
        assert_eq!(mem.get_current_row(t).unwrap(), r0);
        mem.move_to_next_row(t).unwrap();
        assert_eq!(mem.get_current_row(t).unwrap(), r1);
        assert_eq!(mem.move_to_next_row(t).unwrap_err().code, RfcResultCode::TableMoveEof);
        assert_eq!(mem.move_to(t, 2).unwrap_err().code, RfcResultCode::TableMoveEof);
        mem.move_to(t, 0).unwrap();
        assert_eq!(mem.get_current_row(t).unwrap(), r0);
    }

    #[test]
    fn nested_containers_are_created_on_first_access() {
        let mem = MemoryInterop::new();
        let inner = mem.define_type("INNER", vec![FieldDescription::new("X", RfcType::Int)]);
        let mut field = FieldDescription::new("SUB", RfcType::Structure);
        field.type_desc = inner;
        let s = structure(&mem, vec![field]);

        let sub = mem.get_structure(s, "SUB").unwrap();
        assert_eq!(mem.get_structure(s, "SUB").unwrap(), sub);
        assert_eq!(mem.describe_type(sub).unwrap(), inner);
        assert_eq!(mem.get_table(s, "SUB").unwrap_err().code, RfcResultCode::ConversionFailure);
    }
}
