//! Type tag → extractor dispatch.

use rfc_api::{DataHandle, RfcType};

use crate::context::RfcContext;
use crate::error::{DynamicError, NativeResultExt};
use crate::fields::{
    BytesField, DateField, DecimalField, DoubleField, FieldExtractor, IntField, LongField, StringField, TimeField,
};
use crate::structure::StructureView;
use crate::table::TableView;
use crate::value::{Value, ValueKind};

/// Extract field `name` of `data` according to its type tag.
///
/// Nested structures and tables come back as views over sub-handles; nothing
/// inside them is read here. A tag without an extractor is fatal.
pub fn get_value<'a>(
    ctx: RfcContext<'a>,
    data: DataHandle,
    name: &str,
    ty: RfcType,
) -> Result<Value<'a>, DynamicError> {
    tracing::trace!(field = name, %ty, "extracting field");

    let value = match ty {
        RfcType::Char | RfcType::Num | RfcType::Bcd | RfcType::String => {
            Value::String(StringField::extract(ctx, data, name)?)
        }
        RfcType::Int | RfcType::Int2 | RfcType::Int1 => Value::Int(IntField::extract(ctx, data, name)?),
        RfcType::Int8 => Value::Long(LongField::extract(ctx, data, name)?),
        RfcType::Float => Value::Double(DoubleField::extract(ctx, data, name)?),
        RfcType::Decf16 | RfcType::Decf34 => Value::Decimal(DecimalField::extract(ctx, data, name)?),
        RfcType::Date => DateField::extract(ctx, data, name)?.map_or(Value::Absent, Value::Date),
        RfcType::Time => TimeField::extract(ctx, data, name)?.map_or(Value::Absent, Value::Time),
        RfcType::Byte | RfcType::XString => Value::Bytes(BytesField::extract(ctx, data, name)?),
        RfcType::Table => {
            let table = ctx.interop().get_table(data, name).fatal("RfcGetTable")?;
            Value::Table(TableView::new(ctx, table))
        }
        RfcType::Structure => {
            let structure = ctx.interop().get_structure(data, name).fatal("RfcGetStructure")?;
            Value::Structure(StructureView::new(ctx, structure))
        }
        RfcType::Null => Value::Absent,
        other => return Err(DynamicError::UnsupportedType(other)),
    };
    Ok(value)
}

/// Extract field `name` and convert it to `requested`.
///
/// `Ok(None)` is a conversion miss: the field was read but its value has no
/// representation as `requested`. With [`ValueKind::Any`] this never misses.
pub fn try_get_value<'a>(
    ctx: RfcContext<'a>,
    data: DataHandle,
    name: &str,
    ty: RfcType,
    requested: ValueKind,
) -> Result<Option<Value<'a>>, DynamicError> {
    let value = get_value(ctx, data, name, ty)?;
    let coerced = value.coerce(requested);
    if coerced.is_none() {
        tracing::trace!(field = name, %ty, ?requested, "value not convertible");
    }
    Ok(coerced)
}
