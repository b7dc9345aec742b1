use rfc_api::{DataHandle, TypeDescHandle};

use crate::context::RfcContext;
use crate::error::{DynamicError, NativeResultExt};
use crate::metadata::TypeMetadata;
use crate::object::{DescriptorStrategy, DynamicObject, FieldKey};

/// Structures and table rows: described by their line type.
#[derive(Debug)]
pub enum StructureStrategy {}

/// View over a structure or a table row.
pub type StructureView<'a> = DynamicObject<'a, StructureStrategy>;

impl DescriptorStrategy for StructureStrategy {
    type Desc = TypeDescHandle;

    const NAME: &'static str = "Structure";

    fn describe(ctx: RfcContext<'_>, handle: DataHandle) -> Result<TypeDescHandle, DynamicError> {
        ctx.interop().describe_type(handle).fatal("RfcDescribeType")
    }

    fn count(ctx: RfcContext<'_>, desc: TypeDescHandle) -> Result<usize, DynamicError> {
        let count = ctx.interop().get_field_count(desc).fatal("RfcGetFieldCount")?;
        Ok(count as usize)
    }

    fn field_by_index(
        ctx: RfcContext<'_>,
        desc: TypeDescHandle,
        index: usize,
    ) -> Result<Option<FieldKey>, DynamicError> {
        let Ok(index) = u32::try_from(index) else {
            return Ok(None);
        };
        let field = ctx
            .interop()
            .get_field_desc_by_index(desc, index)
            .soft("RfcGetFieldDescByIndex")?;
        Ok(field.map(|f| FieldKey { name: f.name, ty: f.ty }))
    }

    fn field_by_name(ctx: RfcContext<'_>, desc: TypeDescHandle, name: &str) -> Result<Option<FieldKey>, DynamicError> {
        let field = ctx
            .interop()
            .get_field_desc_by_name(desc, name)
            .soft("RfcGetFieldDescByName")?;
        Ok(field.map(|f| FieldKey { name: f.name, ty: f.ty }))
    }
}

impl<'a> StructureView<'a> {
    /// Static shape of this structure's line type.
    pub fn type_metadata(&self) -> Result<TypeMetadata<'a>, DynamicError> {
        Ok(TypeMetadata::new(self.context(), self.descriptor()?))
    }
}
