use rfc_api::{DataHandle, FunctionDescHandle};

use crate::context::RfcContext;
use crate::error::{DynamicError, NativeResultExt};
use crate::metadata::FunctionMetadata;
use crate::object::{DescriptorStrategy, DynamicObject, FieldKey};

/// Function calls: described by the function description, one entry per
/// parameter.
#[derive(Debug)]
pub enum FunctionStrategy {}

/// View over the parameter list of a function call.
pub type FunctionView<'a> = DynamicObject<'a, FunctionStrategy>;

impl DescriptorStrategy for FunctionStrategy {
    type Desc = FunctionDescHandle;

    const NAME: &'static str = "Function";

    fn describe(ctx: RfcContext<'_>, handle: DataHandle) -> Result<FunctionDescHandle, DynamicError> {
        ctx.interop().describe_function(handle).fatal("RfcDescribeFunction")
    }

    fn count(ctx: RfcContext<'_>, desc: FunctionDescHandle) -> Result<usize, DynamicError> {
        let count = ctx.interop().get_parameter_count(desc).fatal("RfcGetParameterCount")?;
        Ok(count as usize)
    }

    fn field_by_index(
        ctx: RfcContext<'_>,
        desc: FunctionDescHandle,
        index: usize,
    ) -> Result<Option<FieldKey>, DynamicError> {
        let Ok(index) = u32::try_from(index) else {
            return Ok(None);
        };
        let param = ctx
            .interop()
            .get_parameter_desc_by_index(desc, index)
            .soft("RfcGetParameterDescByIndex")?;
        Ok(param.map(|p| FieldKey { name: p.name, ty: p.ty }))
    }

    fn field_by_name(
        ctx: RfcContext<'_>,
        desc: FunctionDescHandle,
        name: &str,
    ) -> Result<Option<FieldKey>, DynamicError> {
        let param = ctx
            .interop()
            .get_parameter_desc_by_name(desc, name)
            .soft("RfcGetParameterDescByName")?;
        Ok(param.map(|p| FieldKey { name: p.name, ty: p.ty }))
    }
}

impl<'a> FunctionView<'a> {
    /// Name, parameters and parameter types of the called function.
    pub fn metadata(&self) -> Result<FunctionMetadata<'a>, DynamicError> {
        Ok(FunctionMetadata::new(self.context(), self.descriptor()?))
    }
}
