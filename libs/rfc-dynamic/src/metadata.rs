//! Read-only shape introspection.
//!
//! Independent of value extraction: these wrappers only talk to descriptor
//! handles. Lookups are meant for names and indices the caller knows to be
//! valid, so every native failure is an error here, "not found" included.

use rfc_api::{
    FieldDescription, FunctionDescHandle, ParameterDescription, RfcDirection, RfcType, TypeDescHandle,
};

use crate::context::RfcContext;
use crate::error::{DynamicError, NativeResultExt};

fn native_index(index: usize) -> u32 {
    // Indices beyond u32 cannot exist natively; let the library reject them.
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Shape of a function: name and parameters.
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata<'a> {
    ctx: RfcContext<'a>,
    handle: FunctionDescHandle,
}

impl<'a> FunctionMetadata<'a> {
    pub fn new(ctx: RfcContext<'a>, handle: FunctionDescHandle) -> Self {
        Self { ctx, handle }
    }

    #[inline]
    pub fn handle(&self) -> FunctionDescHandle {
        self.handle
    }

    pub fn name(&self) -> Result<String, DynamicError> {
        self.ctx.interop().get_function_name(self.handle).fatal("RfcGetFunctionName")
    }

    pub fn parameter_count(&self) -> Result<usize, DynamicError> {
        let count = self
            .ctx
            .interop()
            .get_parameter_count(self.handle)
            .fatal("RfcGetParameterCount")?;
        Ok(count as usize)
    }

    pub fn parameter(&self, index: usize) -> Result<ParameterMetadata<'a>, DynamicError> {
        let desc = self
            .ctx
            .interop()
            .get_parameter_desc_by_index(self.handle, native_index(index))
            .fatal("RfcGetParameterDescByIndex")?;
        Ok(ParameterMetadata::new(self.ctx, desc))
    }

    pub fn parameter_by_name(&self, name: &str) -> Result<ParameterMetadata<'a>, DynamicError> {
        let desc = self
            .ctx
            .interop()
            .get_parameter_desc_by_name(self.handle, name)
            .fatal("RfcGetParameterDescByName")
            .map_err(|e| e.with_context(format!("parameter '{name}'")))?;
        Ok(ParameterMetadata::new(self.ctx, desc))
    }

    /// All parameters in declaration order.
    pub fn parameters(&self) -> Result<Vec<ParameterMetadata<'a>>, DynamicError> {
        (0..self.parameter_count()?).map(|i| self.parameter(i)).collect()
    }
}

/// Shape of a structure or table line type.
#[derive(Debug, Clone, Copy)]
pub struct TypeMetadata<'a> {
    ctx: RfcContext<'a>,
    handle: TypeDescHandle,
}

impl<'a> TypeMetadata<'a> {
    pub fn new(ctx: RfcContext<'a>, handle: TypeDescHandle) -> Self {
        Self { ctx, handle }
    }

    #[inline]
    pub fn handle(&self) -> TypeDescHandle {
        self.handle
    }

    pub fn name(&self) -> Result<String, DynamicError> {
        self.ctx.interop().get_type_name(self.handle).fatal("RfcGetTypeName")
    }

    pub fn field_count(&self) -> Result<usize, DynamicError> {
        let count = self.ctx.interop().get_field_count(self.handle).fatal("RfcGetFieldCount")?;
        Ok(count as usize)
    }

    pub fn field(&self, index: usize) -> Result<FieldMetadata<'a>, DynamicError> {
        let desc = self
            .ctx
            .interop()
            .get_field_desc_by_index(self.handle, native_index(index))
            .fatal("RfcGetFieldDescByIndex")?;
        Ok(FieldMetadata::new(self.ctx, desc))
    }

    pub fn field_by_name(&self, name: &str) -> Result<FieldMetadata<'a>, DynamicError> {
        let desc = self
            .ctx
            .interop()
            .get_field_desc_by_name(self.handle, name)
            .fatal("RfcGetFieldDescByName")
            .map_err(|e| e.with_context(format!("field '{name}'")))?;
        Ok(FieldMetadata::new(self.ctx, desc))
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> Result<Vec<FieldMetadata<'a>>, DynamicError> {
        (0..self.field_count()?).map(|i| self.field(i)).collect()
    }
}

/// One field of a line type.
#[derive(Debug, Clone)]
pub struct FieldMetadata<'a> {
    ctx: RfcContext<'a>,
    desc: FieldDescription,
}

impl<'a> FieldMetadata<'a> {
    pub fn new(ctx: RfcContext<'a>, desc: FieldDescription) -> Self {
        Self { ctx, desc }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn ty(&self) -> RfcType {
        self.desc.ty
    }

    pub fn nuc_length(&self) -> u32 {
        self.desc.nuc_length
    }

    pub fn nuc_offset(&self) -> u32 {
        self.desc.nuc_offset
    }

    pub fn uc_length(&self) -> u32 {
        self.desc.uc_length
    }

    pub fn uc_offset(&self) -> u32 {
        self.desc.uc_offset
    }

    pub fn decimals(&self) -> u32 {
        self.desc.decimals
    }

    pub fn description(&self) -> &FieldDescription {
        &self.desc
    }

    /// Line type of a nested structure or table field; `None` for scalars.
    pub fn type_metadata(&self) -> Option<TypeMetadata<'a>> {
        nested(self.ctx, self.desc.type_desc)
    }
}

/// One parameter of a function.
#[derive(Debug, Clone)]
pub struct ParameterMetadata<'a> {
    ctx: RfcContext<'a>,
    desc: ParameterDescription,
}

impl<'a> ParameterMetadata<'a> {
    pub fn new(ctx: RfcContext<'a>, desc: ParameterDescription) -> Self {
        Self { ctx, desc }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn ty(&self) -> RfcType {
        self.desc.ty
    }

    pub fn direction(&self) -> RfcDirection {
        self.desc.direction
    }

    pub fn nuc_length(&self) -> u32 {
        self.desc.nuc_length
    }

    pub fn uc_length(&self) -> u32 {
        self.desc.uc_length
    }

    pub fn decimals(&self) -> u32 {
        self.desc.decimals
    }

    pub fn is_optional(&self) -> bool {
        self.desc.optional
    }

    pub fn default_value(&self) -> &str {
        &self.desc.default_value
    }

    /// Human-readable parameter text.
    pub fn text(&self) -> &str {
        &self.desc.parameter_text
    }

    pub fn description(&self) -> &ParameterDescription {
        &self.desc
    }

    /// Line type of a structure or table parameter; `None` for scalars.
    pub fn type_metadata(&self) -> Option<TypeMetadata<'a>> {
        nested(self.ctx, self.desc.type_desc)
    }
}

fn nested(ctx: RfcContext<'_>, handle: TypeDescHandle) -> Option<TypeMetadata<'_>> {
    (!handle.is_null()).then(|| TypeMetadata::new(ctx, handle))
}
