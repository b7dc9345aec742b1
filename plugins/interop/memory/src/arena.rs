use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use rfc_api::{
    DataHandle, FieldDescription, FunctionDescHandle, ParameterDescription, RfcErrorInfo, RfcResult, RfcResultCode,
    RfcType, TableHandle, TypeDescHandle,
};

use crate::error::MemoryError;
use crate::value::MemValue;

// ═══════════════════════════════════════════════════════════════
//  Arena nodes
// ═══════════════════════════════════════════════════════════════

pub(crate) struct TypeDef {
    pub name: String,
    pub fields: Vec<FieldDescription>,
}

pub(crate) struct FunctionDef {
    pub name: String,
    pub params: Vec<ParameterDescription>,
}

#[derive(Clone, Copy)]
pub(crate) enum Shape {
    Type(TypeDescHandle),
    Function(FunctionDescHandle),
}

pub(crate) struct Container {
    pub shape: Shape,
    pub values: HashMap<String, MemValue>,
}

pub(crate) struct Table {
    pub line_type: TypeDescHandle,
    pub rows: Vec<DataHandle>,
    /// The one row cursor; `None` until first positioned.
    pub cursor: Option<usize>,
}

pub(crate) enum Node {
    Type(TypeDef),
    Function(FunctionDef),
    Container(Container),
    Table(Table),
}

pub(crate) fn invalid_handle(what: &str, addr: usize) -> RfcErrorInfo {
    RfcErrorInfo::new(RfcResultCode::InvalidHandle, format!("{what} handle {addr:#x} is not valid"))
}

pub(crate) fn not_found(what: &str, name: impl std::fmt::Display) -> RfcErrorInfo {
    RfcErrorInfo::new(RfcResultCode::InvalidParameter, format!("{what} '{name}' not found"))
}

/// Slot storage. Handle address = slot index + 1, so no handle is null.
#[derive(Default)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len()
    }

    fn node(&self, addr: usize) -> Option<&Node> {
        addr.checked_sub(1).and_then(|slot| self.nodes.get(slot))
    }

    fn node_mut(&mut self, addr: usize) -> Option<&mut Node> {
        addr.checked_sub(1).and_then(|slot| self.nodes.get_mut(slot))
    }

    pub fn type_def(&self, h: TypeDescHandle) -> RfcResult<&TypeDef> {
        match self.node(h.addr()) {
            Some(Node::Type(def)) => Ok(def),
            _ => Err(invalid_handle("type description", h.addr())),
        }
    }

    pub fn function_def(&self, h: FunctionDescHandle) -> RfcResult<&FunctionDef> {
        match self.node(h.addr()) {
            Some(Node::Function(def)) => Ok(def),
            _ => Err(invalid_handle("function description", h.addr())),
        }
    }

    pub fn container(&self, h: DataHandle) -> RfcResult<&Container> {
        match self.node(h.addr()) {
            Some(Node::Container(c)) => Ok(c),
            _ => Err(invalid_handle("data container", h.addr())),
        }
    }

    pub fn container_mut(&mut self, h: DataHandle) -> RfcResult<&mut Container> {
        match self.node_mut(h.addr()) {
            Some(Node::Container(c)) => Ok(c),
            _ => Err(invalid_handle("data container", h.addr())),
        }
    }

    pub fn table(&self, h: TableHandle) -> RfcResult<&Table> {
        match self.node(h.addr()) {
            Some(Node::Table(t)) => Ok(t),
            _ => Err(invalid_handle("table", h.addr())),
        }
    }

    pub fn table_mut(&mut self, h: TableHandle) -> RfcResult<&mut Table> {
        match self.node_mut(h.addr()) {
            Some(Node::Table(t)) => Ok(t),
            _ => Err(invalid_handle("table", h.addr())),
        }
    }

    /// Type tag and nested line type of field `name` of a container.
    pub fn field_of(&self, data: DataHandle, name: &str) -> RfcResult<(RfcType, TypeDescHandle)> {
        match self.container(data)?.shape {
            Shape::Type(ty) => self
                .type_def(ty)?
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| (f.ty, f.type_desc))
                .ok_or_else(|| not_found("field", name)),
            Shape::Function(func) => self
                .function_def(func)?
                .params
                .iter()
                .find(|p| p.name == name)
                .map(|p| (p.ty, p.type_desc))
                .ok_or_else(|| not_found("parameter", name)),
        }
    }

    /// Stored or initial value of a scalar field, with its type tag.
    pub fn scalar(&self, data: DataHandle, name: &str) -> RfcResult<(RfcType, MemValue)> {
        let (ty, _) = self.field_of(data, name)?;
        let stored = self.container(data)?.values.get(name).cloned();
        stored
            .or_else(|| MemValue::initial(ty))
            .map(|value| (ty, value))
            .ok_or_else(|| {
                RfcErrorInfo::new(
                    RfcResultCode::ConversionFailure,
                    format!("field '{name}' of type {ty} has no scalar value"),
                )
            })
    }

    fn new_structure(&mut self, ty: TypeDescHandle) -> RfcResult<DataHandle> {
        self.type_def(ty)?;
        let addr = self.push(Node::Container(Container {
            shape: Shape::Type(ty),
            values: HashMap::new(),
        }));
        Ok(DataHandle::from_addr(addr))
    }

    fn new_table(&mut self, line_type: TypeDescHandle) -> RfcResult<TableHandle> {
        self.type_def(line_type)?;
        let addr = self.push(Node::Table(Table {
            line_type,
            rows: Vec::new(),
            cursor: None,
        }));
        Ok(TableHandle::from_addr(addr))
    }

    /// Sub-handle of a structure field, created empty on first access.
    pub fn structure_field(&mut self, data: DataHandle, name: &str) -> RfcResult<DataHandle> {
        let (ty, line_type) = self.field_of(data, name)?;
        if ty != RfcType::Structure {
            return Err(mismatch(name, ty, "structure"));
        }
        if let Some(MemValue::Structure(h)) = self.container(data)?.values.get(name) {
            return Ok(*h);
        }
        let h = self.new_structure(line_type)?;
        self.container_mut(data)?
            .values
            .insert(name.to_string(), MemValue::Structure(h));
        Ok(h)
    }

    /// Sub-handle of a table field, created empty on first access.
    pub fn table_field(&mut self, data: DataHandle, name: &str) -> RfcResult<TableHandle> {
        let (ty, line_type) = self.field_of(data, name)?;
        if ty != RfcType::Table {
            return Err(mismatch(name, ty, "table"));
        }
        if let Some(MemValue::Table(h)) = self.container(data)?.values.get(name) {
            return Ok(*h);
        }
        let h = self.new_table(line_type)?;
        self.container_mut(data)?
            .values
            .insert(name.to_string(), MemValue::Table(h));
        Ok(h)
    }
}

pub(crate) fn mismatch(name: &str, ty: RfcType, wanted: &str) -> RfcErrorInfo {
    RfcErrorInfo::new(
        RfcResultCode::ConversionFailure,
        format!("field '{name}' of type {ty} cannot be read as {wanted}"),
    )
}

// ═══════════════════════════════════════════════════════════════
//  MemoryInterop
// ═══════════════════════════════════════════════════════════════

/// In-memory stand-in for the native container library.
///
/// Descriptors, containers and tables live in one arena; handles are slot
/// addresses. Content is built with the builder methods below and read back
/// through [`RfcInterop`](rfc_api::RfcInterop) with native result codes.
/// Every native call is recorded in a journal and can be made to fail
/// with [`fail_next`](Self::fail_next).
///
/// All methods take `&self`, so content can still be added while views
/// borrow the interop.
#[derive(Default)]
pub struct MemoryInterop {
    pub(crate) arena: RefCell<Arena>,
    journal: RefCell<Vec<&'static str>>,
    faults: RefCell<HashMap<&'static str, VecDeque<RfcResultCode>>>,
}

impl MemoryInterop {
    pub fn new() -> Self {
        Self::default()
    }

    // --- descriptors -------------------------------------------------------

    /// Register a line type. Nested structure/table fields must carry the
    /// handle of their own line type in `type_desc`.
    pub fn define_type(&self, name: impl Into<String>, fields: Vec<FieldDescription>) -> TypeDescHandle {
        let addr = self.arena.borrow_mut().push(Node::Type(TypeDef {
            name: name.into(),
            fields,
        }));
        TypeDescHandle::from_addr(addr)
    }

    pub fn define_function(&self, name: impl Into<String>, params: Vec<ParameterDescription>) -> FunctionDescHandle {
        let addr = self.arena.borrow_mut().push(Node::Function(FunctionDef {
            name: name.into(),
            params,
        }));
        FunctionDescHandle::from_addr(addr)
    }

    /// Look up a field description without touching the call journal.
    pub fn field_description(&self, ty: TypeDescHandle, name: &str) -> Result<FieldDescription, MemoryError> {
        let arena = self.arena.borrow();
        let def = arena.type_def(ty)?;
        def.fields
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| MemoryError::Native(not_found("field", name)))
    }

    // --- containers --------------------------------------------------------

    pub fn create_structure(&self, ty: TypeDescHandle) -> Result<DataHandle, MemoryError> {
        Ok(self.arena.borrow_mut().new_structure(ty)?)
    }

    pub fn create_function(&self, function: FunctionDescHandle) -> Result<DataHandle, MemoryError> {
        let mut arena = self.arena.borrow_mut();
        arena.function_def(function)?;
        let addr = arena.push(Node::Container(Container {
            shape: Shape::Function(function),
            values: HashMap::new(),
        }));
        Ok(DataHandle::from_addr(addr))
    }

    pub fn create_table(&self, line_type: TypeDescHandle) -> Result<TableHandle, MemoryError> {
        Ok(self.arena.borrow_mut().new_table(line_type)?)
    }

    /// Append an empty row of the table's line type and return it.
    pub fn append_row(&self, table: TableHandle) -> Result<DataHandle, MemoryError> {
        let mut arena = self.arena.borrow_mut();
        let line_type = arena.table(table)?.line_type;
        let row = arena.new_structure(line_type)?;
        arena.table_mut(table)?.rows.push(row);
        Ok(row)
    }

    /// Store `value` in field `name`. The field must exist and its type
    /// must accept the value.
    pub fn set_value(&self, data: DataHandle, name: &str, value: MemValue) -> Result<(), MemoryError> {
        let mut arena = self.arena.borrow_mut();
        let (ty, _) = arena.field_of(data, name)?;
        if !value.fits(ty) {
            return Err(MemoryError::TypeMismatch {
                field: name.to_string(),
                ty,
                value: value.kind_name(),
            });
        }
        match &value {
            MemValue::Date(s) if s.chars().count() != 8 => {
                return Err(MemoryError::invalid_value(name, format!("date {s:?} is not 8 characters")));
            }
            MemValue::Time(s) if s.chars().count() != 6 => {
                return Err(MemoryError::invalid_value(name, format!("time {s:?} is not 6 characters")));
            }
            _ => {}
        }
        arena.container_mut(data)?.values.insert(name.to_string(), value);
        Ok(())
    }

    // --- journal and fault injection ----------------------------------------

    /// Native calls made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.journal.borrow().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.journal.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Make the next invocation of `call` (e.g. `"RfcGetInt"`) fail with
    /// `code`. Repeated calls queue up: each failure is consumed by one
    /// invocation.
    pub fn fail_next(&self, call: &'static str, code: RfcResultCode) {
        self.faults.borrow_mut().entry(call).or_default().push_back(code);
    }

    /// Record a native call and apply a pending injected failure.
    pub(crate) fn enter(&self, call: &'static str) -> RfcResult<()> {
        tracing::trace!(call, "native call");
        self.journal.borrow_mut().push(call);
        let injected = self.faults.borrow_mut().get_mut(call).and_then(VecDeque::pop_front);
        match injected {
            Some(code) => Err(RfcErrorInfo::new(code, format!("injected failure in {call}"))),
            None => Ok(()),
        }
    }
}
