use crate::description::{FieldDescription, ParameterDescription};
use crate::handle::{DataHandle, FunctionDescHandle, TableHandle, TypeDescHandle};
use crate::result::RfcResult;

/// The native container library, one method per native query.
///
/// Every method is a blocking call that either returns the requested value or
/// the diagnostic record filled by the library. Implementations must report an
/// unknown field/parameter (by name or index) with
/// [`RfcResultCode::InvalidParameter`](crate::result::RfcResultCode::InvalidParameter);
/// the value layer relies on that code to tell "absent" from "broken".
///
/// Table handles own a single row cursor that is shared by `move_to`,
/// `move_to_first_row` and `move_to_next_row`.
pub trait RfcInterop {
    // --- descriptors -------------------------------------------------------

    /// Line type of a structure or table row.
    fn describe_type(&self, data: DataHandle) -> RfcResult<TypeDescHandle>;

    /// Function description of a function call container.
    fn describe_function(&self, function: DataHandle) -> RfcResult<FunctionDescHandle>;

    fn get_field_count(&self, ty: TypeDescHandle) -> RfcResult<u32>;

    fn get_field_desc_by_index(&self, ty: TypeDescHandle, index: u32) -> RfcResult<FieldDescription>;

    fn get_field_desc_by_name(&self, ty: TypeDescHandle, name: &str) -> RfcResult<FieldDescription>;

    fn get_type_name(&self, ty: TypeDescHandle) -> RfcResult<String>;

    fn get_parameter_count(&self, function: FunctionDescHandle) -> RfcResult<u32>;

    fn get_parameter_desc_by_index(
        &self,
        function: FunctionDescHandle,
        index: u32,
    ) -> RfcResult<ParameterDescription>;

    fn get_parameter_desc_by_name(
        &self,
        function: FunctionDescHandle,
        name: &str,
    ) -> RfcResult<ParameterDescription>;

    fn get_function_name(&self, function: FunctionDescHandle) -> RfcResult<String>;

    // --- scalar fields -----------------------------------------------------

    /// Copy a character-like field into `buffer` (UTF-16 code units).
    ///
    /// Returns the number of code units written. Fails with
    /// `BufferTooSmall` if the value does not fit; use
    /// [`get_string_length`](Self::get_string_length) to size a new buffer.
    fn get_string(&self, data: DataHandle, name: &str, buffer: &mut [u16]) -> RfcResult<usize>;

    /// Length in UTF-16 code units of a character-like field.
    fn get_string_length(&self, data: DataHandle, name: &str) -> RfcResult<usize>;

    fn get_int(&self, data: DataHandle, name: &str) -> RfcResult<i32>;

    fn get_int8(&self, data: DataHandle, name: &str) -> RfcResult<i64>;

    fn get_float(&self, data: DataHandle, name: &str) -> RfcResult<f64>;

    /// Date as `YYYYMMDD` code units.
    fn get_date(&self, data: DataHandle, name: &str) -> RfcResult<[u16; 8]>;

    /// Time of day as `HHMMSS` code units.
    fn get_time(&self, data: DataHandle, name: &str) -> RfcResult<[u16; 6]>;

    /// Copy a raw byte field into `buffer`. Same sizing contract as
    /// [`get_string`](Self::get_string).
    fn get_bytes(&self, data: DataHandle, name: &str, buffer: &mut [u8]) -> RfcResult<usize>;

    fn get_bytes_length(&self, data: DataHandle, name: &str) -> RfcResult<usize>;

    // --- nested containers -------------------------------------------------

    /// Sub-handle of a structure field. Valid as long as `data` is.
    fn get_structure(&self, data: DataHandle, name: &str) -> RfcResult<DataHandle>;

    /// Sub-handle of a table field. Valid as long as `data` is.
    fn get_table(&self, data: DataHandle, name: &str) -> RfcResult<TableHandle>;

    // --- table navigation --------------------------------------------------

    fn get_row_count(&self, table: TableHandle) -> RfcResult<u32>;

    /// Position the cursor on row `index`. Out-of-range indices fail.
    fn move_to(&self, table: TableHandle, index: u32) -> RfcResult<()>;

    /// Position the cursor on the first row. Fails with `TableMoveBof` on an
    /// empty table.
    fn move_to_first_row(&self, table: TableHandle) -> RfcResult<()>;

    /// Advance the cursor. Fails with `TableMoveEof` past the last row.
    fn move_to_next_row(&self, table: TableHandle) -> RfcResult<()>;

    /// Row under the cursor.
    fn get_current_row(&self, table: TableHandle) -> RfcResult<DataHandle>;
}
