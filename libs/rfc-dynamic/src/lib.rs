//! Type-directed marshalling over native RFC containers.
//!
//! Given a container handle and the type tag of one of its fields, the
//! dispatcher picks a field extractor and returns a [`Value`]. Structures,
//! function parameter lists and tables are exposed as lazily-described views:
//! shape information (descriptor handle, field and row counts) is resolved on
//! first use and cached, values are extracted fresh on every access.
//!
//! Views borrow an [`RfcContext`] for `'a`, the lifetime of the session that
//! owns the native handles, and are not `Send`: a view and the table cursor
//! behind it belong to one thread.

pub mod config;
pub mod context;
pub mod decimal;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod function;
pub mod metadata;
pub mod object;
pub mod once;
pub mod structure;
pub mod table;
pub mod value;

pub use config::ExtractConfig;
pub use context::RfcContext;
pub use decimal::Decimal;
pub use error::DynamicError;
pub use function::{FunctionStrategy, FunctionView};
pub use metadata::{FieldMetadata, FunctionMetadata, ParameterMetadata, TypeMetadata};
pub use object::{DescriptorStrategy, DynamicObject, FieldKey};
pub use structure::{StructureStrategy, StructureView};
pub use table::{Rows, TableView};
pub use value::{FromValue, Value, ValueKind};
