//! Native container ABI contract.
//!
//! Everything the dynamic value layer needs from the native RFC library is
//! expressed here: opaque handles, type tags, result codes, the diagnostic
//! record and the [`interop::RfcInterop`] trait. Implementations live outside
//! this crate (a real library binding, or the in-memory interop used by tests).

pub mod description;
pub mod handle;
pub mod interop;
pub mod result;
pub mod types;

pub use description::{FieldDescription, ParameterDescription};
pub use handle::{DataHandle, FunctionDescHandle, TableHandle, TypeDescHandle};
pub use interop::RfcInterop;
pub use result::{ResultClass, RfcErrorGroup, RfcErrorInfo, RfcResult, RfcResultCode};
pub use types::{RfcDirection, RfcType};
