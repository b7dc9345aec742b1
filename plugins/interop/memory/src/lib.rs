//! In-memory implementation of the native container library.
//!
//! [`MemoryInterop`] answers every [`RfcInterop`](rfc_api::RfcInterop) query
//! from an arena built through its builder methods or from a
//! [`CallFixture`]. It reports failures with the same result codes the native
//! library uses, so the value layer can be exercised without a backend.

mod arena;
pub mod error;
pub mod fixture;
mod interop;
pub mod value;

pub use arena::MemoryInterop;
pub use error::MemoryError;
pub use fixture::{CallFixture, FieldFixture, ParameterFixture, TypeFixture, load_call};
pub use value::MemValue;
