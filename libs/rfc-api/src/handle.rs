use core::ffi::c_void;

/// Generates an opaque, non-owning handle type over a native pointer.
///
/// Handles are `Copy` and compare by address. They are deliberately
/// `!Send + !Sync` (raw pointer inside): a handle belongs to the thread of the
/// call that produced it.
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name(*mut c_void);

        impl $name {
            /// Wrap a pointer returned by the native library.
            #[inline]
            pub const fn from_raw(ptr: *mut c_void) -> Self {
                Self(ptr)
            }

            /// Build a handle from a plain address (arena slot, test id).
            #[inline]
            pub fn from_addr(addr: usize) -> Self {
                Self(core::ptr::without_provenance_mut(addr))
            }

            #[inline]
            pub const fn null() -> Self {
                Self(core::ptr::null_mut())
            }

            #[inline]
            pub fn is_null(self) -> bool {
                self.0.is_null()
            }

            #[inline]
            pub const fn as_raw(self) -> *mut c_void {
                self.0
            }

            #[inline]
            pub fn addr(self) -> usize {
                self.0.addr()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.addr())
            }
        }
    };
}

define_handle!(
    /// A data container: structure instance, function call, or table row.
    DataHandle
);

define_handle!(
    /// A table container with its own row cursor.
    TableHandle
);

define_handle!(
    /// Description of a structure/table line type.
    TypeDescHandle
);

define_handle!(
    /// Description of a function module (its parameter list).
    FunctionDescHandle
);
