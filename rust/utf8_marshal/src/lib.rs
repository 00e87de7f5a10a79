//! utf8_marshal (staticlib + rlib)
//!
//! Moves UTF-8 text across a C ABI: NUL-terminated buffers on the foreign side,
//! `String` on the Rust side.
//!
//! Design rule: keep this file thin.

mod alloc;
mod error;
mod ffi;
mod marshal;
mod util;

// Export C ABI symbols.
pub use ffi::exports::*;

pub use alloc::{CHeap, ForeignAllocator};
pub use error::MarshalError;
pub use ffi::types::ForeignText;
pub use marshal::{decode, encode, release, Marshaller};
pub use util::config::{MarshalConfig, Utf8Policy};
