//! The marshaller: foreign NUL-terminated UTF-8 <-> Rust `String`.
//!
//! Stateless apart from its allocator and configuration, so one instance can
//! serve any number of threads.

mod scan;

use core::ffi::c_char;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};

use crate::alloc::{CHeap, ForeignAllocator};
use crate::error::MarshalError;
use crate::ffi::types::ForeignText;
use crate::util::config::{marshal_config, MarshalConfig, Utf8Policy};
use crate::util::logging::init_logger;

use scan::terminated_len;

pub struct Marshaller<A: ForeignAllocator = CHeap> {
    alloc: A,
    config: MarshalConfig,
}

impl Marshaller<CHeap> {
    /// C heap allocator with the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(CHeap, *marshal_config())
    }
}

impl Default for Marshaller<CHeap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ForeignAllocator> Marshaller<A> {
    pub fn with_config(alloc: A, config: MarshalConfig) -> Self {
        Self { alloc, config }
    }

    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Copy a foreign NUL-terminated string into a new `String`.
    ///
    /// A null `ptr` is "no value" and yields `Ok(None)`. The foreign memory is
    /// only read, never freed or written.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to readable memory holding a NUL terminator
    /// (or at least `max_scan_len + 1` readable bytes when a bound is set), and
    /// nobody may free or write it for the duration of the call.
    pub unsafe fn decode(&self, ptr: *const c_char) -> Result<Option<String>, MarshalError> {
        if ptr.is_null() {
            return Ok(None);
        }
        // SAFETY: forwarded from the caller.
        let len = unsafe { terminated_len(ptr.cast::<u8>(), self.config.max_scan_len)? };
        // SAFETY: the scan just proved `len` readable bytes precede the NUL.
        let bytes = unsafe { core::slice::from_raw_parts(ptr.cast::<u8>(), len) };
        self.decode_bytes(bytes).map(Some)
    }

    /// Safe `decode` for a handle this crate produced and still owns.
    pub fn read(&self, text: &ForeignText) -> Result<Option<String>, MarshalError> {
        // SAFETY: a live ForeignText points at a terminated buffer or is null.
        unsafe { self.decode(text.as_ptr()) }
    }

    /// Byte length of a foreign string, terminator excluded. Null gives `None`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Marshaller::decode`].
    pub unsafe fn byte_len(&self, ptr: *const c_char) -> Result<Option<usize>, MarshalError> {
        if ptr.is_null() {
            return Ok(None);
        }
        // SAFETY: forwarded from the caller.
        unsafe { terminated_len(ptr.cast::<u8>(), self.config.max_scan_len) }.map(Some)
    }

    /// Copy `text` into a fresh foreign buffer of `len + 1` bytes.
    ///
    /// `None` yields the null handle without allocating. Empty text still gets
    /// a one-byte buffer holding only the terminator.
    pub fn encode(&self, text: Option<&str>) -> Result<ForeignText, MarshalError> {
        let Some(text) = text else {
            return Ok(ForeignText::null());
        };
        let bytes = text.as_bytes();

        // A NUL in the content would be read back as a shorter string.
        if let Some(position) = bytes.iter().position(|&b| b == 0) {
            return Err(MarshalError::InteriorNul { position });
        }

        let size = bytes.len() + 1;
        let buf = self.alloc.allocate(size);
        if buf.is_null() {
            log::error!("encode: allocation of {size} bytes failed");
            return Err(MarshalError::AllocationFailed { size });
        }

        // SAFETY: `buf` is a fresh allocation of `size` bytes, disjoint from `bytes`.
        unsafe {
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, bytes.len());
            *buf.add(bytes.len()) = 0;
        }
        log::trace!("encode: {} bytes at {:p}", bytes.len(), buf);

        // SAFETY: freshly allocated and terminated above.
        Ok(unsafe { ForeignText::from_raw(buf.cast::<c_char>()) })
    }

    /// Free a buffer produced by `encode`. Releasing the null handle is a no-op.
    ///
    /// # Safety
    ///
    /// `text` must come from `encode` on a marshaller using this same
    /// allocator, and nothing may read the address afterwards.
    pub unsafe fn release(&self, text: ForeignText) {
        let ptr = text.into_raw();
        if ptr.is_null() {
            return;
        }
        log::trace!("release: {:p}", ptr);
        // SAFETY: forwarded from the caller.
        unsafe { self.alloc.deallocate(ptr.cast::<u8>()) }
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<String, MarshalError> {
        match self.config.utf8_policy {
            Utf8Policy::Strict => match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
                Some(text) => Ok(text.into_owned()),
                None => Err(MarshalError::InvalidUtf8 {
                    valid_up_to: Encoding::utf8_valid_up_to(bytes),
                    len: bytes.len(),
                }),
            },
            Utf8Policy::Lossy => {
                let (text, had_errors) = UTF_8.decode_without_bom_handling(bytes);
                if had_errors {
                    log::warn!("decode: replaced malformed UTF-8 in {} byte string", bytes.len());
                }
                Ok(text.into_owned())
            }
        }
    }
}

pub(crate) fn default_marshaller() -> &'static Marshaller {
    static MARSHALLER: OnceLock<Marshaller> = OnceLock::new();
    MARSHALLER.get_or_init(|| {
        init_logger();
        Marshaller::new()
    })
}

/// [`Marshaller::decode`] on the process-wide marshaller.
///
/// # Safety
///
/// See [`Marshaller::decode`].
pub unsafe fn decode(ptr: *const c_char) -> Result<Option<String>, MarshalError> {
    unsafe { default_marshaller().decode(ptr) }
}

/// [`Marshaller::encode`] on the process-wide marshaller (C heap).
pub fn encode(text: Option<&str>) -> Result<ForeignText, MarshalError> {
    default_marshaller().encode(text)
}

/// [`Marshaller::release`] on the process-wide marshaller.
///
/// # Safety
///
/// `text` must come from [`encode`] (or any C heap allocation) and must not be
/// used afterwards.
pub unsafe fn release(text: ForeignText) {
    unsafe { default_marshaller().release(text) }
}
