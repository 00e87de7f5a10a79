use core::ffi::c_char;

/// Opaque handle to a NUL-terminated buffer owned by the foreign side.
///
/// Design rule: never alias the backing storage with a Rust reference. The only
/// way in is `Marshaller::encode` (or `from_raw`), the only way out is
/// `Marshaller::release` (or `into_raw`).
#[repr(transparent)]
#[must_use = "a non-null ForeignText leaks unless released"]
#[derive(Debug, PartialEq, Eq)]
pub struct ForeignText(*mut c_char);

impl ForeignText {
    /// The "no value" handle.
    pub const fn null() -> Self {
        Self(core::ptr::null_mut())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.0
    }

    /// Machine-word address; 0 means absent.
    pub fn addr(&self) -> usize {
        self.0 as usize
    }

    /// Hand the buffer to foreign code. The caller now owns the release.
    pub fn into_raw(self) -> *mut c_char {
        self.0
    }

    /// # Safety
    ///
    /// `ptr` must be null or an address returned by `into_raw` on a handle that
    /// has not been released since.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        Self(ptr)
    }

    /// # Safety
    ///
    /// Same contract as [`ForeignText::from_raw`].
    pub unsafe fn from_addr(addr: usize) -> Self {
        Self(addr as *mut c_char)
    }
}

/// Write a Rust string into a C buffer (NUL-terminated).
/// Returns the number of bytes written (excluding the final NUL).
///
/// # Safety
///
/// `out` must be null or writable for `cap` bytes.
pub(crate) unsafe fn write_c_string(out: *mut c_char, cap: usize, s: &str) -> usize {
    if out.is_null() || cap == 0 {
        return 0;
    }

    let bytes = s.as_bytes();
    let n = bytes.len().min(cap - 1);

    // Safety: caller provided writable memory for `cap` bytes.
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), out.cast::<u8>(), n);
        *out.add(n) = 0;
    }

    n
}
