//! Foreign allocator seam.
//!
//! Buffers handed across the boundary come from here and go back here. The
//! marshaller never mixes allocators: a buffer is released through the same
//! `ForeignAllocator` that produced it.

use core::ffi::c_void;

/// Allocate/free primitive pair owned by the foreign runtime.
pub trait ForeignAllocator: Send + Sync {
    /// Allocate `size` bytes with byte alignment. Returns null on failure.
    fn allocate(&self, size: usize) -> *mut u8;

    /// Return a buffer to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, must come from `allocate` on this allocator, and
    /// must not have been deallocated already.
    unsafe fn deallocate(&self, ptr: *mut u8);
}

/// C runtime heap (`malloc` / `free`).
#[derive(Debug, Default, Clone, Copy)]
pub struct CHeap;

impl ForeignAllocator for CHeap {
    fn allocate(&self, size: usize) -> *mut u8 {
        // SAFETY: malloc returns a valid pointer or null.
        unsafe { libc::malloc(size) }.cast::<u8>()
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        // SAFETY: caller guarantees ptr came from malloc above.
        unsafe { libc::free(ptr.cast::<c_void>()) }
    }
}
