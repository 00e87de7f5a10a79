use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use utf8_marshal::{CHeap, ForeignAllocator};

/// C heap wrapper that records every live buffer.
///
/// Panics on a double free or a free of an address it never handed out.
#[derive(Default)]
pub struct CountingHeap {
    live: Mutex<HashSet<usize>>,
    allocs: AtomicUsize,
    frees: AtomicUsize,
    bytes: AtomicUsize,
}

impl CountingHeap {
    pub fn allocs(&self) -> usize {
        self.allocs.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    pub fn bytes(&self) -> usize {
        self.bytes.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl ForeignAllocator for CountingHeap {
    fn allocate(&self, size: usize) -> *mut u8 {
        let ptr = CHeap.allocate(size);
        if !ptr.is_null() {
            self.allocs.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(size, Ordering::SeqCst);
            self.live.lock().unwrap().insert(ptr as usize);
        }
        ptr
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        assert!(
            self.live.lock().unwrap().remove(&(ptr as usize)),
            "free of unknown or already freed buffer {ptr:p}"
        );
        self.frees.fetch_add(1, Ordering::SeqCst);
        unsafe { CHeap.deallocate(ptr) }
    }
}

/// Refuses every request.
pub struct ExhaustedHeap;

impl ForeignAllocator for ExhaustedHeap {
    fn allocate(&self, _size: usize) -> *mut u8 {
        core::ptr::null_mut()
    }

    unsafe fn deallocate(&self, _ptr: *mut u8) {
        panic!("nothing was ever allocated");
    }
}
