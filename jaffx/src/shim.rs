//! Allocator shim handed to the DSP helpers.
//!
//! The shim is not a `#[global_allocator]`. Only code that receives a
//! `&'static Shim` allocates through it; everything else keeps using
//! whatever the platform provides.
//!
//! The shim lives in a static and is constructed at compile time, but the
//! allocator behind it becomes usable only after [`Shim::init`]. The
//! lifecycle calls it right after hardware bring-up, since the hardware
//! setup may claim memory the arena relies on. Allocating earlier is not
//! detected and its outcome depends on the allocator.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

/// Allocator collaborator with C allocation semantics.
///
/// A null pointer means failure. Whether exhaustion returns null or aborts
/// is up to the implementation.
pub trait Allocator {
    /// Prepare the arena. Called exactly once, after hardware bring-up.
    ///
    /// # Safety
    ///
    /// Must not be called more than once.
    unsafe fn init(&self);

    fn allocate(&self, size: usize) -> *mut u8;

    /// Allocate `count * size` bytes, all set to zero.
    fn allocate_zeroed(&self, count: usize, size: usize) -> *mut u8;

    /// Resize a block, possibly moving it. Contents are kept up to the
    /// smaller of both sizes. A null `ptr` behaves like `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from this allocator and not be released.
    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8;

    /// # Safety
    ///
    /// `ptr` must come from this allocator and not be released yet.
    unsafe fn release(&self, ptr: *mut u8);
}

pub struct Shim<A> {
    allocator: A,
}

impl<A> Shim<A> {
    pub const fn new(allocator: A) -> Self {
        Self { allocator }
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: Allocator> Shim<A> {
    /// # Safety
    ///
    /// Must be called exactly once, after hardware initialization and
    /// before anything allocates through the shim.
    pub unsafe fn init(&self) {
        self.allocator.init();
    }

    pub fn malloc(&self, size: usize) -> *mut u8 {
        self.allocator.allocate(size)
    }

    pub fn calloc(&self, count: usize, size: usize) -> *mut u8 {
        self.allocator.allocate_zeroed(count, size)
    }

    /// # Safety
    ///
    /// `ptr` must be null or a live block returned by this shim.
    pub unsafe fn realloc(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        self.allocator.reallocate(ptr, size)
    }

    /// Release a block. Null is ignored.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live block returned by this shim.
    pub unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        self.allocator.release(ptr);
    }
}

const ALIGN: usize = 8;
// The header keeps the requested size and keeps the payload aligned.
const HEADER: usize = ALIGN;

/// Gives a [`GlobalAlloc`] heap C allocation semantics.
///
/// Every block starts with a header holding its size, so blocks can be
/// resized and released without the caller knowing their size. Payloads
/// are aligned to 8 bytes.
pub struct Malloc<G> {
    heap: G,
    setup: unsafe fn(&G),
}

impl<G> Malloc<G> {
    /// `setup` hands the arena to `heap`; it runs in [`Allocator::init`].
    pub const fn new(heap: G, setup: unsafe fn(&G)) -> Self {
        Self { heap, setup }
    }
}

impl<G: GlobalAlloc> Malloc<G> {
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size.checked_add(HEADER)?, ALIGN).ok()
    }

    unsafe fn payload(block: *mut u8, size: usize) -> *mut u8 {
        if block.is_null() {
            return block;
        }
        block.cast::<usize>().write(size);
        block.add(HEADER)
    }

    unsafe fn block(payload: *mut u8) -> (*mut u8, Layout) {
        let block = payload.sub(HEADER);
        let size = block.cast::<usize>().read();
        (block, Layout::from_size_align_unchecked(size + HEADER, ALIGN))
    }
}

impl<G: GlobalAlloc> Allocator for Malloc<G> {
    unsafe fn init(&self) {
        (self.setup)(&self.heap);
    }

    fn allocate(&self, size: usize) -> *mut u8 {
        let Some(layout) = Self::layout(size) else {
            return ptr::null_mut();
        };
        // SAFETY: The layout is never zero-sized thanks to the header.
        unsafe { Self::payload(self.heap.alloc(layout), size) }
    }

    fn allocate_zeroed(&self, count: usize, size: usize) -> *mut u8 {
        let Some(total) = count.checked_mul(size) else {
            return ptr::null_mut();
        };
        let Some(layout) = Self::layout(total) else {
            return ptr::null_mut();
        };
        // SAFETY: The layout is never zero-sized thanks to the header.
        unsafe { Self::payload(self.heap.alloc_zeroed(layout), total) }
    }

    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.allocate(size);
        }
        let Some(new_layout) = Self::layout(size) else {
            return ptr::null_mut();
        };
        let (block, old_layout) = Self::block(ptr);
        Self::payload(self.heap.realloc(block, old_layout, new_layout.size()), size)
    }

    unsafe fn release(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let (block, layout) = Self::block(ptr);
        self.heap.dealloc(block, layout);
    }
}
