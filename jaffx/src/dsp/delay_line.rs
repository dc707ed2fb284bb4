use core::mem::size_of;
use core::ptr::NonNull;
use core::slice;

use crate::error::AllocError;
use crate::shim::{Allocator, Shim};

/// Integer delay with its buffer allocated through the shim.
///
/// The allocator must return blocks aligned for `f32`, as any C allocator
/// does.
pub struct DelayLine<A: Allocator + 'static> {
    shim: &'static Shim<A>,
    buffer: NonNull<f32>,
    length: usize,
    cursor: usize,
}

impl<A: Allocator + 'static> DelayLine<A> {
    pub fn new(shim: &'static Shim<A>, length: usize) -> Result<Self, AllocError> {
        if length == 0 {
            return Err(AllocError);
        }
        let buffer = NonNull::new(shim.calloc(length, size_of::<f32>()).cast::<f32>())
            .ok_or(AllocError)?;
        Ok(Self {
            shim,
            buffer,
            length,
            cursor: 0,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Push `input` and return the sample written `length` calls ago.
    pub fn process(&mut self, input: f32) -> f32 {
        let cursor = self.cursor;
        let cell = &mut self.buffer_mut()[cursor];
        let output = *cell;
        *cell = input;
        self.cursor = (cursor + 1) % self.length;
        output
    }

    /// Change the delay length. Newly added cells start silent. On failure
    /// the line stays as it was.
    ///
    /// This reallocates, so it belongs to the control context.
    pub fn resize(&mut self, length: usize) -> Result<(), AllocError> {
        if length == 0 {
            return Err(AllocError);
        }
        let size = length.checked_mul(size_of::<f32>()).ok_or(AllocError)?;
        // SAFETY: The buffer was allocated through this shim and is live.
        let moved = unsafe { self.shim.realloc(self.buffer.as_ptr().cast(), size) };
        self.buffer = NonNull::new(moved.cast::<f32>()).ok_or(AllocError)?;

        let old_length = self.length;
        self.length = length;
        if length > old_length {
            self.buffer_mut()[old_length..].fill(0.0);
        }
        if self.cursor >= length {
            self.cursor = 0;
        }
        Ok(())
    }

    fn buffer_mut(&mut self) -> &mut [f32] {
        // SAFETY: The buffer holds `length` initialized samples and is owned
        // by this line.
        unsafe { slice::from_raw_parts_mut(self.buffer.as_ptr(), self.length) }
    }
}

impl<A: Allocator + 'static> Drop for DelayLine<A> {
    fn drop(&mut self) {
        // SAFETY: The buffer was allocated through this shim and is released
        // only here.
        unsafe { self.shim.free(self.buffer.as_ptr().cast()) };
    }
}
