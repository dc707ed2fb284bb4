//! The active instance and the audio callback dispatching into it.
//!
//! The audio engine calls a plain function without any context argument,
//! so the instance receiving the callback has to be reachable from a static.
//! [`ACTIVE`] is that static. It is written exactly once, by
//! [`crate::Lifecycle`], before the engine gets started, and never again.

use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::sync::atomic::{self, AtomicBool, Ordering};

use crate::error::AlreadyRegistered;
use crate::load::LoadMeter;
use crate::program::Program;

/// Program together with its load meter and the debug toggle.
pub struct Instance<P, M> {
    pub(crate) program: P,
    pub(crate) meter: M,
    debug: bool,
}

impl<P: Program, M: LoadMeter> Instance<P, M> {
    pub fn new(program: P, meter: M) -> Self {
        Self {
            program,
            meter,
            debug: false,
        }
    }

    /// Enable the load meter and periodic load reports.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn meter(&self) -> &M {
        &self.meter
    }

    /// Run one block through the program, sample by sample.
    ///
    /// The mono result goes to `primary` and is duplicated into `secondary`.
    /// Only the common length of the three buffers is processed.
    #[inline]
    pub fn process_block(&mut self, input: &[f32], primary: &mut [f32], secondary: &mut [f32]) {
        if self.debug {
            self.meter.on_block_start();
        }
        self.program.block_start();

        for ((x, left), right) in input.iter().zip(primary.iter_mut()).zip(secondary.iter_mut()) {
            *left = self.program.process_audio(*x);
            *right = *left;
        }

        self.program.block_end();
        if self.debug {
            self.meter.on_block_end();
        }
    }
}

pub(crate) trait Dispatch {
    fn process_block(&mut self, input: &[f32], primary: &mut [f32], secondary: &mut [f32]);
}

impl<P: Program, M: LoadMeter> Dispatch for Instance<P, M> {
    #[inline]
    fn process_block(&mut self, input: &[f32], primary: &mut [f32], secondary: &mut [f32]) {
        Instance::process_block(self, input, primary, secondary);
    }
}

/// Write-once handle to the instance receiving the audio callback.
pub struct ActiveSlot {
    registered: AtomicBool,
    instance: UnsafeCell<Option<NonNull<dyn Dispatch>>>,
}

// SAFETY: The slot is written once, before the audio context can observe
// it, and only read afterwards.
unsafe impl Sync for ActiveSlot {}

impl ActiveSlot {
    pub const fn new() -> Self {
        Self {
            registered: AtomicBool::new(false),
            instance: UnsafeCell::new(None),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// # Safety
    ///
    /// `instance` must stay valid for the rest of the program, and the
    /// engine dispatching through this slot must not be running yet.
    pub(crate) unsafe fn register(
        &self,
        instance: NonNull<dyn Dispatch>,
    ) -> Result<(), AlreadyRegistered> {
        if self.registered.swap(true, Ordering::AcqRel) {
            return Err(AlreadyRegistered);
        }
        *self.instance.get() = Some(instance);
        atomic::compiler_fence(Ordering::Release);
        Ok(())
    }

    /// # Safety
    ///
    /// An instance must have been registered. This is not checked.
    #[inline]
    pub(crate) unsafe fn dispatch(
        &self,
        input: &[f32],
        primary: &mut [f32],
        secondary: &mut [f32],
    ) {
        let instance = (*self.instance.get()).unwrap_unchecked();
        (*instance.as_ptr()).process_block(input, primary, secondary);
    }
}

impl Default for ActiveSlot {
    fn default() -> Self {
        Self::new()
    }
}

pub static ACTIVE: ActiveSlot = ActiveSlot::new();

/// Mono to dual-mono audio callback.
///
/// Input channel 0 is processed; the result is written to output channels 0
/// and 1.
///
/// # Safety
///
/// [`ACTIVE`] must hold a registered instance. [`crate::Lifecycle`]
/// guarantees that by registering before it starts the audio engine.
pub unsafe fn audio_callback(input: &[&[f32]], output: &mut [&mut [f32]]) {
    let (primary, secondary) = output.split_at_mut(1);
    ACTIVE.dispatch(input[0], &mut *primary[0], &mut *secondary[0]);
}
