//! Driver collaborator the lifecycle runs against.
//!
//! The firmware implements these traits on top of the Daisy BSP; tests use
//! recording stand-ins.

use core::fmt::Arguments;

/// Block callback installed into the audio engine.
///
/// Buffers are laid out as `[channel][sample]`. The input carries at least
/// one channel, the output at least two, all of the same length.
///
/// # Safety
///
/// The driver may only invoke the callback it received through
/// [`Hardware::start_audio`], and only from the audio context.
pub type AudioCallback = unsafe fn(input: &[&[f32]], output: &mut [&mut [f32]]);

/// Control-context services available to programs.
pub trait Console {
    fn start_log(&mut self, wait_for_host: bool);

    fn print_line(&mut self, line: Arguments<'_>);

    fn delay_ms(&mut self, ms: u32);

    /// Sample rate the audio engine actually runs at.
    fn sample_rate(&self) -> f32;

    /// Block size the audio engine actually delivers.
    fn block_size(&self) -> usize;
}

pub trait Hardware: Console {
    fn init(&mut self);

    fn configure(&mut self, block_size: usize, sample_rate: u32);

    /// Start streaming. From now on `callback` gets called on every block,
    /// preempting the control context.
    fn start_audio(&mut self, callback: AudioCallback);
}
