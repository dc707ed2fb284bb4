use crate::config;
use crate::hardware::Console;

/// Hooks of a user program.
///
/// Every hook has a default, so a program overrides only what it needs. A
/// program without any override passes its input through.
///
/// # Execution contexts
///
/// [`Program::init`] and [`Program::control_loop`] run on the control
/// context and have no timing constraints. [`Program::process_audio`],
/// [`Program::block_start`] and [`Program::block_end`] run inside the audio
/// interrupt. Together they must finish a block within
/// `BLOCK_SIZE / SAMPLE_RATE` seconds. They must not block, allocate
/// without a bound or do I/O of unbounded latency. Nothing checks this;
/// missing the deadline is heard as a glitch.
///
/// The audio interrupt preempts `control_loop` at any point, so the control
/// context only gets a shared reference. State written by the audio hooks
/// and read from `control_loop` must live in atomics or cells, the way
/// [`crate::CpuLoadMeter`] keeps its counters. Plain fields may be cached
/// across a preemption.
pub trait Program: 'static {
    const SAMPLE_RATE: u32 = config::SAMPLE_RATE;
    const BLOCK_SIZE: usize = config::BLOCK_SIZE;

    /// Called once before streaming starts. Allocating through the shim is
    /// allowed from here on.
    fn init(&mut self, _console: &mut dyn Console) {}

    /// Called for every input sample, in order.
    fn process_audio(&mut self, input: f32) -> f32 {
        input
    }

    fn block_start(&mut self) {}

    fn block_end(&mut self) {}

    /// Called repeatedly on the control context while streaming.
    fn control_loop(&self, _console: &mut dyn Console) {}
}
