//! Build-time audio configuration.
//!
//! Neither value can change once the audio engine runs. Programs override
//! them through [`crate::Program::SAMPLE_RATE`] and
//! [`crate::Program::BLOCK_SIZE`].

pub const SAMPLE_RATE: u32 = 48_000;
pub const BLOCK_SIZE: usize = 128;

/// Pause of the control context after each diagnostic report, so the
/// output channel does not get saturated.
pub const REPORT_INTERVAL_MS: u32 = 1000;

/// Time available to process one block, in seconds.
pub fn block_budget(sample_rate: f32, block_size: usize) -> f32 {
    block_size as f32 * sample_budget(sample_rate)
}

/// Time available to `process_audio` for a single sample, in seconds.
pub fn sample_budget(sample_rate: f32) -> f32 {
    1.0 / sample_rate
}
