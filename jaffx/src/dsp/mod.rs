//! DSP helpers for programs.
//!
//! Helpers that need memory take an injected `&'static Shim` and never touch
//! any other allocator. Build them in [`crate::Program::init`] or later, once
//! the shim is initialized.

mod delay_line;
mod sin_osc;

pub use self::delay_line::DelayLine;
pub use self::sin_osc::SinOsc;
