//! Minimal framework for writing audio programs on the Daisy Seed.
//!
//! A user implements [`Program`], wraps it in an [`Instance`] and hands it to
//! [`Lifecycle::start`], which brings up the hardware, initializes the custom
//! allocator, registers the instance for the audio interrupt and then loops on
//! the control context forever.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

pub mod config;
pub mod dsp;
pub mod error;
pub mod hardware;
pub mod instance;
pub mod lifecycle;
pub mod load;
pub mod program;
pub mod shim;

pub use hardware::{AudioCallback, Console, Hardware};
pub use instance::{audio_callback, ActiveSlot, Instance, ACTIVE};
pub use lifecycle::{Lifecycle, State, Streaming};
pub use load::{Clock, CpuLoadMeter, LoadMeter, NullMeter};
pub use program::Program;
pub use shim::{Allocator, Malloc, Shim};
