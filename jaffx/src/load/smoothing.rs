//! One-pole low-pass used to smooth the load average.
//!
//! Based on <https://www.earlevel.com/main/2012/12/15/a-one-pole-filter/>.
//! The filter state lives with the caller, so it can be kept in an atomic.

use core::f32::consts::PI;

use libm::expf;

#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Smoothing {
    a0: f32,
    b1: f32,
}

impl Smoothing {
    pub fn new(update_rate: f32, cutoff: f32) -> Self {
        let normalized_frequency = cutoff / update_rate;
        let b1 = expf(-2.0 * PI * normalized_frequency);
        let a0 = 1.0 - b1;
        Self { a0, b1 }
    }

    pub fn apply(&self, previous: f32, x: f32) -> f32 {
        x * self.a0 + previous * self.b1
    }
}
