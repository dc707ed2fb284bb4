//! Processing load instrumentation.
//!
//! The meter is written from the audio context and read from the control
//! context. Values are kept in relaxed atomics without any further
//! synchronization, so a reader may see a stale or mixed set of min, avg
//! and max. That is fine for a diagnostic.

mod smoothing;

pub use self::smoothing::Smoothing;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use fugit::HertzU32;

use crate::config;
use crate::hardware::Console;

/// Cutoff of the filter smoothing the average load.
const SMOOTHING_CUTOFF: f32 = 1.0;

/// Free-running tick source used to time blocks.
pub trait Clock {
    /// Current tick count. It is allowed to wrap.
    fn ticks(&self) -> u32;

    fn frequency(&self) -> HertzU32;
}

/// Load meter collaborator. Loads are fractions of the block budget.
pub trait LoadMeter {
    fn init(&mut self, sample_rate: f32, block_size: usize);

    fn on_block_start(&self);

    fn on_block_end(&self);

    fn avg(&self) -> f32;

    fn max(&self) -> f32;

    fn min(&self) -> f32;
}

/// Meter for programs that never run in debug mode.
#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NullMeter;

impl LoadMeter for NullMeter {
    fn init(&mut self, _sample_rate: f32, _block_size: usize) {}

    fn on_block_start(&self) {}

    fn on_block_end(&self) {}

    fn avg(&self) -> f32 {
        0.0
    }

    fn max(&self) -> f32 {
        0.0
    }

    fn min(&self) -> f32 {
        0.0
    }
}

/// Measures what share of the block budget the audio callback consumes.
pub struct CpuLoadMeter<C> {
    clock: C,
    ticks_per_block_inv: f32,
    smoothing: Smoothing,
    block_start: AtomicU32,
    measured: AtomicBool,
    avg: Gauge,
    max: Gauge,
    min: Gauge,
}

impl<C: Clock> CpuLoadMeter<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            ticks_per_block_inv: 0.0,
            smoothing: Smoothing::default(),
            block_start: AtomicU32::new(0),
            measured: AtomicBool::new(false),
            avg: Gauge::zero(),
            max: Gauge::zero(),
            min: Gauge::zero(),
        }
    }

    /// Forget all measurements. Min, avg and max read zero until the next
    /// block ends.
    pub fn reset(&self) {
        self.measured.store(false, Ordering::Relaxed);
        self.avg.set(0.0);
        self.max.set(0.0);
        self.min.set(0.0);
    }
}

impl<C: Clock> LoadMeter for CpuLoadMeter<C> {
    fn init(&mut self, sample_rate: f32, block_size: usize) {
        let seconds_per_block = config::block_budget(sample_rate, block_size);
        let ticks_per_block = self.clock.frequency().raw() as f32 * seconds_per_block;
        self.ticks_per_block_inv = 1.0 / ticks_per_block;
        let update_rate = sample_rate / block_size as f32;
        self.smoothing = Smoothing::new(update_rate, SMOOTHING_CUTOFF);
        self.reset();
    }

    fn on_block_start(&self) {
        self.block_start.store(self.clock.ticks(), Ordering::Relaxed);
    }

    fn on_block_end(&self) {
        let end = self.clock.ticks();
        let elapsed = end.wrapping_sub(self.block_start.load(Ordering::Relaxed));
        let load = elapsed as f32 * self.ticks_per_block_inv;

        if self.measured.load(Ordering::Relaxed) {
            self.max.set(f32::max(self.max.get(), load));
            self.min.set(f32::min(self.min.get(), load));
            self.avg.set(self.smoothing.apply(self.avg.get(), load));
        } else {
            self.max.set(load);
            self.min.set(load);
            self.avg.set(load);
            self.measured.store(true, Ordering::Relaxed);
        }
    }

    fn avg(&self) -> f32 {
        self.avg.get()
    }

    fn max(&self) -> f32 {
        self.max.get()
    }

    fn min(&self) -> f32 {
        self.min.get()
    }
}

/// Print the current load as percentages.
pub fn report<M: LoadMeter + ?Sized>(console: &mut dyn Console, meter: &M) {
    let avg = meter.avg();
    let max = meter.max();
    let min = meter.min();
    console.print_line(format_args!("Processing Load:"));
    console.print_line(format_args!("Max: {:.3}%", max * 100.0));
    console.print_line(format_args!("Avg: {:.3}%", avg * 100.0));
    console.print_line(format_args!("Min: {:.3}%", min * 100.0));
}

struct Gauge(AtomicU32);

impl Gauge {
    const fn zero() -> Self {
        // 0x0 is the bit pattern of 0.0.
        Self(AtomicU32::new(0))
    }

    fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}
