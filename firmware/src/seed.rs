//! Daisy Seed implementation of the framework's hardware collaborator.

use core::cell::RefCell;
use core::fmt::Arguments;

use cortex_m::interrupt::Mutex;
use daisy::pac::DWT;
use fugit::HertzU32;
use jaffx::{AudioCallback, Clock, Console, Hardware};
use stm32h7xx_hal::pac::interrupt;

use crate::audio::{AudioInterface, Block, BLOCK_SIZE, SAMPLE_RATE};
use crate::system::hal;
use crate::system::System;

/// Core clock the BSP configures.
pub const CORE_FREQUENCY: HertzU32 = HertzU32::MHz(480);

static STREAM: Mutex<RefCell<Option<Stream>>> = Mutex::new(RefCell::new(None));

struct Stream {
    audio_interface: AudioInterface,
    callback: AudioCallback,
}

impl Stream {
    fn process(&mut self) {
        let callback = self.callback;
        self.audio_interface.update_buffer(|block| run_callback(callback, block));
    }
}

fn run_callback(callback: AudioCallback, block: &mut Block) {
    let mut input = [0.0; BLOCK_SIZE];
    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];

    for (x, (l, _r)) in input.iter_mut().zip(block.iter()) {
        *x = *l;
    }

    let inputs: [&[f32]; 1] = [&input];
    let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
    // SAFETY: The callback was handed over by `start_audio`.
    unsafe { callback(&inputs, &mut outputs) };

    for ((frame, l), r) in block.iter_mut().zip(left).zip(right) {
        *frame = (l, r);
    }
}

pub struct Seed {
    audio_interface: Option<AudioInterface>,
    frequency: HertzU32,
}

impl Seed {
    pub const fn new() -> Self {
        Self {
            audio_interface: None,
            frequency: CORE_FREQUENCY,
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Seed {
    fn start_log(&mut self, wait_for_host: bool) {
        // RTT needs no setup, the probe attaches on its own.
        defmt::info!("Logging started, wait_for_host={}", wait_for_host);
    }

    fn print_line(&mut self, line: Arguments<'_>) {
        defmt::println!("{}", defmt::Display2Format(&line));
    }

    fn delay_ms(&mut self, ms: u32) {
        cortex_m::asm::delay(self.frequency.raw() / 1000 * ms);
    }

    fn sample_rate(&self) -> f32 {
        SAMPLE_RATE as f32
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

impl Hardware for Seed {
    /// # Panics
    ///
    /// Panics when the peripherals were already taken.
    fn init(&mut self) {
        defmt::info!("Initializing the hardware");
        let cp = hal::pac::CorePeripherals::take().unwrap();
        let dp = hal::pac::Peripherals::take().unwrap();
        let system = System::init(cp, dp);
        self.frequency = system.frequency;
        self.audio_interface = Some(system.audio_interface);
    }

    fn configure(&mut self, block_size: usize, sample_rate: u32) {
        // The BSP fixes both at build time, requests can only be verified.
        if block_size != BLOCK_SIZE {
            defmt::warn!(
                "Requested block size={} differs from the fixed {}",
                block_size,
                BLOCK_SIZE
            );
        }
        if sample_rate != SAMPLE_RATE {
            defmt::warn!(
                "Requested sample rate={} differs from the fixed {}",
                sample_rate,
                SAMPLE_RATE
            );
        }
    }

    /// # Panics
    ///
    /// Panics when called before `init` or more than once.
    fn start_audio(&mut self, callback: AudioCallback) {
        defmt::info!("Starting the audio engine");
        let mut audio_interface = self.audio_interface.take().unwrap();
        audio_interface.spawn();
        cortex_m::interrupt::free(|cs| {
            STREAM.borrow(cs).replace(Some(Stream {
                audio_interface,
                callback,
            }));
        });
    }
}

#[interrupt]
fn DMA1_STR1() {
    cortex_m::interrupt::free(|cs| {
        if let Some(stream) = STREAM.borrow(cs).borrow_mut().as_mut() {
            stream.process();
        }
    });
}

/// DWT cycle counter as the load meter's clock.
pub struct DwtClock;

impl Clock for DwtClock {
    fn ticks(&self) -> u32 {
        DWT::cycle_count()
    }

    fn frequency(&self) -> HertzU32 {
        CORE_FREQUENCY
    }
}
