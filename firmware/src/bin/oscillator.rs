#![no_main]
#![no_std]

use jaffx_firmware as _; // Global logger and panicking behavior.

use jaffx::dsp::SinOsc;
use jaffx::{Instance, Lifecycle, NullMeter, Program};
use jaffx_firmware::audio::{BLOCK_SIZE, SAMPLE_RATE};
use jaffx_firmware::heap::HEAP;
use jaffx_firmware::seed::Seed;

struct Oscillator {
    osc: SinOsc,
}

impl Program for Oscillator {
    const SAMPLE_RATE: u32 = SAMPLE_RATE;
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn process_audio(&mut self, _input: f32) -> f32 {
        self.osc.process_sample()
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::info!("Starting the oscillator");

    let instance = cortex_m::singleton!(: Instance<Oscillator, NullMeter> = Instance::new(
        Oscillator {
            osc: SinOsc::new(SAMPLE_RATE as f32, 440.0),
        },
        NullMeter,
    ))
    .unwrap();

    Lifecycle::new(instance, Seed::new(), &HEAP).start()
}
