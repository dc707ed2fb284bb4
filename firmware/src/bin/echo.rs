#![no_main]
#![no_std]

use jaffx_firmware as _; // Global logger and panicking behavior.

use embedded_alloc::Heap;
use jaffx::dsp::DelayLine;
use jaffx::shim::Malloc;
use jaffx::{Console, CpuLoadMeter, Instance, Lifecycle, Program};
use jaffx_firmware::audio::{BLOCK_SIZE, SAMPLE_RATE};
use jaffx_firmware::heap::HEAP;
use jaffx_firmware::seed::{DwtClock, Seed};

const DELAY_SAMPLES: usize = SAMPLE_RATE as usize / 4;
const WET: f32 = 0.5;

/// Single echo a quarter of a second late. The delay buffer is allocated
/// through the shim, so it can only be built in `init`.
struct Echo {
    delay: Option<DelayLine<Malloc<Heap>>>,
}

impl Program for Echo {
    const SAMPLE_RATE: u32 = SAMPLE_RATE;
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn init(&mut self, _console: &mut dyn Console) {
        match DelayLine::new(&HEAP, DELAY_SAMPLES) {
            Ok(delay) => self.delay = Some(delay),
            Err(err) => defmt::error!("Failed to allocate the delay line: {}", err),
        }
    }

    fn process_audio(&mut self, input: f32) -> f32 {
        match self.delay.as_mut() {
            Some(delay) => input + delay.process(input) * WET,
            None => input,
        }
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::info!("Starting the echo");

    let instance = cortex_m::singleton!(: Instance<Echo, CpuLoadMeter<DwtClock>> = Instance::new(
        Echo { delay: None },
        CpuLoadMeter::new(DwtClock),
    )
    .with_debug(true))
    .unwrap();

    Lifecycle::new(instance, Seed::new(), &HEAP).start()
}
