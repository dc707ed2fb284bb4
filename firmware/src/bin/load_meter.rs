#![no_main]
#![no_std]

use jaffx_firmware as _; // Global logger and panicking behavior.

use jaffx::config::REPORT_INTERVAL_MS;
use jaffx::load;
use jaffx::{Console, CpuLoadMeter, Instance, Lifecycle, LoadMeter, NullMeter, Program};
use jaffx_firmware::audio::{BLOCK_SIZE, SAMPLE_RATE};
use jaffx_firmware::heap::HEAP;
use jaffx_firmware::seed::{DwtClock, Seed};

/// Outputs silence and reports the load of doing so, using its own meter
/// instead of the framework's debug mode.
struct LoadMeterProgram {
    meter: CpuLoadMeter<DwtClock>,
}

impl Program for LoadMeterProgram {
    const SAMPLE_RATE: u32 = SAMPLE_RATE;
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn init(&mut self, console: &mut dyn Console) {
        console.start_log(true);
        self.meter.init(console.sample_rate(), console.block_size());
    }

    fn process_audio(&mut self, _input: f32) -> f32 {
        0.0
    }

    fn block_start(&mut self) {
        self.meter.on_block_start();
    }

    fn block_end(&mut self) {
        self.meter.on_block_end();
    }

    fn control_loop(&self, console: &mut dyn Console) {
        load::report(console, &self.meter);
        console.delay_ms(REPORT_INTERVAL_MS);
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::info!("Starting the load meter");

    let instance = cortex_m::singleton!(: Instance<LoadMeterProgram, NullMeter> = Instance::new(
        LoadMeterProgram {
            meter: CpuLoadMeter::new(DwtClock),
        },
        NullMeter,
    ))
    .unwrap();

    Lifecycle::new(instance, Seed::new(), &HEAP).start()
}
