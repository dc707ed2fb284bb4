pub use stm32h7xx_hal as hal;

use fugit::HertzU32;
use hal::pac::CorePeripherals;
use hal::pac::Peripherals as DevicePeripherals;

use crate::audio::AudioInterface;

pub struct System {
    pub frequency: HertzU32,
    pub audio_interface: AudioInterface,
}

impl System {
    /// Initialize system abstraction.
    ///
    /// # Panics
    ///
    /// The system can be initialized only once. It panics otherwise.
    pub fn init(mut cp: CorePeripherals, dp: DevicePeripherals) -> Self {
        enable_cache(&mut cp);
        enable_cycle_counter(&mut cp);

        let board = daisy::Board::take().unwrap();
        let ccdr = daisy::board_freeze_clocks!(board, dp);
        let pins = daisy::board_split_gpios!(board, ccdr, dp);

        let frequency = ccdr.clocks.sys_ck();
        let audio_interface = AudioInterface::new(daisy::board_split_audio!(ccdr, pins));

        Self {
            frequency,
            audio_interface,
        }
    }
}

/// AN5212: Improve application performance when fetching instruction and
/// data, from both internal andexternal memories.
fn enable_cache(cp: &mut CorePeripherals) {
    cp.SCB.enable_icache();
    // NOTE: This requires cache management around all use of DMA.
    cp.SCB.enable_dcache(&mut cp.CPUID);
}

/// The load meter times blocks with the DWT cycle counter.
fn enable_cycle_counter(cp: &mut CorePeripherals) {
    cp.DCB.enable_trace();
    cp.DWT.enable_cycle_counter();
}
