use daisy::audio::{Interface, BLOCK_LENGTH, FS};

pub const SAMPLE_RATE: u32 = FS.to_Hz();
pub const BLOCK_SIZE: usize = BLOCK_LENGTH;

pub type Block = [(f32, f32); BLOCK_LENGTH];

pub struct AudioInterface {
    interface: Option<Interface>,
}

impl AudioInterface {
    pub fn new(interface: Interface) -> Self {
        Self {
            interface: Some(interface),
        }
    }

    /// Start the SAI and its DMA transfers.
    ///
    /// # Panics
    ///
    /// Panics when spawned twice or when the codec fails to start.
    pub fn spawn(&mut self) {
        let interface = self.interface.take().unwrap();
        self.interface = Some(
            interface
                .spawn()
                .unwrap_or_else(|_| panic!("Failed to start the audio interface")),
        );
    }

    /// Hand the block pending in the DMA buffer to `callback`. The block
    /// holds input frames on entry and must hold output frames on return.
    pub fn update_buffer(&mut self, callback: impl FnMut(&mut Block)) {
        if let Some(interface) = self.interface.as_mut() {
            if interface.handle_interrupt_dma1_str1(callback).is_err() {
                defmt::error!("Failed to process the audio block");
            }
        }
    }
}
