#![allow(dead_code)]

use std::alloc::System;
use std::cell::{Cell, RefCell};
use std::fmt::Arguments;
use std::rc::Rc;

use jaffx::shim::{Allocator, Malloc, Shim};
use jaffx::{AudioCallback, Console, Hardware, LoadMeter, ACTIVE};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    HardwareInit,
    Configure { block_size: usize, sample_rate: u32 },
    AllocatorInit { registered: bool },
    UserInit { registered: bool },
    StartLog,
    MeterInit { sample_rate: f32, block_size: usize },
    StartAudio { registered: bool },
    ControlLoop,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct StandInHardware {
    log: Log,
    callback: Option<AudioCallback>,
    pub lines: Vec<String>,
    pub delays: Vec<u32>,
    preempt: Option<Vec<f32>>,
    sample_rate: f32,
    block_size: usize,
}

impl StandInHardware {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            callback: None,
            lines: Vec::new(),
            delays: Vec::new(),
            preempt: None,
            sample_rate: 0.0,
            block_size: 0,
        }
    }

    /// Play the audio engine: push one block through the installed callback.
    pub fn run_block(&mut self, input: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let callback = self.callback.expect("audio engine is not running");
        let mut left = vec![0.0; input.len()];
        let mut right = vec![0.0; input.len()];
        let inputs: [&[f32]; 1] = [input];
        let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
        unsafe { callback(&inputs, &mut outputs) };
        (left, right)
    }

    /// Fire the audio callback with `block` from within every `print_line`,
    /// the way the audio interrupt preempts the control context.
    pub fn preempt_prints_with(&mut self, block: Vec<f32>) {
        self.preempt = Some(block);
    }
}

impl Console for StandInHardware {
    fn start_log(&mut self, _wait_for_host: bool) {
        self.log.borrow_mut().push(Event::StartLog);
    }

    fn print_line(&mut self, line: Arguments<'_>) {
        self.lines.push(line.to_string());
        if let Some(block) = self.preempt.clone() {
            self.run_block(&block);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Hardware for StandInHardware {
    fn init(&mut self) {
        self.log.borrow_mut().push(Event::HardwareInit);
    }

    fn configure(&mut self, block_size: usize, sample_rate: u32) {
        self.block_size = block_size;
        self.sample_rate = sample_rate as f32;
        self.log.borrow_mut().push(Event::Configure {
            block_size,
            sample_rate,
        });
    }

    fn start_audio(&mut self, callback: AudioCallback) {
        self.log.borrow_mut().push(Event::StartAudio {
            registered: ACTIVE.is_registered(),
        });
        self.callback = Some(callback);
    }
}

fn no_setup(_heap: &System) {}

/// System allocator that reports its initialization.
pub struct StandInAllocator {
    log: Log,
    inner: Malloc<System>,
}

impl Allocator for StandInAllocator {
    unsafe fn init(&self) {
        self.log.borrow_mut().push(Event::AllocatorInit {
            registered: ACTIVE.is_registered(),
        });
        self.inner.init();
    }

    fn allocate(&self, size: usize) -> *mut u8 {
        self.inner.allocate(size)
    }

    fn allocate_zeroed(&self, count: usize, size: usize) -> *mut u8 {
        self.inner.allocate_zeroed(count, size)
    }

    unsafe fn reallocate(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        self.inner.reallocate(ptr, size)
    }

    unsafe fn release(&self, ptr: *mut u8) {
        self.inner.release(ptr)
    }
}

pub fn heap(log: Log) -> &'static Shim<StandInAllocator> {
    Box::leak(Box::new(Shim::new(StandInAllocator {
        log,
        inner: Malloc::new(System, no_setup),
    })))
}

/// Meter counting its calls and reporting fixed loads.
pub struct CountingMeter {
    log: Log,
    pub inits: Cell<usize>,
    pub starts: Cell<usize>,
    pub ends: Cell<usize>,
    pub reads: Cell<usize>,
}

impl CountingMeter {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            inits: Cell::new(0),
            starts: Cell::new(0),
            ends: Cell::new(0),
            reads: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.inits.get() + self.starts.get() + self.ends.get() + self.reads.get()
    }
}

impl LoadMeter for CountingMeter {
    fn init(&mut self, sample_rate: f32, block_size: usize) {
        self.inits.set(self.inits.get() + 1);
        self.log.borrow_mut().push(Event::MeterInit {
            sample_rate,
            block_size,
        });
    }

    fn on_block_start(&self) {
        self.starts.set(self.starts.get() + 1);
    }

    fn on_block_end(&self) {
        self.ends.set(self.ends.get() + 1);
    }

    fn avg(&self) -> f32 {
        self.reads.set(self.reads.get() + 1);
        0.25
    }

    fn max(&self) -> f32 {
        self.reads.set(self.reads.get() + 1);
        0.5
    }

    fn min(&self) -> f32 {
        self.reads.set(self.reads.get() + 1);
        0.125
    }
}
