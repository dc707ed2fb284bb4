//! Startup sequence of a program.
//!
//! The sequence is fixed:
//!
//! 1. initialize the hardware,
//! 2. configure block size and sample rate,
//! 3. initialize the allocator behind the shim,
//! 4. register the instance for the audio callback,
//! 5. run [`Program::init`],
//! 6. set up diagnostics if the instance is in debug mode,
//! 7. start the audio engine,
//!
//! and then the control context loops forever. Every step consumes the
//! lifecycle in the previous state, so skipping or reordering steps does
//! not compile. [`Lifecycle::start`] runs the whole sequence.
//!
//! Once streaming, the audio interrupt may preempt the control context in
//! the middle of [`Program::control_loop`]. Both contexts reach the program
//! through the same pointer and nothing serializes them. The control side
//! therefore only ever holds shared references into the instance, and state
//! crossing the two contexts lives behind interior mutability.

use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use crate::config::REPORT_INTERVAL_MS;
use crate::hardware::Hardware;
use crate::instance::{self, Instance, ACTIVE};
use crate::load::{self, LoadMeter};
use crate::program::Program;
use crate::shim::{Allocator, Shim};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Constructed,
    HardwareInitialized,
    AudioParamsConfigured,
    AllocatorInitialized,
    InstanceRegistered,
    UserInitialized,
    DiagnosticsInitialized,
    Streaming,
}

pub struct Constructed;
pub struct HardwareInitialized;
pub struct AudioParamsConfigured;
pub struct AllocatorInitialized;
pub struct InstanceRegistered;
pub struct UserInitialized;
pub struct DiagnosticsInitialized;

mod sealed {
    pub trait Sealed {}
}

pub trait Stage: sealed::Sealed {
    const STATE: State;
}

macro_rules! stage {
    ($($marker:ident),*) => {
        $(
            impl sealed::Sealed for $marker {}
            impl Stage for $marker {
                const STATE: State = State::$marker;
            }
        )*
    };
}

stage!(
    Constructed,
    HardwareInitialized,
    AudioParamsConfigured,
    AllocatorInitialized,
    InstanceRegistered,
    UserInitialized,
    DiagnosticsInitialized
);

pub struct Lifecycle<S, P: 'static, M: 'static, H, A: 'static> {
    instance: NonNull<Instance<P, M>>,
    hardware: H,
    heap: &'static Shim<A>,
    _stage: PhantomData<S>,
}

impl<S, P, M, H, A> Lifecycle<S, P, M, H, A>
where
    S: Stage,
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    pub fn state(&self) -> State {
        S::STATE
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn instance(&self) -> &Instance<P, M> {
        // SAFETY: The audio engine is not running in any of the stages, so
        // nothing mutates the instance concurrently.
        unsafe { self.instance.as_ref() }
    }

    fn advance<T: Stage>(self) -> Lifecycle<T, P, M, H, A> {
        log_debug!("Lifecycle state={}", T::STATE);
        Lifecycle {
            instance: self.instance,
            hardware: self.hardware,
            heap: self.heap,
            _stage: PhantomData,
        }
    }

    fn instance_mut(&mut self) -> &mut Instance<P, M> {
        // SAFETY: Same as in `instance`, and `self` is borrowed exclusively.
        unsafe { self.instance.as_mut() }
    }
}

impl<P, M, H, A> Lifecycle<Constructed, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    pub fn new(instance: &'static mut Instance<P, M>, hardware: H, heap: &'static Shim<A>) -> Self {
        Self {
            instance: NonNull::from(instance),
            hardware,
            heap,
            _stage: PhantomData,
        }
    }

    /// Run the whole startup sequence and return the streaming session.
    ///
    /// # Panics
    ///
    /// Panics if another instance is already registered.
    pub fn launch(self) -> Streaming<P, M, H> {
        self.init_hardware()
            .configure_audio()
            .init_allocator()
            .register()
            .init_program()
            .init_diagnostics()
            .start_streaming()
    }

    /// Run the startup sequence and then the control loop, forever.
    ///
    /// # Panics
    ///
    /// Panics if another instance is already registered.
    pub fn start(self) -> ! {
        self.launch().run()
    }

    pub fn init_hardware(mut self) -> Lifecycle<HardwareInitialized, P, M, H, A> {
        self.hardware.init();
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<HardwareInitialized, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    pub fn configure_audio(mut self) -> Lifecycle<AudioParamsConfigured, P, M, H, A> {
        self.hardware.configure(P::BLOCK_SIZE, P::SAMPLE_RATE);
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<AudioParamsConfigured, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    /// Make the shim usable. Must not happen before hardware bring-up, as
    /// the hardware may claim memory the arena relies on.
    pub fn init_allocator(self) -> Lifecycle<AllocatorInitialized, P, M, H, A> {
        // SAFETY: This state is reachable only once per lifecycle, after
        // the hardware initialization.
        unsafe { self.heap.init() };
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<AllocatorInitialized, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    /// # Panics
    ///
    /// Panics if another instance is already registered.
    pub fn register(self) -> Lifecycle<InstanceRegistered, P, M, H, A> {
        // SAFETY: The instance came from a `&'static mut`, so it outlives
        // every callback. The audio engine gets started only later.
        let result = unsafe { ACTIVE.register(self.instance) };
        if result.is_err() {
            panic!("Another instance is already registered");
        }
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<InstanceRegistered, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    pub fn init_program(mut self) -> Lifecycle<UserInitialized, P, M, H, A> {
        let instance = self.instance.as_ptr();
        // SAFETY: Nothing else touches the instance before streaming starts.
        unsafe { (*instance).program.init(&mut self.hardware) };
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<UserInitialized, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    /// Start logging and initialize the load meter, only in debug mode.
    pub fn init_diagnostics(mut self) -> Lifecycle<DiagnosticsInitialized, P, M, H, A> {
        if self.instance().debug() {
            self.hardware.start_log(false);
            let sample_rate = self.hardware.sample_rate();
            let block_size = self.hardware.block_size();
            self.instance_mut().meter.init(sample_rate, block_size);
        }
        self.advance()
    }
}

impl<P, M, H, A> Lifecycle<DiagnosticsInitialized, P, M, H, A>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
    A: Allocator + 'static,
{
    pub fn start_streaming(mut self) -> Streaming<P, M, H> {
        self.hardware.start_audio(instance::audio_callback);
        log_debug!("Lifecycle state={}", State::Streaming);
        Streaming {
            instance: self.instance,
            hardware: self.hardware,
        }
    }
}

/// Control context of a running program.
pub struct Streaming<P: 'static, M: 'static, H> {
    instance: NonNull<Instance<P, M>>,
    hardware: H,
}

impl<P, M, H> Streaming<P, M, H>
where
    P: Program,
    M: LoadMeter + 'static,
    H: Hardware,
{
    pub fn state(&self) -> State {
        State::Streaming
    }

    /// One iteration of the control loop: the program's own loop, followed
    /// by a throttled load report in debug mode.
    pub fn step(&mut self) {
        let instance = self.instance.as_ptr();
        // SAFETY: See the module documentation. The program and the meter
        // are only borrowed shared, fields the audio context writes are read
        // through interior mutability.
        unsafe {
            (*ptr::addr_of!((*instance).program)).control_loop(&mut self.hardware);
            if (*instance).debug() {
                load::report(&mut self.hardware, &*ptr::addr_of!((*instance).meter));
                self.hardware.delay_ms(REPORT_INTERVAL_MS);
            }
        }
    }

    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Read access to the running instance, e.g. to its load meter.
    ///
    /// The audio context keeps writing to the instance. Only use this in
    /// between audio callbacks, or for values that tolerate torn reads.
    pub fn instance(&self) -> &Instance<P, M> {
        // SAFETY: See the method documentation.
        unsafe { self.instance.as_ref() }
    }
}
