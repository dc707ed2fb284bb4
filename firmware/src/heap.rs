//! Arena behind the allocator shim.
//!
//! The heap is deliberately not the global allocator. It only serves code
//! that gets `&HEAP` injected, and it becomes usable once the lifecycle
//! initialized it after hardware bring-up.

use core::mem::{size_of, MaybeUninit};
use core::ptr::addr_of_mut;

use embedded_alloc::Heap;
use jaffx::shim::{Malloc, Shim};

const ARENA_WORDS: usize = 96 * 1024;

#[link_section = ".sram"]
static mut MEMORY: [MaybeUninit<u32>; ARENA_WORDS] = [MaybeUninit::uninit(); ARENA_WORDS];

pub static HEAP: Shim<Malloc<Heap>> = Shim::new(Malloc::new(Heap::empty(), init_arena));

unsafe fn init_arena(heap: &Heap) {
    defmt::info!("Initializing the heap arena");
    let start = addr_of_mut!(MEMORY) as usize;
    heap.init(start, ARENA_WORDS * size_of::<u32>());
}
