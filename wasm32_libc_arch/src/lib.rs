//! The wasm32 architecture layer of a C standard library.
//!
//! Provides the pieces portable libc code expects every architecture to supply:
//! growing the heap from WebAssembly linear memory ([`HeapExpander`]),
//! the syscall number table and argument packing ([`syscall`]),
//! and the atomic primitives ([`atomic`]), which on this target cannot do a real compare-and-swap.
#![cfg_attr(not(test), no_std)]

pub mod atomic;
pub mod errno;
mod expand_heap;
mod grower;
mod locked_heap;
mod page;
mod single_threaded_heap;
pub mod syscall;

pub use crate::errno::{errno, set_errno, Errno};
pub use crate::expand_heap::{HeapExpander, Region};
pub use crate::grower::{memory_size, DefaultGrower, MemoryGrower, SimulatedMemory};
pub use crate::locked_heap::LockedHeap;
pub use crate::page::{pages_for, round_up_to_page, PageCount, ERROR_PAGE_COUNT, PAGE_SIZE};
pub use crate::single_threaded_heap::AssumeSingleThreaded;

#[cfg(all(target_arch = "wasm32", feature = "c-abi"))]
pub use crate::expand_heap::__expand_heap;
