use crate::page::{PageCount, ERROR_PAGE_COUNT};
use core::cell::Cell;

/// Wrapper for core::arch::wasm32::memory_grow.
/// Adding this level of indirection allows for improved testing,
/// especially on non wasm platforms.
pub trait MemoryGrower {
    /// Grows linear memory by `delta` pages.
    ///
    /// Returns the page count before growing, which is the index of the first new page,
    /// or [`ERROR_PAGE_COUNT`] if the memory could not grow. Growth is all-or-nothing.
    fn memory_grow(&self, delta: PageCount) -> PageCount;
}

/// Grows memory 0 of the running WebAssembly instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultGrower;

impl MemoryGrower for DefaultGrower {
    #[cfg(target_arch = "wasm32")]
    fn memory_grow(&self, delta: PageCount) -> PageCount {
        PageCount(core::arch::wasm32::memory_grow::<0>(delta.0))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn memory_grow(&self, _delta: PageCount) -> PageCount {
        ERROR_PAGE_COUNT
    }
}

/// Current size of memory 0, in pages. Always zero off wasm.
pub fn memory_size() -> PageCount {
    #[cfg(target_arch = "wasm32")]
    {
        PageCount(core::arch::wasm32::memory_size::<0>())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        PageCount(0)
    }
}

/// A linear memory stand-in that only does the page bookkeeping.
/// Nothing is backed by real storage, so returned addresses must not be dereferenced.
#[derive(Debug)]
pub struct SimulatedMemory {
    pages: Cell<usize>,
    maximum: usize,
    grow_calls: Cell<usize>,
}

impl SimulatedMemory {
    /// A memory currently `initial` pages long that refuses to grow past `maximum` pages.
    pub const fn new(initial: PageCount, maximum: PageCount) -> Self {
        SimulatedMemory {
            pages: Cell::new(initial.0),
            maximum: maximum.0,
            grow_calls: Cell::new(0),
        }
    }

    pub fn size(&self) -> PageCount {
        PageCount(self.pages.get())
    }

    /// Number of grow requests seen, successful or not.
    pub fn grow_calls(&self) -> usize {
        self.grow_calls.get()
    }
}

impl MemoryGrower for SimulatedMemory {
    fn memory_grow(&self, delta: PageCount) -> PageCount {
        self.grow_calls.set(self.grow_calls.get() + 1);
        let previous = self.pages.get();
        match previous.checked_add(delta.0) {
            Some(new) if new <= self.maximum => {
                self.pages.set(new);
                PageCount(previous)
            }
            _ => ERROR_PAGE_COUNT,
        }
    }
}
