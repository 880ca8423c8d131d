use crate::errno::{set_errno, Errno};
use crate::grower::{DefaultGrower, MemoryGrower};
use crate::page::{pages_for, round_up_to_page, ERROR_PAGE_COUNT, PAGE_SIZE};
use core::ptr::null_mut;

/// A freshly granted, page aligned span of linear memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Region {
    /// Byte address of the first byte of the region.
    pub base: usize,
    /// Length in bytes, a multiple of [`PAGE_SIZE`].
    pub size: usize,
}

impl Region {
    /// One past the last byte, or `None` when the region runs to the top of the address space.
    pub fn end(&self) -> Option<usize> {
        self.base.checked_add(self.size)
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.base as *mut u8
    }
}

/// Grows the heap in place using the WebAssembly grow operation.
///
/// Holds no state besides the device. Memory only ever grows, so every region handed out
/// stays valid for the life of the process and regions never overlap.
///
/// Taking `&mut self` is how the locking precondition shows up in the types:
/// whoever calls this must already have exclusive access, via [`LockedHeap`](crate::LockedHeap),
/// [`AssumeSingleThreaded`](crate::AssumeSingleThreaded) or ownership.
/// Nothing here locks.
#[derive(Debug, Default)]
pub struct HeapExpander<T = DefaultGrower> {
    grower: T,
}

impl HeapExpander<DefaultGrower> {
    pub const fn new() -> Self {
        HeapExpander {
            grower: DefaultGrower,
        }
    }
}

impl<T: MemoryGrower> HeapExpander<T> {
    pub const fn with_grower(grower: T) -> Self {
        HeapExpander { grower }
    }

    pub fn grower(&self) -> &T {
        &self.grower
    }

    /// Grows memory by at least `requested` bytes, rounded up to whole pages.
    ///
    /// Issues exactly one grow request. The only failure is [`Errno::ENOMEM`],
    /// which does not touch the last-error slot; [`expand`](Self::expand) does that.
    pub fn try_expand(&mut self, requested: usize) -> Result<Region, Errno> {
        let rounded = round_up_to_page(requested);
        if rounded < requested {
            // Within a page of the address space limit.
            tracing::warn!(requested, "heap growth request overflows the address space");
            return Err(Errno::ENOMEM);
        }

        let delta = pages_for(rounded);
        let previous_page_count = self.grower.memory_grow(delta);
        if previous_page_count == ERROR_PAGE_COUNT {
            tracing::warn!(requested, pages = delta.0, "linear memory refused to grow");
            return Err(Errno::ENOMEM);
        }

        // Only a zero page request can report the end of a full address space.
        let Some(base) = previous_page_count.checked_size_in_bytes() else {
            tracing::warn!(requested, "linear memory already spans the address space");
            return Err(Errno::ENOMEM);
        };
        let region = Region {
            base,
            size: rounded,
        };
        debug_assert!(region.base % PAGE_SIZE == 0);
        tracing::trace!(
            base = region.base,
            size = region.size,
            pages = delta.0,
            "expanded heap"
        );
        Ok(region)
    }

    /// The libc-shaped form of [`try_expand`](Self::try_expand).
    ///
    /// On success stores the granted size (the rounded request) into `size` and returns the base
    /// of the new region. On failure sets the last-error slot to `ENOMEM`, returns null
    /// and leaves `size` as it was.
    pub fn expand(&mut self, size: &mut usize) -> *mut u8 {
        match self.try_expand(*size) {
            Ok(region) => {
                *size = region.size;
                region.as_mut_ptr()
            }
            Err(err) => {
                set_errno(err);
                null_mut()
            }
        }
    }
}

/// Expand the heap of the running instance by at least `*pn` bytes.
///
/// # Safety
///
/// `pn` must be valid for reads and writes.
/// The caller must hold the lock that serializes heap growth.
#[cfg(all(target_arch = "wasm32", feature = "c-abi"))]
#[no_mangle]
pub unsafe extern "C" fn __expand_heap(pn: *mut usize) -> *mut u8 {
    HeapExpander::new().expand(&mut *pn)
}
