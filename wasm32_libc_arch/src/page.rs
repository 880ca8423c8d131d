/// The WebAssembly page size, in bytes.
pub const PAGE_SIZE: usize = 65536;

/// Invalid number of pages used by the grow operation to indicate out of memory errors.
pub const ERROR_PAGE_COUNT: PageCount = PageCount(usize::MAX);

/// A number of WebAssembly memory pages.
///
/// Also used for page indexes: growing memory reports the previous page count,
/// which is the index of the first newly added page.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct PageCount(pub usize);

impl PageCount {
    pub const fn size_in_bytes(self) -> usize {
        self.0 * PAGE_SIZE
    }

    /// [`size_in_bytes`](Self::size_in_bytes), or `None` past the end of the address space.
    pub const fn checked_size_in_bytes(self) -> Option<usize> {
        self.0.checked_mul(PAGE_SIZE)
    }
}

/// Rounds `n` up to a multiple of [`PAGE_SIZE`].
///
/// Adds the smallest pad that makes `n` page aligned, so `0` and already aligned
/// sizes come back unchanged. Wraps to a smaller value when `n` is within a page of `usize::MAX`.
pub const fn round_up_to_page(n: usize) -> usize {
    n.wrapping_add(n.wrapping_neg() & (PAGE_SIZE - 1))
}

/// The exact number of pages in `rounded`, which must already be page aligned.
pub const fn pages_for(rounded: usize) -> PageCount {
    debug_assert!(rounded % PAGE_SIZE == 0);
    PageCount(rounded / PAGE_SIZE)
}
