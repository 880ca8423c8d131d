use crate::expand_heap::HeapExpander;
use crate::grower::DefaultGrower;
use core::cell::UnsafeCell;

/// A heap expander made `Sync` by assuming all use is from the same thread.
/// Useful for the common single threaded wasm module, where expanders still have to live in statics,
/// which requires `Sync`.
pub struct AssumeSingleThreaded<T = DefaultGrower> {
    inner: UnsafeCell<HeapExpander<T>>,
}

impl AssumeSingleThreaded<DefaultGrower> {
    /// # Safety
    ///
    /// The caller must ensure that the returned value is only accessed by a single thread.
    pub const unsafe fn new() -> Self {
        AssumeSingleThreaded::with_expander(HeapExpander::new())
    }
}

impl<T> AssumeSingleThreaded<T> {
    /// # Safety
    ///
    /// The caller must ensure that the returned value is only accessed by a single thread.
    pub const unsafe fn with_expander(expander: HeapExpander<T>) -> Self {
        AssumeSingleThreaded {
            inner: UnsafeCell::new(expander),
        }
    }

    /// # Safety
    ///
    /// No other reference obtained from this wrapper may be live,
    /// so growth requests never interleave.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get_mut(&self) -> &mut HeapExpander<T> {
        &mut *self.inner.get()
    }
}

/// This is an invalid implementation of Sync.
/// AssumeSingleThreaded must not actually be used from multiple threads concurrently.
unsafe impl<T> Sync for AssumeSingleThreaded<T> {}
