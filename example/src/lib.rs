// Linking the crate is enough to export `__expand_heap` on wasm32.
#[cfg(target_arch = "wasm32")]
pub use wasm32_libc_arch::__expand_heap;

use wasm32_libc_arch::AssumeSingleThreaded;

// Single threaded module: no lock needed around growth.
static HEAP: AssumeSingleThreaded = unsafe { AssumeSingleThreaded::new() };

/// Grow the heap by at least `bytes`, returning the base of the new region or null.
#[no_mangle]
pub extern "C" fn grow(bytes: usize) -> *mut u8 {
    let mut size = bytes;
    unsafe { HEAP.get_mut() }.expand(&mut size)
}

/// Where the last error code lives.
#[cfg(target_arch = "wasm32")]
#[no_mangle]
pub extern "C" fn __errno_location() -> *mut i32 {
    wasm32_libc_arch::errno::errno_location()
}
