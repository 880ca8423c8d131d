//! The process-wide last-error slot (`errno`).
//!
//! The slot starts out as [`Errno::NONE`] and keeps whatever was last stored in it:
//! nothing in this crate clears it on success.

use core::fmt;
use core::sync::atomic::{AtomicI32, Ordering};

/// A libc error code, using the Linux numbering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Errno(pub i32);

impl Errno {
    /// No error recorded.
    pub const NONE: Errno = Errno(0);
    pub const ENOMEM: Errno = Errno(12);
    pub const EINVAL: Errno = Errno(22);
    pub const ENOSYS: Errno = Errno(38);

    /// The largest code a raw syscall return can encode as `-code`.
    pub const MAX: Errno = Errno(4095);

    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Errno::NONE => f.write_str("No error information"),
            Errno::ENOMEM => f.write_str("Out of memory"),
            Errno::EINVAL => f.write_str("Invalid argument"),
            Errno::ENOSYS => f.write_str("Function not implemented"),
            Errno(code) => write!(f, "Unknown error {}", code),
        }
    }
}

// Only plain loads and stores: this target has no compare-and-swap.
static LAST_ERROR: AtomicI32 = AtomicI32::new(Errno::NONE.0);

/// The most recently recorded error.
pub fn errno() -> Errno {
    Errno(LAST_ERROR.load(Ordering::Relaxed))
}

/// Records `err` as the most recent error.
pub fn set_errno(err: Errno) {
    LAST_ERROR.store(err.0, Ordering::Relaxed);
}

/// Address of the slot, for C code that reads and writes `errno` directly.
pub fn errno_location() -> *mut i32 {
    LAST_ERROR.as_ptr()
}

/// Serializes unit tests that observe the process-wide slot.
#[cfg(test)]
pub(crate) static TEST_LOCK: spin::Mutex<()> = spin::Mutex::new(());
