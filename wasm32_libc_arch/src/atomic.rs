//! Atomic primitives for wasm32.
//!
//! The target has no shared-memory threads, so there is no compare-and-swap to lower to.
//! [`CAS_CAPABILITY`] says so up front; [`cas`] itself terminates the process.
//! Anything that needs lock-free updates has to take a lock instead.

use crate::syscall::{syscall, HostDispatch, Long, SyscallDispatch, NR_MEMBARRIER};

/// Whether atomic read-modify-write updates can be performed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AtomicCapability {
    Unavailable,
    /// Never reported on wasm32; kept so callers can match on the capability of other targets.
    Native,
}

impl AtomicCapability {
    pub const fn is_available(self) -> bool {
        matches!(self, AtomicCapability::Native)
    }
}

pub const CAS_CAPABILITY: AtomicCapability = AtomicCapability::Unavailable;

/// Full memory barrier, issued as the `membarrier` syscall.
pub fn barrier() -> Long {
    barrier_via(&HostDispatch)
}

pub fn barrier_via<D: SyscallDispatch + ?Sized>(dispatch: &D) -> Long {
    syscall(dispatch, NR_MEMBARRIER, &[])
}

/// Compare-and-swap. Never returns on this target.
pub fn cas(_p: *mut i32, _expected: i32, _new: i32) -> i32 {
    tracing::error!("compare-and-swap is unavailable on wasm32");
    crash()
}

/// Compare-and-swap that reports the missing capability instead of crashing.
pub fn try_cas(_p: *mut i32, _expected: i32, _new: i32) -> Result<i32, AtomicCapability> {
    Err(CAS_CAPABILITY)
}

/// Terminates the process after an unrecoverable internal error.
#[cold]
pub fn crash() -> ! {
    #[cfg(target_arch = "wasm32")]
    {
        core::arch::wasm32::unreachable()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        panic!("crash")
    }
}
