//! Syscall numbers and the argument packing convention for wasm32.
//!
//! The host supplies `__syscall0` through `__syscall6` as imports. Socket operations
//! are not individual syscalls: they go through `socketcall` with a [`SocketCall`] code
//! and a pointer to a block of six argument words.

use crate::atomic::crash;
use crate::errno::{set_errno, Errno};

/// The C `long`: 32 bits on wasm32, pointer sized on the usual 64-bit hosts.
pub type Long = core::ffi::c_long;

pub const NR_SOCKETCALL: Long = 102;
pub const NR_MEMBARRIER: Long = 375;

/// Most arguments a syscall entry point takes.
pub const MAX_ARGS: usize = 6;

/// Operation codes multiplexed through [`NR_SOCKETCALL`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum SocketCall {
    Socket = 1,
    Bind = 2,
    Connect = 3,
    Listen = 4,
    Accept = 5,
    GetSockName = 6,
    GetPeerName = 7,
    SocketPair = 8,
    Send = 9,
    Recv = 10,
    SendTo = 11,
    RecvFrom = 12,
    Shutdown = 13,
    SetSockOpt = 14,
    GetSockOpt = 15,
    SendMsg = 16,
    RecvMsg = 17,
    Accept4 = 18,
    RecvMmsg = 19,
    SendMmsg = 20,
}

impl SocketCall {
    pub const ALL: [SocketCall; 20] = [
        SocketCall::Socket,
        SocketCall::Bind,
        SocketCall::Connect,
        SocketCall::Listen,
        SocketCall::Accept,
        SocketCall::GetSockName,
        SocketCall::GetPeerName,
        SocketCall::SocketPair,
        SocketCall::Send,
        SocketCall::Recv,
        SocketCall::SendTo,
        SocketCall::RecvFrom,
        SocketCall::Shutdown,
        SocketCall::SetSockOpt,
        SocketCall::GetSockOpt,
        SocketCall::SendMsg,
        SocketCall::RecvMsg,
        SocketCall::Accept4,
        SocketCall::RecvMmsg,
        SocketCall::SendMmsg,
    ];

    pub const fn code(self) -> Long {
        self as Long
    }
}

impl TryFrom<Long> for SocketCall {
    type Error = Errno;

    fn try_from(code: Long) -> Result<Self, Errno> {
        match code {
            1..=20 => Ok(SocketCall::ALL[code as usize - 1]),
            _ => Err(Errno::EINVAL),
        }
    }
}

/// Splits a 64-bit argument into two 32-bit words, low word first.
pub const fn ll_even(x: i64) -> [Long; 2] {
    let bits = x as u64;
    [bits as u32 as i32 as Long, (bits >> 32) as u32 as i32 as Long]
}

/// [`ll_even`] preceded by a zero word, for arguments that must start on an even slot.
pub const fn ll_odd(x: i64) -> [Long; 3] {
    let [low, high] = ll_even(x);
    [0, low, high]
}

/// The generic syscall entry points of the host.
pub trait SyscallDispatch {
    /// Invokes syscall `nr` with up to [`MAX_ARGS`] arguments.
    ///
    /// Returns the raw result: failures come back as `-errno`.
    fn dispatch(&self, nr: Long, args: &[Long]) -> Long;
}

/// Dispatches to the `__syscallN` imports of the running instance.
/// Off wasm every call fails with `ENOSYS`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostDispatch;

#[cfg(target_arch = "wasm32")]
extern "C" {
    fn __syscall0(n: Long) -> Long;
    fn __syscall1(n: Long, a: Long) -> Long;
    fn __syscall2(n: Long, a: Long, b: Long) -> Long;
    fn __syscall3(n: Long, a: Long, b: Long, c: Long) -> Long;
    fn __syscall4(n: Long, a: Long, b: Long, c: Long, d: Long) -> Long;
    fn __syscall5(n: Long, a: Long, b: Long, c: Long, d: Long, e: Long) -> Long;
    fn __syscall6(n: Long, a: Long, b: Long, c: Long, d: Long, e: Long, f: Long) -> Long;
}

impl SyscallDispatch for HostDispatch {
    #[cfg(target_arch = "wasm32")]
    fn dispatch(&self, nr: Long, args: &[Long]) -> Long {
        unsafe {
            match *args {
                [] => __syscall0(nr),
                [a] => __syscall1(nr, a),
                [a, b] => __syscall2(nr, a, b),
                [a, b, c] => __syscall3(nr, a, b, c),
                [a, b, c, d] => __syscall4(nr, a, b, c, d),
                [a, b, c, d, e] => __syscall5(nr, a, b, c, d, e),
                [a, b, c, d, e, f] => __syscall6(nr, a, b, c, d, e, f),
                _ => crash(),
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn dispatch(&self, _nr: Long, args: &[Long]) -> Long {
        if args.len() > MAX_ARGS {
            crash();
        }
        -(Errno::ENOSYS.code() as Long)
    }
}

/// Issues socket operation `op` through [`NR_SOCKETCALL`].
///
/// The block address travels as a `long`, which is pointer sized on wasm32.
/// Unused trailing words of `args` are ignored by the host.
pub fn socketcall<D: SyscallDispatch + ?Sized>(
    dispatch: &D,
    op: SocketCall,
    args: [Long; MAX_ARGS],
) -> Long {
    dispatch.dispatch(NR_SOCKETCALL, &[op.code(), args.as_ptr() as usize as Long])
}

/// Decodes a raw syscall result: `-4095..=-1` is an error code, anything else a value.
pub fn check(r: Long) -> Result<Long, Errno> {
    if (-(Errno::MAX.code() as Long)..=-1).contains(&r) {
        Err(Errno(-r as i32))
    } else {
        Ok(r)
    }
}

/// The libc return convention: errors are stored in the last-error slot and become `-1`.
pub fn syscall_ret(r: Long) -> Long {
    match check(r) {
        Ok(value) => value,
        Err(err) => {
            set_errno(err);
            -1
        }
    }
}

/// `syscall(2)`: dispatch and apply [`syscall_ret`].
pub fn syscall<D: SyscallDispatch + ?Sized>(dispatch: &D, nr: Long, args: &[Long]) -> Long {
    syscall_ret(dispatch.dispatch(nr, args))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errno::{errno, TEST_LOCK};
    use std::{cell::RefCell, vec::Vec};

    /// Records every dispatched call and answers with a fixed result.
    pub(crate) struct Recorder {
        pub calls: RefCell<Vec<(Long, Vec<Long>)>>,
        pub result: Long,
    }

    impl Recorder {
        pub fn returning(result: Long) -> Self {
            Recorder {
                calls: RefCell::new(Vec::new()),
                result,
            }
        }
    }

    impl SyscallDispatch for Recorder {
        fn dispatch(&self, nr: Long, args: &[Long]) -> Long {
            self.calls.borrow_mut().push((nr, args.to_vec()));
            self.result
        }
    }

    #[test]
    fn socket_call_codes() {
        assert_eq!(SocketCall::Socket.code(), 1);
        assert_eq!(SocketCall::Send.code(), 9);
        assert_eq!(SocketCall::Accept4.code(), 18);
        assert_eq!(SocketCall::SendMmsg.code(), 20);
        for (i, op) in SocketCall::ALL.iter().enumerate() {
            assert_eq!(op.code(), i as Long + 1);
            assert_eq!(SocketCall::try_from(op.code()), Ok(*op));
        }
        assert_eq!(SocketCall::try_from(0), Err(Errno::EINVAL));
        assert_eq!(SocketCall::try_from(21), Err(Errno::EINVAL));
    }

    #[test]
    fn splits_64_bit_arguments() {
        assert_eq!(
            ll_even(0x1122_3344_5566_7788),
            [0x5566_7788, 0x1122_3344]
        );
        assert_eq!(ll_even(-1), [-1, -1]);
        assert_eq!(ll_even(1 << 32), [0, 1]);
        assert_eq!(ll_odd(5), [0, 5, 0]);
    }

    /// Reads the argument block back while the call is in flight.
    #[cfg(not(windows))]
    struct BlockReader {
        seen: RefCell<Option<(Long, Long, [Long; MAX_ARGS])>>,
    }

    #[cfg(not(windows))]
    impl SyscallDispatch for BlockReader {
        fn dispatch(&self, nr: Long, args: &[Long]) -> Long {
            let block = unsafe { *(args[1] as usize as *const [Long; MAX_ARGS]) };
            *self.seen.borrow_mut() = Some((nr, args[0], block));
            0
        }
    }

    #[test]
    fn socketcall_multiplexes() {
        let recorder = Recorder::returning(3);
        assert_eq!(
            socketcall(&recorder, SocketCall::Connect, [3, 0, 16, 0, 0, 0]),
            3
        );
        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (nr, args) = &calls[0];
        assert_eq!(*nr, NR_SOCKETCALL);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], SocketCall::Connect.code());
    }

    // LLP64 hosts have a 32-bit `long` that cannot carry the block address.
    #[cfg(not(windows))]
    #[test]
    fn socketcall_packs_argument_block() {
        let reader = BlockReader {
            seen: RefCell::new(None),
        };
        socketcall(&reader, SocketCall::Connect, [3, 0, 16, 0, 0, 0]);
        assert_eq!(
            reader.seen.into_inner(),
            Some((NR_SOCKETCALL, SocketCall::Connect.code(), [3, 0, 16, 0, 0, 0]))
        );
    }

    #[test]
    fn decodes_results() {
        assert_eq!(check(0), Ok(0));
        assert_eq!(check(42), Ok(42));
        assert_eq!(check(-12), Err(Errno::ENOMEM));
        assert_eq!(check(-4095), Err(Errno(4095)));
        assert_eq!(check(-4096), Ok(-4096));
        assert_eq!(check(Long::MIN), Ok(Long::MIN));
    }

    #[test]
    fn syscall_sets_errno_on_failure() {
        let _guard = TEST_LOCK.lock();
        set_errno(Errno::NONE);
        assert_eq!(syscall(&Recorder::returning(7), 4, &[1, 2, 3]), 7);
        assert_eq!(errno(), Errno::NONE);
        assert_eq!(syscall(&Recorder::returning(-22), 4, &[1, 2, 3]), -1);
        assert_eq!(errno(), Errno::EINVAL);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn host_dispatch_is_unimplemented_off_wasm() {
        assert_eq!(HostDispatch.dispatch(NR_MEMBARRIER, &[]), -38);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    #[should_panic]
    fn too_many_arguments_crash() {
        HostDispatch.dispatch(1, &[0; 7]);
    }
}
