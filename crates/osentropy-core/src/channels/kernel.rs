//! KernelChannel: the kernel's own random-generation system call.
//!
//! On Linux and Android this is `getrandom(2)`, issued through
//! `syscall(SYS_getrandom, ..)` so that it works even where libc has no
//! wrapper. Strength is expressed as a flag on the call: strong requests pass
//! no flags and block until the urandom pool has been seeded (only ever at
//! first boot); weak requests pass `GRND_NONBLOCK` and fail with `EAGAIN`
//! instead of blocking, which sends the request down to the next channel.
//!
//! A single call may return fewer bytes than asked for, and is interrupted
//! by signals with `EINTR`. Both are absorbed by [`fill_exact`]. `ENOSYS`
//! (kernel older than 3.17, or a seccomp filter) abandons the channel.

use std::io;

use crate::channel::{ChannelKind, EntropyChannel, Strength};
use crate::channels::helpers::{fill_exact, mark_initialized};
use crate::error::ChannelError;

/// One invocation of the kernel random-generation call.
///
/// Returns the number of bytes written at the start of `buf`. Errors carry
/// the raw `errno`; `EINTR` must be reported as [`io::ErrorKind::Interrupted`].
pub trait GetrandomCall: Send + Sync {
    fn getrandom(&self, buf: &mut [u8], strength: Strength) -> io::Result<usize>;
}

/// The real `getrandom(2)` system call.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SysGetrandom;

/// `getrandom(2)` flags for a request of this strength.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn getrandom_flags(strength: Strength) -> libc::c_uint {
    match strength {
        Strength::Strong => 0,
        Strength::Weak => libc::GRND_NONBLOCK,
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl GetrandomCall for SysGetrandom {
    fn getrandom(&self, buf: &mut [u8], strength: Strength) -> io::Result<usize> {
        let flags = getrandom_flags(strength);
        // SAFETY: `buf` is a valid writable region of `buf.len()` bytes for
        // the duration of the call; getrandom writes at most that many.
        let ret = unsafe { libc::syscall(libc::SYS_getrandom, buf.as_mut_ptr(), buf.len(), flags) };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ret as usize)
        }
    }
}

/// Channel backed by the kernel random-generation call.
#[derive(Debug, Clone, Default)]
pub struct KernelChannel<G> {
    call: G,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl KernelChannel<SysGetrandom> {
    pub fn new() -> Self {
        Self { call: SysGetrandom }
    }
}

impl<G: GetrandomCall> KernelChannel<G> {
    /// Drive the channel through a custom call, e.g. a test double.
    pub fn with_call(call: G) -> Self {
        Self { call }
    }
}

impl<G: GetrandomCall> EntropyChannel for KernelChannel<G> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Kernel
    }

    fn name(&self) -> &'static str {
        "getrandom"
    }

    fn fill(&self, buf: &mut [u8], strength: Strength) -> Result<(), ChannelError> {
        fill_exact(buf, |chunk| {
            let n = self.call.getrandom(chunk, strength)?;
            mark_initialized(&chunk[..n.min(chunk.len())]);
            Ok(n)
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Scripted getrandom double
    // -----------------------------------------------------------------------

    enum Step {
        Interrupt,
        Bytes(usize, u8),
        Errno(i32),
    }

    /// Plays back a fixed script of syscall outcomes and records each call.
    struct ScriptedCall {
        script: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<(usize, Strength)>>,
    }

    impl ScriptedCall {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(usize, Strength)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GetrandomCall for &ScriptedCall {
        fn getrandom(&self, buf: &mut [u8], strength: Strength) -> io::Result<usize> {
            self.calls.lock().unwrap().push((buf.len(), strength));
            match self.script.lock().unwrap().pop_front() {
                Some(Step::Interrupt) => Err(io::Error::from(io::ErrorKind::Interrupted)),
                Some(Step::Bytes(n, fill)) => {
                    let n = n.min(buf.len());
                    buf[..n].fill(fill);
                    Ok(n)
                }
                Some(Step::Errno(errno)) => Err(io::Error::from_raw_os_error(errno)),
                None => panic!("getrandom called past end of script"),
            }
        }
    }

    #[test]
    fn interrupt_mid_request_is_retried() {
        let call = ScriptedCall::new(vec![
            Step::Bytes(10, 0x11),
            Step::Interrupt,
            Step::Interrupt,
            Step::Bytes(22, 0x22),
        ]);
        let channel = KernelChannel::with_call(&call);
        let mut buf = [0u8; 32];
        channel.fill(&mut buf, Strength::Strong).unwrap();

        assert_eq!(&buf[..10], &[0x11; 10]);
        assert_eq!(&buf[10..], &[0x22; 22]);
        // Interrupted calls are retried with the same remaining length.
        let lens: Vec<usize> = call.calls().iter().map(|c| c.0).collect();
        assert_eq!(lens, vec![32, 22, 22, 22]);
    }

    #[test]
    fn enosys_abandons_channel_without_writing() {
        let call = ScriptedCall::new(vec![Step::Errno(libc::ENOSYS)]);
        let channel = KernelChannel::with_call(&call);
        let mut buf = [0xEE; 16];
        let err = channel.fill(&mut buf, Strength::Weak).unwrap_err();
        assert!(matches!(err, ChannelError::Unsupported));
        assert_eq!(buf, [0xEE; 16]);
        assert_eq!(call.calls().len(), 1);
    }

    #[test]
    fn zero_return_is_not_retried() {
        let call = ScriptedCall::new(vec![Step::Bytes(4, 1), Step::Bytes(0, 0)]);
        let channel = KernelChannel::with_call(&call);
        let mut buf = [0u8; 8];
        let err = channel.fill(&mut buf, Strength::Strong).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::EndOfStream {
                filled: 4,
                requested: 8
            }
        ));
        assert_eq!(call.calls().len(), 2);
    }

    #[test]
    fn eagain_is_a_hard_failure() {
        let call = ScriptedCall::new(vec![Step::Errno(libc::EAGAIN)]);
        let channel = KernelChannel::with_call(&call);
        let mut buf = [0u8; 8];
        match channel.fill(&mut buf, Strength::Weak).unwrap_err() {
            ChannelError::Os(e) => assert_eq!(e.raw_os_error(), Some(libc::EAGAIN)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn strength_is_passed_to_every_call() {
        let call = ScriptedCall::new(vec![Step::Bytes(3, 9), Step::Bytes(3, 9)]);
        let channel = KernelChannel::with_call(&call);
        let mut buf = [0u8; 6];
        channel.fill(&mut buf, Strength::Strong).unwrap();
        assert!(call.calls().iter().all(|c| c.1 == Strength::Strong));
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn strong_blocks_and_weak_does_not() {
        assert_eq!(getrandom_flags(Strength::Strong), 0);
        assert_eq!(getrandom_flags(Strength::Weak), libc::GRND_NONBLOCK);
        assert_eq!(getrandom_flags(Strength::Weak) & libc::GRND_RANDOM, 0);
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn sys_getrandom_fills_weak_request() {
        let channel = KernelChannel::new();
        assert_eq!(channel.name(), "getrandom");
        assert_eq!(channel.kind(), ChannelKind::Kernel);
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        channel.fill(&mut a, Strength::Weak).unwrap();
        channel.fill(&mut b, Strength::Weak).unwrap();
        assert_ne!(a, b);
    }
}
