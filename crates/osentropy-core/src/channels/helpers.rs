//! Shared helpers used by multiple channel implementations.

use std::io;

use crate::error::ChannelError;

// ---------------------------------------------------------------------------
// Short-read accumulation
// ---------------------------------------------------------------------------

/// Call `read` on the unfilled tail of `buf` until the buffer is full.
///
/// `read` has `read(2)` semantics: it returns how many bytes it wrote at the
/// start of the slice it was given. Invariant: continue until the remaining
/// length is zero or the call reports an unrecoverable result.
///
/// - `Err` of kind `Interrupted`: retried with the same remaining length.
/// - `Ok(0)`: the channel is exhausted, [`ChannelError::EndOfStream`].
/// - any other `Err`: returned as a [`ChannelError`].
pub fn fill_exact<F>(buf: &mut [u8], mut read: F) -> Result<(), ChannelError>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    let requested = buf.len();
    let mut filled = 0;

    while filled < requested {
        match read(&mut buf[filled..]) {
            Ok(0) => return Err(ChannelError::EndOfStream { filled, requested }),
            Ok(n) => {
                filled += n.min(requested - filled);
                if filled < requested {
                    log::trace!("short read: {filled}/{requested} bytes");
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// MemorySanitizer bookkeeping
// ---------------------------------------------------------------------------

/// Tell MemorySanitizer that `buf` was initialized by the kernel.
///
/// Syscalls issued through `libc::syscall` are opaque to MSan, so without
/// this every byte from `getrandom(2)` reads as uninitialized.
#[cfg(feature = "msan")]
pub fn mark_initialized(buf: &[u8]) {
    unsafe extern "C" {
        fn __msan_unpoison(addr: *const std::ffi::c_void, size: usize);
    }
    // SAFETY: `buf` is a valid, live slice; unpoisoning only updates shadow
    // memory for exactly that range.
    unsafe { __msan_unpoison(buf.as_ptr().cast(), buf.len()) }
}

#[cfg(not(feature = "msan"))]
#[inline(always)]
pub fn mark_initialized(_buf: &[u8]) {}
