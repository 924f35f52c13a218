//! Error types for channel exhaustion and total failure.

use std::io;
use std::path::PathBuf;

use crate::channel::ChannelKind;

/// Why a single channel gave up on a request.
///
/// Interrupted system calls are never represented here: they are retried
/// inside the channel.
#[derive(Debug)]
pub enum ChannelError {
    /// The facility is not implemented on this kernel or platform.
    Unsupported,
    /// Hard OS error from open, fstat, read or the random-generation call.
    Os(io::Error),
    /// A read or generate call returned zero bytes before the buffer was full.
    EndOfStream { filled: usize, requested: usize },
    /// The device path resolved to a regular file and was not read.
    NotSpecialFile(PathBuf),
    /// The cryptographic service provider failed with the given error code.
    Provider(u32),
}

impl From<io::Error> for ChannelError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Unsupported {
            Self::Unsupported
        } else {
            Self::Os(err)
        }
    }
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "not supported on this system"),
            Self::Os(err) => write!(f, "os error: {err}"),
            Self::EndOfStream { filled, requested } => {
                write!(f, "end of stream after {filled} of {requested} bytes")
            }
            Self::NotSpecialFile(path) => {
                write!(f, "{} is a regular file, refusing to read", path.display())
            }
            Self::Provider(code) => write!(f, "crypto provider error 0x{code:08x}"),
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Os(err) => Some(err),
            _ => None,
        }
    }
}

/// Every applicable channel was exhausted. The buffer must not be used.
#[derive(Debug, Default)]
pub struct EntropyError {
    /// Each channel tried, in priority order, with the reason it gave up.
    pub attempted: Vec<(ChannelKind, ChannelError)>,
}

impl EntropyError {
    /// Whether any channel was tried at all.
    pub fn no_channels(&self) -> bool {
        self.attempted.is_empty()
    }
}

impl std::fmt::Display for EntropyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.attempted.is_empty() {
            return write!(f, "no OS randomness channel on this platform");
        }
        write!(f, "all OS randomness channels failed")?;
        for (kind, err) in &self.attempted {
            write!(f, "; {kind}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EntropyError {}
