//! DeviceChannel: character special randomness devices.
//!
//! Strong requests read `/dev/random`, which blocks until the kernel pool has
//! been seeded; weak requests read `/dev/urandom`, which never blocks. Both
//! are cryptographically suitable once seeded.
//!
//! Before a single byte is read the open handle is `fstat`ed and rejected if
//! it is a regular file. A device node replaced by an ordinary file would
//! otherwise "succeed" deterministically with whatever the file holds.
//!
//! The handle is opened `O_CLOEXEC` so it never leaks into an exec'd child,
//! and it is closed on every return path when the `File` drops.

use std::path::{Path, PathBuf};

use crate::channel::{ChannelKind, EntropyChannel, Strength};
use crate::error::ChannelError;

/// Device read for strong requests.
pub const STRONG_DEVICE: &str = "/dev/random";

/// Device read for weak requests.
pub const WEAK_DEVICE: &str = "/dev/urandom";

/// Channel that reads a character special device chosen by strength.
#[derive(Debug, Clone)]
pub struct DeviceChannel {
    strong_path: PathBuf,
    weak_path: PathBuf,
}

impl Default for DeviceChannel {
    fn default() -> Self {
        Self::new(STRONG_DEVICE, WEAK_DEVICE)
    }
}

impl DeviceChannel {
    /// Use custom device paths for strong and weak requests.
    pub fn new(strong_path: impl Into<PathBuf>, weak_path: impl Into<PathBuf>) -> Self {
        Self {
            strong_path: strong_path.into(),
            weak_path: weak_path.into(),
        }
    }

    /// The device path a request of this strength reads from.
    pub fn path_for(&self, strength: Strength) -> &Path {
        match strength {
            Strength::Strong => &self.strong_path,
            Strength::Weak => &self.weak_path,
        }
    }
}

impl EntropyChannel for DeviceChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Device
    }

    fn name(&self) -> &'static str {
        "random_device"
    }

    fn is_available(&self) -> bool {
        cfg!(unix)
    }

    fn fill(&self, buf: &mut [u8], strength: Strength) -> Result<(), ChannelError> {
        read_device(self.path_for(strength), buf)
    }
}

/// Open `path` read-only and close-on-exec.
#[cfg(unix)]
fn open_device(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_CLOEXEC)
        .open(path)
}

#[cfg(unix)]
fn read_device(path: &Path, buf: &mut [u8]) -> Result<(), ChannelError> {
    use std::io::Read;

    use crate::channels::helpers::fill_exact;

    let mut file = open_device(path)?;

    // fstat on the open handle, not stat on the path, so the check and the
    // read see the same inode.
    let meta = file.metadata()?;
    if meta.file_type().is_file() {
        log::warn!(
            "{} is a regular file, not a random device; refusing to read",
            path.display()
        );
        return Err(ChannelError::NotSpecialFile(path.to_path_buf()));
    }

    fill_exact(buf, |chunk| file.read(chunk))
}

#[cfg(not(unix))]
fn read_device(_path: &Path, _buf: &mut [u8]) -> Result<(), ChannelError> {
    Err(ChannelError::Unsupported)
}
