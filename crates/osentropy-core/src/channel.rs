//! Randomness channel trait and request policy types.
//!
//! Every OS randomness facility implements the [`EntropyChannel`] trait. A
//! channel fills a caller buffer completely or reports why it could not; it
//! never reports success on a partial fill.

use crate::error::ChannelError;

/// Seeding policy for a randomness request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    /// Return promptly, without waiting for the OS generator to be seeded.
    #[default]
    Weak,
    /// Block until the OS generator has been seeded. May block at first boot.
    Strong,
}

impl Strength {
    pub fn is_strong(self) -> bool {
        self == Self::Strong
    }
}

impl From<bool> for Strength {
    fn from(strong: bool) -> Self {
        if strong { Self::Strong } else { Self::Weak }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

/// Family of OS mechanism behind a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Kernel random-generation system call (`getrandom(2)`).
    Kernel,
    /// Character special device (`/dev/random`, `/dev/urandom`).
    Device,
    /// Platform cryptographic service provider (Windows CryptoAPI).
    Provider,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kernel => write!(f, "kernel"),
            Self::Device => write!(f, "device"),
            Self::Provider => write!(f, "provider"),
        }
    }
}

/// Trait that every randomness channel must implement.
pub trait EntropyChannel: Send + Sync {
    /// Mechanism family, used for logging and diagnostics.
    fn kind(&self) -> ChannelKind;

    /// Short identifier (e.g. `"getrandom"`, `"dev_random"`).
    fn name(&self) -> &'static str;

    /// Whether this channel can exist on the current machine at all.
    ///
    /// `true` does not promise that [`fill`](Self::fill) succeeds; it only
    /// means trying is meaningful.
    fn is_available(&self) -> bool {
        true
    }

    /// Overwrite every byte of `buf` with OS randomness.
    ///
    /// On `Err` the contents of `buf` are unspecified. Interrupted system
    /// calls are retried internally and never surface here.
    fn fill(&self, buf: &mut [u8], strength: Strength) -> Result<(), ChannelError>;
}
