//! # osentropy-core
//!
//! **Give me N bytes of OS-backed randomness, or tell me you can't.**
//!
//! `osentropy-core` fills caller buffers from the operating system's random
//! generator. It is the raw-entropy primitive underneath a seeding PRNG: it
//! does no mixing, keeps no pool, and never substitutes weaker randomness.
//!
//! ## Quick Start
//!
//! ```no_run
//! use osentropy_core::{Strength, fill, fill_strong_or_weak_random};
//!
//! // Boolean contract: false means "no entropy", never "some entropy".
//! let mut seed = [0u8; 32];
//! assert!(fill_strong_or_weak_random(&mut seed, true));
//!
//! // Typed variant with the reason each channel gave up.
//! let mut nonce = [0u8; 12];
//! if let Err(e) = fill(&mut nonce, Strength::Weak) {
//!     eprintln!("{e}");
//! }
//! ```
//!
//! ## Strength
//!
//! - **Strong**: blocks until the kernel generator has been seeded. Only
//!   ever blocks early in boot.
//! - **Weak**: never blocks; served from the same generator without waiting
//!   for the seeded guarantee.
//!
//! ## Channels
//!
//! Channels → Chain (first full success wins) → Caller buffer
//!
//! | Platform | Chain |
//! | --- | --- |
//! | Linux, Android | `getrandom(2)` → `/dev/random` / `/dev/urandom` |
//! | other Unix | `/dev/random` / `/dev/urandom` |
//! | Windows | CryptoAPI `CryptGenRandom` |
//!
//! Every channel implements the [`EntropyChannel`] trait. The [`OsEntropy`]
//! chain offers the whole buffer to each channel in priority order.

pub mod chain;
pub mod channel;
pub mod channels;
pub mod error;

pub use chain::{ChannelProbe, OsEntropy, fill, fill_strong_or_weak_random};
pub use channel::{ChannelKind, EntropyChannel, Strength};
pub use channels::device::{DeviceChannel, STRONG_DEVICE, WEAK_DEVICE};
pub use channels::kernel::{GetrandomCall, KernelChannel};
pub use channels::platform_channels;
pub use channels::provider::{ProviderChannel, ServiceProvider};
pub use error::{ChannelError, EntropyError};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
