//! OS randomness channel implementations.

pub mod helpers;

pub mod device;
pub mod kernel;
pub mod provider;

use crate::channel::EntropyChannel;

/// Channels for the current platform, highest priority first.
pub fn platform_channels() -> Vec<Box<dyn EntropyChannel>> {
    #[allow(unused_mut)]
    let mut channels: Vec<Box<dyn EntropyChannel>> = Vec::new();

    #[cfg(any(target_os = "linux", target_os = "android"))]
    channels.push(Box::new(kernel::KernelChannel::new()));

    #[cfg(unix)]
    channels.push(Box::new(device::DeviceChannel::default()));

    #[cfg(windows)]
    channels.push(Box::new(provider::ProviderChannel::new()));

    channels
}
