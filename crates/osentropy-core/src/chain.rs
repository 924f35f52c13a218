//! Ordered channel chain: the OS entropy source proper.
//!
//! Architecture:
//! 1. Channels are registered highest priority first
//! 2. A request is offered to each channel in turn, with the whole buffer
//! 3. The first channel that fills the buffer completely wins
//! 4. A channel that gives up is logged and the next one is tried
//! 5. If every channel gives up, the request fails as a whole
//!
//! There is no state beyond the channel list, which is immutable after
//! construction, so one `OsEntropy` can serve any number of threads.

use std::time::Instant;

use crate::channel::{ChannelKind, EntropyChannel, Strength};
use crate::error::{ChannelError, EntropyError};

/// Prioritized list of OS randomness channels.
pub struct OsEntropy {
    channels: Vec<Box<dyn EntropyChannel>>,
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self::platform()
    }
}

impl OsEntropy {
    /// The channel chain for the current platform.
    pub fn platform() -> Self {
        Self::with_channels(crate::channels::platform_channels())
    }

    /// A chain with explicit channels, highest priority first.
    pub fn with_channels(channels: Vec<Box<dyn EntropyChannel>>) -> Self {
        Self { channels }
    }

    /// Append a channel at the lowest priority.
    pub fn add_channel(&mut self, channel: Box<dyn EntropyChannel>) {
        self.channels.push(channel);
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Registered channels, highest priority first.
    pub fn channels(&self) -> impl Iterator<Item = &dyn EntropyChannel> {
        self.channels.iter().map(|c| c.as_ref())
    }

    /// Overwrite all of `buf` with OS randomness.
    ///
    /// An empty buffer succeeds without consulting any channel. On `Err`
    /// the contents of `buf` are unspecified and must not be used as
    /// entropy.
    pub fn fill(&self, buf: &mut [u8], strength: Strength) -> Result<(), EntropyError> {
        if buf.is_empty() {
            return Ok(());
        }

        let mut failure = EntropyError::default();
        for channel in &self.channels {
            if !channel.is_available() {
                failure
                    .attempted
                    .push((channel.kind(), ChannelError::Unsupported));
                continue;
            }
            match channel.fill(buf, strength) {
                Ok(()) => {
                    if !failure.no_channels() {
                        log::debug!(
                            "{strength} request for {} bytes satisfied by {} after fallback",
                            buf.len(),
                            channel.name()
                        );
                    }
                    return Ok(());
                }
                Err(err) => {
                    log::debug!(
                        "{} channel {} gave up on {strength} request: {err}",
                        channel.kind(),
                        channel.name()
                    );
                    failure.attempted.push((channel.kind(), err));
                }
            }
        }

        log::warn!("{strength} request for {} bytes failed: {failure}", buf.len());
        Err(failure)
    }

    /// Try every channel on its own, for every strength, without fallback.
    pub fn probe(&self, n_bytes: usize, strengths: &[Strength]) -> Vec<ChannelProbe> {
        let mut buf = vec![0u8; n_bytes];
        let mut probes = Vec::new();

        for channel in &self.channels {
            for &strength in strengths {
                let t0 = Instant::now();
                let result = if channel.is_available() {
                    channel.fill(&mut buf, strength)
                } else {
                    Err(ChannelError::Unsupported)
                };
                probes.push(ChannelProbe {
                    name: channel.name(),
                    kind: channel.kind(),
                    strength,
                    ok: result.is_ok(),
                    error: result.err().map(|e| e.to_string()),
                    time: t0.elapsed().as_secs_f64(),
                });
            }
        }

        probes
    }
}

/// Fill `buf` from the platform channel chain.
pub fn fill(buf: &mut [u8], strength: Strength) -> Result<(), EntropyError> {
    OsEntropy::platform().fill(buf, strength)
}

/// Fill `buf` with OS randomness; `strong` blocks until the OS generator is
/// seeded.
///
/// Returns `true` only if every byte was overwritten by a genuine OS channel.
/// On `false` the buffer contents are unspecified and the caller must treat
/// the request as a fatal inability to obtain entropy.
pub fn fill_strong_or_weak_random(buf: &mut [u8], strong: bool) -> bool {
    fill(buf, Strength::from(strong)).is_ok()
}

/// Outcome of trying a single channel in isolation.
#[derive(Debug, Clone)]
pub struct ChannelProbe {
    /// Channel name.
    pub name: &'static str,
    /// Channel family.
    pub kind: ChannelKind,
    /// Strength requested.
    pub strength: Strength,
    /// Whether the channel filled the buffer.
    pub ok: bool,
    /// Why the channel gave up, if it did.
    pub error: Option<String>,
    /// Time taken in seconds.
    pub time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Mock channels for testing
    // -----------------------------------------------------------------------

    /// Fills with a constant byte and records every strength it was asked for.
    struct MockChannel {
        name: &'static str,
        byte: u8,
        seen: Arc<Mutex<Vec<Strength>>>,
    }

    impl MockChannel {
        fn new(name: &'static str, byte: u8) -> (Self, Arc<Mutex<Vec<Strength>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name,
                    byte,
                    seen: Arc::clone(&seen),
                },
                seen,
            )
        }
    }

    impl EntropyChannel for MockChannel {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Device
        }
        fn name(&self) -> &'static str {
            self.name
        }
        fn fill(&self, buf: &mut [u8], strength: Strength) -> Result<(), ChannelError> {
            self.seen.lock().unwrap().push(strength);
            buf.fill(self.byte);
            Ok(())
        }
    }

    /// Permanently unavailable (`ENOSYS`); never writes the buffer.
    struct UnsupportedChannel {
        calls: Arc<Mutex<usize>>,
    }

    impl EntropyChannel for UnsupportedChannel {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Kernel
        }
        fn name(&self) -> &'static str {
            "unsupported"
        }
        fn fill(&self, _buf: &mut [u8], _strength: Strength) -> Result<(), ChannelError> {
            *self.calls.lock().unwrap() += 1;
            Err(ChannelError::Unsupported)
        }
    }

    /// Writes part of the buffer, then reports end of stream.
    struct PartialChannel;

    impl EntropyChannel for PartialChannel {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Kernel
        }
        fn name(&self) -> &'static str {
            "partial"
        }
        fn fill(&self, buf: &mut [u8], _strength: Strength) -> Result<(), ChannelError> {
            let half = buf.len() / 2;
            buf[..half].fill(0xEE);
            Err(ChannelError::EndOfStream {
                filled: half,
                requested: buf.len(),
            })
        }
    }

    /// Reports itself unavailable; must never be asked to fill.
    struct AbsentChannel;

    impl EntropyChannel for AbsentChannel {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Provider
        }
        fn name(&self) -> &'static str {
            "absent"
        }
        fn is_available(&self) -> bool {
            false
        }
        fn fill(&self, _buf: &mut [u8], _strength: Strength) -> Result<(), ChannelError> {
            panic!("fill called on unavailable channel");
        }
    }

    // -----------------------------------------------------------------------
    // Chain tests
    // -----------------------------------------------------------------------

    #[test]
    fn empty_request_touches_nothing() {
        let chain = OsEntropy::with_channels(vec![Box::new(AbsentChannel)]);
        let mut buf: [u8; 0] = [];
        chain.fill(&mut buf, Strength::Strong).unwrap();
    }

    #[test]
    fn empty_chain_fails_nonempty_request() {
        let chain = OsEntropy::with_channels(Vec::new());
        let mut buf = [0u8; 1];
        let err = chain.fill(&mut buf, Strength::Weak).unwrap_err();
        assert!(err.no_channels());
    }

    #[test]
    fn first_success_wins() {
        let (first, first_seen) = MockChannel::new("first", 0x11);
        let (second, second_seen) = MockChannel::new("second", 0x22);
        let chain = OsEntropy::with_channels(vec![Box::new(first), Box::new(second)]);

        let mut buf = [0u8; 32];
        chain.fill(&mut buf, Strength::Weak).unwrap();
        assert_eq!(buf, [0x11; 32]);
        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert!(second_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn unsupported_channel_falls_through_untouched() {
        let calls = Arc::new(Mutex::new(0));
        let (fallback, seen) = MockChannel::new("fallback", 0x7A);
        let chain = OsEntropy::with_channels(vec![
            Box::new(UnsupportedChannel {
                calls: Arc::clone(&calls),
            }),
            Box::new(fallback),
        ]);

        let mut buf = [0u8; 64];
        chain.fill(&mut buf, Strength::Strong).unwrap();
        assert_eq!(buf, [0x7A; 64]);
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![Strength::Strong]);
    }

    #[test]
    fn fallback_overwrites_partial_fill() {
        let (fallback, _) = MockChannel::new("fallback", 0x33);
        let chain = OsEntropy::with_channels(vec![Box::new(PartialChannel), Box::new(fallback)]);

        let mut buf = [0u8; 40];
        chain.fill(&mut buf, Strength::Weak).unwrap();
        assert_eq!(buf, [0x33; 40]);
    }

    #[test]
    fn all_channels_failing_is_total_failure() {
        let calls = Arc::new(Mutex::new(0));
        let chain = OsEntropy::with_channels(vec![
            Box::new(UnsupportedChannel {
                calls: Arc::clone(&calls),
            }),
            Box::new(PartialChannel),
            Box::new(AbsentChannel),
        ]);

        let mut buf = [0u8; 8];
        let err = chain.fill(&mut buf, Strength::Strong).unwrap_err();
        let kinds: Vec<ChannelKind> = err.attempted.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![ChannelKind::Kernel, ChannelKind::Kernel, ChannelKind::Provider]
        );
        assert!(matches!(err.attempted[1].1, ChannelError::EndOfStream { .. }));
    }

    #[test]
    fn strength_reaches_channel() {
        let (mock, seen) = MockChannel::new("mock", 1);
        let chain = OsEntropy::with_channels(vec![Box::new(mock)]);
        let mut buf = [0u8; 4];
        chain.fill(&mut buf, Strength::Strong).unwrap();
        chain.fill(&mut buf, Strength::Weak).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![Strength::Strong, Strength::Weak]);
    }

    #[test]
    fn add_channel_appends_lowest_priority() {
        let mut chain = OsEntropy::with_channels(vec![Box::new(PartialChannel)]);
        let (mock, _) = MockChannel::new("mock", 9);
        chain.add_channel(Box::new(mock));
        assert_eq!(chain.channel_count(), 2);
        let names: Vec<&str> = chain.channels().map(|c| c.name()).collect();
        assert_eq!(names, vec!["partial", "mock"]);
    }

    #[test]
    fn probe_reports_each_channel_and_strength() {
        let (mock, _) = MockChannel::new("mock", 1);
        let chain = OsEntropy::with_channels(vec![Box::new(PartialChannel), Box::new(mock)]);
        let probes = chain.probe(16, &[Strength::Weak, Strength::Strong]);

        assert_eq!(probes.len(), 4);
        assert!(!probes[0].ok);
        assert!(probes[0].error.as_deref().unwrap().contains("end of stream"));
        assert_eq!(probes[1].strength, Strength::Strong);
        assert!(probes[2].ok && probes[3].ok);
        assert!(probes[2].error.is_none());
    }

    #[test]
    fn boolean_contract_on_platform() {
        let mut buf = [0u8; 32];
        assert!(fill_strong_or_weak_random(&mut buf, false));
        assert!(fill_strong_or_weak_random(&mut [], true));
    }
}
