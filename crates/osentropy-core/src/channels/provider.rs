//! ProviderChannel: platform cryptographic service provider.
//!
//! On Windows this is the CryptoAPI triple `CryptAcquireContextW` /
//! `CryptGenRandom` / `CryptReleaseContext` with a `PROV_RSA_FULL`
//! verify-only context. Provider output is always treated as strong, so the
//! request strength is ignored.
//!
//! The acquired context lives in an [`Acquired`] guard and is released when
//! the guard drops, whether generation succeeded or not.

use crate::channel::{ChannelKind, EntropyChannel, Strength};
use crate::error::ChannelError;

/// Acquire / generate / release interface of a crypto service provider.
pub trait ServiceProvider: Send + Sync {
    /// Opaque handle to an acquired cryptographic context.
    type Context;

    fn acquire(&self) -> Result<Self::Context, ChannelError>;

    /// Fill all of `buf` in one call. `buf.len()` never exceeds `u32::MAX`.
    fn generate(&self, ctx: &Self::Context, buf: &mut [u8]) -> Result<(), ChannelError>;

    fn release(&self, ctx: Self::Context);
}

/// Scoped provider context; released on drop.
struct Acquired<'a, P: ServiceProvider> {
    provider: &'a P,
    ctx: Option<P::Context>,
}

impl<'a, P: ServiceProvider> Acquired<'a, P> {
    fn new(provider: &'a P) -> Result<Self, ChannelError> {
        let ctx = provider.acquire()?;
        Ok(Self {
            provider,
            ctx: Some(ctx),
        })
    }

    fn generate(&self, buf: &mut [u8]) -> Result<(), ChannelError> {
        match &self.ctx {
            Some(ctx) => self.provider.generate(ctx, buf),
            None => Err(ChannelError::Unsupported),
        }
    }
}

impl<P: ServiceProvider> Drop for Acquired<'_, P> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.provider.release(ctx);
        }
    }
}

/// Channel backed by a cryptographic service provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderChannel<P> {
    provider: P,
}

impl<P: ServiceProvider> ProviderChannel<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ServiceProvider> EntropyChannel for ProviderChannel<P> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Provider
    }

    fn name(&self) -> &'static str {
        "crypt_gen_random"
    }

    fn fill(&self, buf: &mut [u8], _strength: Strength) -> Result<(), ChannelError> {
        let ctx = Acquired::new(&self.provider)?;
        for chunk in buf.chunks_mut(u32::MAX as usize) {
            ctx.generate(chunk)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Windows CryptoAPI
// ---------------------------------------------------------------------------

#[cfg(windows)]
pub use cryptoapi::CryptoApi;

#[cfg(windows)]
impl ProviderChannel<CryptoApi> {
    pub fn new() -> Self {
        Self {
            provider: CryptoApi,
        }
    }
}

#[cfg(windows)]
mod cryptoapi {
    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::Security::Cryptography::{
        CRYPT_VERIFYCONTEXT, CryptAcquireContextW, CryptGenRandom, CryptReleaseContext,
        PROV_RSA_FULL,
    };

    use super::ServiceProvider;
    use crate::error::ChannelError;

    /// The Windows CryptoAPI default RSA provider.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct CryptoApi;

    impl ServiceProvider for CryptoApi {
        type Context = usize;

        fn acquire(&self) -> Result<usize, ChannelError> {
            let mut handle: usize = 0;
            // SAFETY: `handle` is a valid out-pointer; null container and
            // provider names select the default provider.
            let ok = unsafe {
                CryptAcquireContextW(
                    &mut handle,
                    std::ptr::null(),
                    std::ptr::null(),
                    PROV_RSA_FULL,
                    CRYPT_VERIFYCONTEXT,
                )
            };
            if ok == 0 {
                // SAFETY: reads the calling thread's last-error value.
                return Err(ChannelError::Provider(unsafe { GetLastError() }));
            }
            Ok(handle)
        }

        fn generate(&self, ctx: &usize, buf: &mut [u8]) -> Result<(), ChannelError> {
            // SAFETY: `ctx` is a live context from `acquire`; `buf` is valid
            // for writes of `buf.len()` bytes, which fits in u32.
            let ok = unsafe { CryptGenRandom(*ctx, buf.len() as u32, buf.as_mut_ptr()) };
            if ok == 0 {
                // SAFETY: reads the calling thread's last-error value.
                return Err(ChannelError::Provider(unsafe { GetLastError() }));
            }
            Ok(())
        }

        fn release(&self, ctx: usize) {
            // SAFETY: `ctx` came from a successful `acquire` and is released
            // exactly once.
            let _ = unsafe { CryptReleaseContext(ctx, 0) };
        }
    }
}
