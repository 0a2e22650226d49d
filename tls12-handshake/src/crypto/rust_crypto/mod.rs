use std::sync::Arc;

use super::tls12::PrfUsingHmac;
use super::{CryptoProvider, GetRandomFailed, SecureRandom};

/// Hash functions.
pub mod hash;

/// HMAC functions.
pub mod hmac;

mod kx;

/// A `CryptoProvider` backed by `sha2`, `hmac`, `rsa` and the operating
/// system's random number generator.
pub fn default_provider() -> Arc<CryptoProvider> {
    Arc::new(CryptoProvider {
        secure_random: &OsRandom,
        hash: &hash::SHA256,
        prf: &PRF_SHA256,
        rsa: &kx::RsaPkcs1,
    })
}

static PRF_SHA256: PrfUsingHmac<'static> = PrfUsingHmac(&hmac::HMAC_SHA256);

/// Randomness from `rand_core::OsRng`.
#[derive(Debug)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&self, bytes: &mut [u8]) -> Result<(), GetRandomFailed> {
        use rand_core::RngCore;
        rand_core::OsRng
            .try_fill_bytes(bytes)
            .map_err(|_| GetRandomFailed)
    }
}
