use rand_core::{CryptoRng, RngCore};
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};

use crate::crypto::{RsaKeyExchange, RsaPublicKeyParts, SecureRandom};
use crate::error::Error;

#[cfg(feature = "logging")]
use crate::log::debug;

#[derive(Debug)]
pub(super) struct RsaPkcs1;

impl RsaKeyExchange for RsaPkcs1 {
    fn encrypt_pkcs1(
        &self,
        key: &RsaPublicKeyParts,
        data: &[u8],
        random: &dyn SecureRandom,
    ) -> Result<Vec<u8>, Error> {
        let public_key = RsaPublicKey::new(
            BigUint::from_bytes_be(key.modulus()),
            BigUint::from_bytes_be(key.exponent()),
        )
        .map_err(|_err| {
            debug!("unusable RSA public key: {_err}");
            Error::UnsupportedCertificate
        })?;

        let mut rng = ProviderRng {
            random,
            failed: false,
        };
        let encrypted = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, data)
            .map_err(|_err| {
                debug!("RSA encryption failed: {_err}");
                Error::UnsupportedCertificate
            })?;

        match rng.failed {
            true => Err(Error::FailedToGetRandomBytes),
            false => Ok(encrypted),
        }
    }
}

/// Presents a [`SecureRandom`] to `rsa` as an `RngCore`.
///
/// `RngCore::fill_bytes` cannot fail, so a failure is latched in `failed`
/// and the buffer is filled with non-zero bytes to let padding terminate.
struct ProviderRng<'a> {
    random: &'a dyn SecureRandom,
    failed: bool,
}

impl RngCore for ProviderRng<'_> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if self.random.fill(dest).is_err() {
            self.failed = true;
            dest.fill(0x01);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for ProviderRng<'_> {}
