use core::fmt::Debug;

use crate::error::Error;
pub use crate::x509::RsaPublicKeyParts;

/// Hashing interfaces.
pub mod hash;

/// HMAC interfaces.
pub mod hmac;

/// The TLS1.2 pseudo-random function.
pub mod tls12;

/// A provider built on the RustCrypto crates.
#[cfg(feature = "rust_crypto")]
pub mod rust_crypto;

/// Every cryptographic operation the handshake needs, supplied from outside.
///
/// All fields are `'static` trait objects: providers are normally unit structs
/// living in statics.
pub struct CryptoProvider {
    /// Source of client randoms and the premaster secret.
    pub secure_random: &'static dyn SecureRandom,

    /// The transcript hash.  TLS1.2 suites here all use SHA-256.
    pub hash: &'static dyn hash::Hash,

    /// The TLS1.2 PRF matching `hash`.
    pub prf: &'static dyn tls12::Prf,

    /// RSA encryption of the premaster secret.
    pub rsa: &'static dyn RsaKeyExchange,
}

impl CryptoProvider {
    /// Fill `bytes` from [`CryptoProvider::secure_random`].
    pub(crate) fn fill_random(&self, bytes: &mut [u8]) -> Result<(), Error> {
        Ok(self.secure_random.fill(bytes)?)
    }
}

impl Debug for CryptoProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("secure_random", &self.secure_random)
            .field("hash", &self.hash.algorithm())
            .field("rsa", &self.rsa)
            .finish_non_exhaustive()
    }
}

/// A source of cryptographically secure randomness.
pub trait SecureRandom: Send + Sync + Debug {
    /// Fill the given buffer with random bytes.
    ///
    /// The bytes must be sourced from a cryptographically secure random number
    /// generator seeded with good quality, secret entropy.
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed>;
}

/// Random material generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRandomFailed;

/// RSAES-PKCS1-v1_5 encryption, used to send the premaster secret.
pub trait RsaKeyExchange: Send + Sync + Debug {
    /// Encrypt `data` under the server's public key, drawing padding from `random`.
    ///
    /// A key that cannot be used for encryption is
    /// [`Error::UnsupportedCertificate`].
    fn encrypt_pkcs1(
        &self,
        key: &RsaPublicKeyParts,
        data: &[u8],
        random: &dyn SecureRandom,
    ) -> Result<Vec<u8>, Error>;
}
