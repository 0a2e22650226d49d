use super::hmac;
use crate::error::Error;

/// Implements [`Prf`] using a [`hmac::Hmac`].
pub struct PrfUsingHmac<'a>(pub &'a dyn hmac::Hmac);

impl Prf for PrfUsingHmac<'_> {
    fn new_secret(&self, secret: &[u8]) -> Result<Box<dyn PrfSecret>, Error> {
        Ok(Box::new(PrfSecretUsingHmac(self.0.with_key(secret)?)))
    }
}

struct PrfSecretUsingHmac(Box<dyn hmac::Key>);

impl PrfSecret for PrfSecretUsingHmac {
    fn prf(&self, output: &mut [u8], label: &[u8], seed: &[u8]) {
        prf(output, &*self.0, label, seed)
    }
}

/// An instantiation of the TLS1.2 PRF with a specific, implicit hash function.
///
/// See the definition in [RFC5246 section 5](https://www.rfc-editor.org/rfc/rfc5246#section-5).
///
/// See [`PrfUsingHmac`] as a route to implementing this trait with just
/// an implementation of [`hmac::Hmac`].
pub trait Prf: Send + Sync {
    /// Returns an object that can compute `PRF(secret, label, seed)` with
    /// the same `secret`.
    ///
    /// This is used once with the premaster secret, and then with the
    /// master secret for every later derivation.
    fn new_secret(&self, secret: &[u8]) -> Result<Box<dyn PrfSecret>, Error>;
}

/// An instantiation of the TLS1.2 PRF with a fixed hash function and secret.
pub trait PrfSecret: Send + Sync {
    /// Computes `PRF(secret, label, seed)`, writing the result into `output`.
    ///
    /// `secret` is implicit in this object; see [`Prf::new_secret`].
    fn prf(&self, output: &mut [u8], label: &[u8], seed: &[u8]);
}

/// `P_hash` expanded over `label + seed`, filling `out`.
#[doc(hidden)]
pub fn prf(out: &mut [u8], hmac_key: &dyn hmac::Key, label: &[u8], seed: &[u8]) {
    // A(1)
    let mut current_a = hmac_key.sign(&[label, seed]);

    let chunk_size = hmac_key.tag_len();
    for chunk in out.chunks_mut(chunk_size) {
        // P_hash[i] = HMAC_hash(secret, A(i) + seed)
        let p_term = hmac_key.sign(&[current_a.as_ref(), label, seed]);
        chunk.copy_from_slice(&p_term.as_ref()[..chunk.len()]);

        // A(i+1) = HMAC_hash(secret, A(i))
        current_a = hmac_key.sign(&[current_a.as_ref()]);
    }
}

#[cfg(all(test, feature = "rust_crypto"))]
mod tests {
    use super::{Prf, PrfUsingHmac};
    use crate::crypto::hmac::Hmac;
    use crate::crypto::rust_crypto::hmac::HMAC_SHA256;

    const SECRET: &[u8] = b"\x9b\xbe\x43\x6b\xa9\x40\xf0\x17\xb1\x76\x52\x84\x9a\x71\xdb\x35";
    const SEED: &[u8] = b"\xa0\xba\x9f\x93\x6c\xda\x31\x18\x27\xa6\xf7\x96\xff\xd5\x19\x8c";

    #[test]
    fn check_sha256() {
        let expect = include_bytes!("../../testdata/prf-result.1.bin");
        let mut output = [0u8; 100];

        super::prf(
            &mut output,
            HMAC_SHA256
                .with_key(SECRET)
                .unwrap()
                .as_ref(),
            b"test label",
            SEED,
        );
        assert_eq!(expect.len(), output.len());
        assert_eq!(expect.to_vec(), output.to_vec());
    }

    #[test]
    fn prf_secret_matches_free_function() {
        let expect = include_bytes!("../../testdata/prf-result.1.bin");
        let secret = PrfUsingHmac(&HMAC_SHA256)
            .new_secret(SECRET)
            .unwrap();

        // Any prefix of the output stream is itself a valid output.
        let mut short = [0u8; 12];
        secret.prf(&mut short, b"test label", SEED);
        assert_eq!(&short[..], &expect[..12]);
    }
}
