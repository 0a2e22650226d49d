use ::hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::hmac::{self, Tag};
use crate::error::Error;

/// HMAC-SHA256 via the `hmac` and `sha2` crates.
pub static HMAC_SHA256: Sha256Hmac = Sha256Hmac;

/// See [`HMAC_SHA256`].
#[derive(Debug)]
pub struct Sha256Hmac;

impl hmac::Hmac for Sha256Hmac {
    fn with_key(&self, key: &[u8]) -> Result<Box<dyn hmac::Key>, Error> {
        // HMAC accepts keys of any length, so this only fails on a broken backend.
        let mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
            .map_err(|_| Error::General("HMAC key rejected".into()))?;
        Ok(Box::new(Sha256HmacKey(mac)))
    }

    fn hash_output_len(&self) -> usize {
        32
    }
}

struct Sha256HmacKey(Hmac<Sha256>);

impl hmac::Key for Sha256HmacKey {
    fn sign(&self, data: &[&[u8]]) -> Tag {
        let mut mac = self.0.clone();
        for d in data {
            mac.update(d);
        }
        Tag::new(&mac.finalize().into_bytes()[..])
    }

    fn tag_len(&self) -> usize {
        32
    }
}

#[cfg(test)]
mod tests {
    use super::HMAC_SHA256;
    use crate::crypto::hmac::Hmac;

    #[test]
    fn rfc4231_case_2() {
        let key = HMAC_SHA256.with_key(b"Jefe").unwrap();
        let tag = key.sign(&[b"what do ya want ", b"for nothing?"]);
        assert_eq!(tag.as_ref().len(), 32);
        assert_eq!(
            tag.as_ref()[..8],
            [0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e]
        );
    }
}
