use sha2::Digest;

use crate::crypto::hash;

/// SHA-256, the transcript hash of every TLS1.2 suite we support.
pub static SHA256: Sha256 = Sha256;

/// SHA-256 via the `sha2` crate.
#[derive(Debug)]
pub struct Sha256;

impl hash::Hash for Sha256 {
    fn start(&self) -> Box<dyn hash::Context> {
        Box::new(Sha256Context(sha2::Sha256::new()))
    }

    fn hash(&self, data: &[u8]) -> hash::Output {
        hash::Output::new(&sha2::Sha256::digest(data)[..])
    }

    fn algorithm(&self) -> hash::HashAlgorithm {
        hash::HashAlgorithm::SHA256
    }
}

struct Sha256Context(sha2::Sha256);

impl hash::Context for Sha256Context {
    fn fork_finish(&self) -> hash::Output {
        hash::Output::new(&self.0.clone().finalize()[..])
    }

    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }
}

#[cfg(test)]
mod tests {
    use super::SHA256;
    use crate::crypto::hash::Hash;

    #[test]
    fn running_hash_matches_one_shot() {
        let mut ctx = SHA256.start();
        ctx.update(b"hello ");
        assert_eq!(ctx.fork_finish().as_ref(), SHA256.hash(b"hello ").as_ref());
        ctx.update(b"world");
        assert_eq!(
            ctx.fork_finish().as_ref(),
            SHA256.hash(b"hello world").as_ref()
        );
        assert_eq!(SHA256.hash(b"").as_ref().len(), 32);
        assert_eq!(SHA256.hash(b"").as_ref()[..4], [0xe3, 0xb0, 0xc4, 0x42]);
    }
}
