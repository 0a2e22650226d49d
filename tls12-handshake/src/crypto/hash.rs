//! The hash behind the handshake transcript.

pub use crate::msgs::enums::HashAlgorithm;

/// A hash function, as far as the transcript needs one.
pub trait Hash: Send + Sync {
    /// A fresh running hash.
    fn start(&self) -> Box<dyn Context>;

    /// One-shot `data` digest.
    fn hash(&self, data: &[u8]) -> Output;

    /// Which hash this is, as shown in the connection's `Debug` output.
    fn algorithm(&self) -> HashAlgorithm;
}

/// A running hash over the handshake messages seen so far.
pub trait Context: Send + Sync {
    /// Absorb `data`.
    fn update(&mut self, data: &[u8]);

    /// The digest of everything absorbed so far.  The context stays usable:
    /// Finished messages are computed mid-transcript.
    fn fork_finish(&self) -> Output;
}

/// A digest small enough to keep inline.
#[derive(Clone)]
pub struct Output {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Output {
    /// Up to SHA-384.
    pub const MAX_LEN: usize = 48;

    /// Copy `bytes`, which must be at most [`Output::MAX_LEN`] long.
    pub fn new(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= Self::MAX_LEN);
        let used = bytes.len().min(Self::MAX_LEN);
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..used].copy_from_slice(&bytes[..used]);
        Self { buf, used }
    }
}

impl AsRef<[u8]> for Output {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}
