use core::mem;

use crate::crypto::hash;

/// Early stage buffering of handshake payloads.
///
/// Before the `ServerHello` fixes the hash algorithm, the `ClientHello` and
/// anything else sent so far is just buffered.
pub(crate) struct HandshakeHashBuffer {
    buffer: Vec<u8>,
}

impl HandshakeHashBuffer {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Buffer an encoded handshake message.
    pub(crate) fn add_raw(&mut self, buf: &[u8]) {
        self.buffer.extend_from_slice(buf);
    }

    /// We now know what hash function the verify_data will use.
    pub(crate) fn start_hash(self, provider: &'static dyn hash::Hash) -> HandshakeHash {
        let mut ctx = provider.start();
        ctx.update(&self.buffer);
        HandshakeHash { provider, ctx }
    }
}

/// This deals with keeping a running hash of the handshake
/// payloads.
pub(crate) struct HandshakeHash {
    provider: &'static dyn hash::Hash,
    ctx: Box<dyn hash::Context>,
}

impl HandshakeHash {
    /// Hash an encoded handshake message.
    pub(crate) fn add_raw(&mut self, buf: &[u8]) -> &mut Self {
        self.ctx.update(buf);
        self
    }

    /// Get the current hash value.
    pub(crate) fn current_hash(&self) -> hash::Output {
        self.ctx.fork_finish()
    }

    /// The hashing algorithm
    pub(crate) fn algorithm(&self) -> hash::HashAlgorithm {
        self.provider.algorithm()
    }
}

/// The transcript of one negotiation, in whichever stage it has reached.
pub(crate) enum Transcript {
    Buffering(HandshakeHashBuffer),
    Hashing(HandshakeHash),
}

impl Transcript {
    pub(crate) fn new() -> Self {
        Self::Buffering(HandshakeHashBuffer::new())
    }

    /// Feed the exact bytes (header and body) of one handshake message.
    pub(crate) fn add_raw(&mut self, buf: &[u8]) {
        match self {
            Self::Buffering(buffer) => buffer.add_raw(buf),
            Self::Hashing(hash) => {
                hash.add_raw(buf);
            }
        }
    }

    /// Switch from buffering to hashing with `provider`.
    ///
    /// Does nothing if hashing already started.
    pub(crate) fn start_hash(&mut self, provider: &'static dyn hash::Hash) {
        if let Self::Buffering(buffer) = self {
            let buffer = mem::replace(buffer, HandshakeHashBuffer::new());
            *self = Self::Hashing(buffer.start_hash(provider));
        }
    }

    /// The hash over everything so far, once the algorithm is known.
    pub(crate) fn current_hash(&self) -> Option<hash::Output> {
        match self {
            Self::Buffering(_) => None,
            Self::Hashing(hash) => Some(hash.current_hash()),
        }
    }

    pub(crate) fn algorithm(&self) -> Option<hash::HashAlgorithm> {
        match self {
            Self::Buffering(_) => None,
            Self::Hashing(hash) => Some(hash.algorithm()),
        }
    }
}
