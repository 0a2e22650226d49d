use core::fmt;

use crate::enums::CipherSuite;

/// Bulk symmetric encryption scheme used by a cipher suite.
///
/// The record layer implements these; the handshake only needs their key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAlgorithm {
    /// AES with 128-bit keys in CBC mode.
    Aes128Cbc,

    /// AES with 256-bit keys in CBC mode.
    Aes256Cbc,

    /// AES with 128-bit keys in Galois counter mode.
    Aes128Gcm,
}

/// A TLS1.2 cipher suite with RSA key exchange, supported by this crate.
///
/// All of these use the SHA-256 based PRF and transcript hash.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SupportedCipherSuite {
    /// The TLS enumeration naming this cipher suite.
    pub suite: CipherSuite,

    /// How the record layer protects application data.
    pub bulk: BulkAlgorithm,

    /// Length of each direction's MAC key; zero for AEAD suites.
    pub mac_key_len: usize,

    /// Length of each direction's encryption key.
    pub enc_key_len: usize,

    /// Length of each direction's IV (CBC) or implicit nonce prefix (GCM).
    pub fixed_iv_len: usize,
}

impl SupportedCipherSuite {
    /// How many bytes of key block the record layer needs for this suite.
    pub fn key_block_len(&self) -> usize {
        (self.mac_key_len + self.enc_key_len + self.fixed_iv_len) * 2
    }
}

impl fmt::Debug for SupportedCipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.suite.fmt(f)
    }
}

/// The cipher suite configuration that a client offers is taken from
/// this list, and the server must choose one of them.
pub(crate) fn find_suite(
    offered: &[&'static SupportedCipherSuite],
    suite: CipherSuite,
) -> Option<&'static SupportedCipherSuite> {
    offered
        .iter()
        .find(|scs| scs.suite == suite)
        .copied()
}

/// The TLS1.2 ciphersuite TLS_RSA_WITH_AES_128_GCM_SHA256.
pub static TLS_RSA_WITH_AES_128_GCM_SHA256: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_128_GCM_SHA256,
    bulk: BulkAlgorithm::Aes128Gcm,
    mac_key_len: 0,
    enc_key_len: 16,
    fixed_iv_len: 4,
};

/// The TLS1.2 ciphersuite TLS_RSA_WITH_AES_128_CBC_SHA256.
pub static TLS_RSA_WITH_AES_128_CBC_SHA256: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA256,
    bulk: BulkAlgorithm::Aes128Cbc,
    mac_key_len: 32,
    enc_key_len: 16,
    fixed_iv_len: 16,
};

/// The TLS1.2 ciphersuite TLS_RSA_WITH_AES_256_CBC_SHA256.
pub static TLS_RSA_WITH_AES_256_CBC_SHA256: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA256,
    bulk: BulkAlgorithm::Aes256Cbc,
    mac_key_len: 32,
    enc_key_len: 32,
    fixed_iv_len: 16,
};

/// The TLS1.2 ciphersuite TLS_RSA_WITH_AES_128_CBC_SHA.
pub static TLS_RSA_WITH_AES_128_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
    bulk: BulkAlgorithm::Aes128Cbc,
    mac_key_len: 20,
    enc_key_len: 16,
    fixed_iv_len: 16,
};

/// The TLS1.2 ciphersuite TLS_RSA_WITH_AES_256_CBC_SHA.
pub static TLS_RSA_WITH_AES_256_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
    bulk: BulkAlgorithm::Aes256Cbc,
    mac_key_len: 20,
    enc_key_len: 32,
    fixed_iv_len: 16,
};

/// Every cipher suite this crate can negotiate, most preferred first.
pub static ALL_CIPHER_SUITES: &[&SupportedCipherSuite] = &[
    &TLS_RSA_WITH_AES_128_GCM_SHA256,
    &TLS_RSA_WITH_AES_128_CBC_SHA256,
    &TLS_RSA_WITH_AES_256_CBC_SHA256,
    &TLS_RSA_WITH_AES_128_CBC_SHA,
    &TLS_RSA_WITH_AES_256_CBC_SHA,
];

/// The cipher suites offered by default.  This is all of them.
pub static DEFAULT_CIPHER_SUITES: &[&SupportedCipherSuite] = ALL_CIPHER_SUITES;
