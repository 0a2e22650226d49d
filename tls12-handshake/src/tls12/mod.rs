use core::fmt;

use zeroize::Zeroize;

use crate::crypto::hash;
use crate::crypto::tls12::{Prf, PrfSecret};
use crate::crypto::CryptoProvider;
use crate::error::Error;
use crate::suites::SupportedCipherSuite;

/// Length of the verify_data in a TLS1.2 `Finished` message.
pub(crate) const VERIFY_DATA_LEN: usize = 12;

/// Length of a TLS1.2 premaster secret for RSA key exchange, and of every
/// master secret.
pub(crate) const SECRET_LEN: usize = 48;

/// The two nonces of one negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionRandoms {
    /// Sent by us in the `ClientHello`.
    pub client: [u8; 32],
    /// Copied from the server's `ServerHello`.
    pub server: [u8; 32],
}

impl ConnectionRandoms {
    pub(crate) fn for_client(provider: &CryptoProvider) -> Result<Self, Error> {
        let mut ret = Self {
            client: [0u8; 32],
            server: [0u8; 32],
        };

        provider.fill_random(&mut ret.client)?;
        Ok(ret)
    }
}

/// TLS1.2 per-connection keying material
pub(crate) struct ConnectionSecrets {
    randoms: ConnectionRandoms,
    suite: &'static SupportedCipherSuite,
    master_secret: [u8; SECRET_LEN],
    prf_secret: Box<dyn PrfSecret>,
}

impl ConnectionSecrets {
    /// `master_secret = PRF(pre_master_secret, "master secret", client_random + server_random)`
    pub(crate) fn from_premaster(
        prf: &dyn Prf,
        premaster: &[u8; SECRET_LEN],
        randoms: ConnectionRandoms,
        suite: &'static SupportedCipherSuite,
    ) -> Result<Self, Error> {
        let mut master_secret = [0u8; SECRET_LEN];
        let seed = join_randoms(&randoms.client, &randoms.server);
        prf.new_secret(premaster)?
            .prf(&mut master_secret, b"master secret", &seed);

        let prf_secret = prf.new_secret(&master_secret)?;
        Ok(Self {
            randoms,
            suite,
            master_secret,
            prf_secret,
        })
    }

    #[cfg(test)]
    pub(crate) fn suite(&self) -> &'static SupportedCipherSuite {
        self.suite
    }

    #[cfg(test)]
    pub(crate) fn randoms(&self) -> &ConnectionRandoms {
        &self.randoms
    }

    #[cfg(test)]
    pub(crate) fn master_secret(&self) -> &[u8; SECRET_LEN] {
        &self.master_secret
    }

    fn make_verify_data(
        &self,
        handshake_hash: &hash::Output,
        label: &[u8],
    ) -> [u8; VERIFY_DATA_LEN] {
        let mut out = [0u8; VERIFY_DATA_LEN];
        self.prf_secret
            .prf(&mut out, label, handshake_hash.as_ref());
        out
    }

    pub(crate) fn client_verify_data(
        &self,
        handshake_hash: &hash::Output,
    ) -> [u8; VERIFY_DATA_LEN] {
        self.make_verify_data(handshake_hash, b"client finished")
    }

    pub(crate) fn server_verify_data(
        &self,
        handshake_hash: &hash::Output,
    ) -> [u8; VERIFY_DATA_LEN] {
        self.make_verify_data(handshake_hash, b"server finished")
    }

    /// The key block the record layer slices into MAC keys, keys and IVs.
    pub(crate) fn make_key_block(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.suite.key_block_len()];

        // NOTE: opposite order to the master secret derivation.
        let randoms = join_randoms(&self.randoms.server, &self.randoms.client);
        self.prf_secret
            .prf(&mut out, b"key expansion", &randoms);

        out
    }
}

impl Drop for ConnectionSecrets {
    fn drop(&mut self) {
        self.master_secret.zeroize();
    }
}

impl fmt::Debug for ConnectionSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSecrets")
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

fn join_randoms(first: &[u8; 32], second: &[u8; 32]) -> [u8; 64] {
    let mut randoms = [0u8; 64];
    randoms[..32].copy_from_slice(first);
    randoms[32..].copy_from_slice(second);
    randoms
}
