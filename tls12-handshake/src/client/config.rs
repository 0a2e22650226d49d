use std::sync::Arc;

use pki_types::CertificateDer;

use crate::crypto::CryptoProvider;
use crate::enums::{ProtocolVersion, SignatureScheme};
use crate::suites::{SupportedCipherSuite, DEFAULT_CIPHER_SUITES};

/// Common configuration for (typically) all connections made by a program.
///
/// Making one of these is cheap.  Share it between connections as an
/// `Arc<ClientConfig>`.
///
/// # Defaults
///
/// * [`ClientConfig::cipher_suites`]: [`DEFAULT_CIPHER_SUITES`].
/// * [`ClientConfig::version`]: TLS1.2.
/// * [`ClientConfig::alpn_protocols`]: the default is empty -- no ALPN protocol is negotiated.
/// * [`ClientConfig::server_name`]: `None`, so no SNI is sent.
/// * [`ClientConfig::client_auth_cert_chain`]: empty.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Source of cryptographic operations.
    pub provider: Arc<CryptoProvider>,

    /// List of ciphersuites, in preference order.  The server must pick
    /// one of these.
    pub cipher_suites: Vec<&'static SupportedCipherSuite>,

    /// The protocol version we advertise.  This is the only version a server
    /// may select, and it is written into the premaster secret.
    pub version: ProtocolVersion,

    /// Which ALPN protocols we include in our client hello.
    /// If empty, no ALPN extension is sent.
    pub alpn_protocols: Vec<Vec<u8>>,

    /// The DNS name of the server, sent as SNI.
    pub server_name: Option<String>,

    /// Whether to send the Server Name Indication (SNI) extension
    /// during the client handshake.
    ///
    /// The default is true.
    pub enable_sni: bool,

    /// The certificate chain sent if the server asks for one.
    ///
    /// Only the certificate is ever sent: this crate does not produce a
    /// `CertificateVerify`.  An empty chain sends an empty `Certificate`.
    pub client_auth_cert_chain: Vec<CertificateDer<'static>>,

    /// Signature schemes advertised in the `signature_algorithms` extension.
    pub signature_schemes: Vec<SignatureScheme>,
}

impl ClientConfig {
    /// Make a configuration with the defaults listed above.
    pub fn new(provider: Arc<CryptoProvider>) -> Self {
        Self {
            provider,
            cipher_suites: DEFAULT_CIPHER_SUITES.to_vec(),
            version: ProtocolVersion::TLSv1_2,
            alpn_protocols: Vec::new(),
            server_name: None,
            enable_sni: true,
            client_auth_cert_chain: Vec::new(),
            signature_schemes: vec![
                SignatureScheme::RSA_PKCS1_SHA256,
                SignatureScheme::RSA_PKCS1_SHA384,
                SignatureScheme::RSA_PKCS1_SHA512,
                SignatureScheme::RSA_PSS_SHA256,
                SignatureScheme::RSA_PKCS1_SHA1,
            ],
        }
    }

    /// The server name to send, if SNI is enabled and a name is set.
    pub(crate) fn sni(&self) -> Option<&str> {
        match self.enable_sni {
            true => self.server_name.as_deref(),
            false => None,
        }
    }
}
