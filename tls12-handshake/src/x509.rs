use core::fmt;

use pki_types::CertificateDer;
use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::public_key::PublicKey;

/// The big-endian modulus and public exponent of an RSA key.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPublicKeyParts {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
}

impl RsaPublicKeyParts {
    /// Build from big-endian integers; leading zero bytes are dropped.
    pub fn new(modulus: &[u8], exponent: &[u8]) -> Self {
        Self {
            modulus: strip_leading_zeroes(modulus).to_vec(),
            exponent: strip_leading_zeroes(exponent).to_vec(),
        }
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    /// The public exponent `e`.
    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }
}

impl fmt::Debug for RsaPublicKeyParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPublicKeyParts")
            .field("bits", &(self.modulus.len() * 8))
            .finish()
    }
}

fn strip_leading_zeroes(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// The key found in a server's certificate.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerPublicKey {
    /// An RSA key, usable for RSA key exchange.
    Rsa(RsaPublicKeyParts),

    /// Any other kind of key.  The certificate is structurally fine, but the
    /// key cannot encrypt a premaster secret.
    Unsupported,
}

/// One structurally valid certificate from the server's chain.
///
/// Nothing here implies the certificate is trusted: path building and
/// validation policy belong to the caller.
#[derive(Clone, Debug)]
pub struct ServerCertificate {
    der: CertificateDer<'static>,
    subject: String,
    public_key: ServerPublicKey,
}

impl ServerCertificate {
    /// Parse a DER encoded X.509 certificate.
    ///
    /// Returns `None` if `der` is not exactly one well-formed certificate.
    pub fn parse(der: CertificateDer<'static>) -> Option<Self> {
        let (subject, public_key) = {
            let (rest, cert) = X509Certificate::from_der(der.as_ref()).ok()?;
            if !rest.is_empty() {
                return None;
            }

            let public_key = match cert.public_key().parsed() {
                Ok(PublicKey::RSA(rsa)) => {
                    ServerPublicKey::Rsa(RsaPublicKeyParts::new(rsa.modulus, rsa.exponent))
                }
                _ => ServerPublicKey::Unsupported,
            };
            (cert.subject().to_string(), public_key)
        };

        Some(Self {
            der,
            subject,
            public_key,
        })
    }

    /// The certificate exactly as received.
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    /// The subject name, in RFC4514 string form.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The certificate's public key.
    pub fn public_key(&self) -> &ServerPublicKey {
        &self.public_key
    }

    /// The RSA key, if this certificate has one.
    pub fn rsa_public_key(&self) -> Option<&RsaPublicKeyParts> {
        match &self.public_key {
            ServerPublicKey::Rsa(parts) => Some(parts),
            ServerPublicKey::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(bytes: &[u8]) -> CertificateDer<'static> {
        CertificateDer::from(bytes.to_vec())
    }

    #[test]
    fn parses_rsa_certificate() {
        let cert = ServerCertificate::parse(load(include_bytes!("../testdata/rsa.cert.der")))
            .unwrap();
        assert!(cert.subject().contains("testserver.com"));
        let key = cert.rsa_public_key().unwrap();
        assert_eq!(key.modulus().len(), 128);
        assert_eq!(key.exponent(), &[0x01, 0x00, 0x01]);
        assert_eq!(format!("{key:?}"), "RsaPublicKeyParts { bits: 1024 }");
    }

    #[test]
    fn ec_certificate_is_unsupported() {
        let cert =
            ServerCertificate::parse(load(include_bytes!("../testdata/ec.cert.der"))).unwrap();
        assert_eq!(cert.public_key(), &ServerPublicKey::Unsupported);
        assert!(cert.rsa_public_key().is_none());
    }

    #[test]
    fn rejects_garbage_and_trailing_data() {
        assert!(ServerCertificate::parse(load(b"not a certificate")).is_none());

        let mut der = include_bytes!("../testdata/rsa.cert.der").to_vec();
        der.push(0);
        assert!(ServerCertificate::parse(load(&der)).is_none());
    }

    #[test]
    fn leading_zeroes_are_stripped() {
        let parts = RsaPublicKeyParts::new(&[0, 0, 0xc1, 0x02], &[0, 3]);
        assert_eq!(parts.modulus(), &[0xc1, 0x02]);
        assert_eq!(parts.exponent(), &[3]);
    }
}
