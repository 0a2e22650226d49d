#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use tls12_handshake::crypto::hash::Hash;
use tls12_handshake::crypto::hmac::Hmac;
use tls12_handshake::crypto::rust_crypto::hash::SHA256;
use tls12_handshake::crypto::rust_crypto::hmac::HMAC_SHA256;
use tls12_handshake::crypto::rust_crypto::default_provider;
use tls12_handshake::crypto::{tls12, CryptoProvider, GetRandomFailed, SecureRandom};
use tls12_handshake::internal::msgs::codec::{Codec, Reader};
use tls12_handshake::internal::msgs::enums::{
    ClientCertificateType, Compression, ExtensionType,
};
use tls12_handshake::internal::msgs::handshake::{
    CertificatePayload, CertificateRequestPayload, ClientHelloPayload, HandshakeMessagePayload,
    PayloadU16, PayloadU8, Random, ServerExtension, ServerHelloPayload, SessionId,
};
use tls12_handshake::pki_types::CertificateDer;
use tls12_handshake::{
    CipherSuite, ClientConfig, ClientConnection, ContentType, HandshakeEvents, HandshakeTimer,
    HandshakeType, OutboundMessage, ProtocolVersion, SignatureScheme,
};

pub const RSA_CERT: &[u8] = include_bytes!("../../testdata/rsa.cert.der");
pub const RSA_KEY: &[u8] = include_bytes!("../../testdata/rsa.key.pkcs8.der");
pub const EC_CERT: &[u8] = include_bytes!("../../testdata/ec.cert.der");

pub const SERVER_RANDOM: [u8; 32] = [0x5e; 32];
pub const SESSION_ID: [u8; 8] = [0xd1; 8];

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}

/// Randomness that is always `0x5a` bytes.
#[derive(Debug)]
pub struct FixedRandom;

impl SecureRandom for FixedRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        buf.fill(0x5a);
        Ok(())
    }
}

#[derive(Debug)]
pub struct BrokenRandom;

impl SecureRandom for BrokenRandom {
    fn fill(&self, _buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        Err(GetRandomFailed)
    }
}

/// The default provider, with its randomness replaced.
pub fn provider_with_random(random: &'static dyn SecureRandom) -> Arc<CryptoProvider> {
    let base = default_provider();
    Arc::new(CryptoProvider {
        secure_random: random,
        hash: base.hash,
        prf: base.prf,
        rsa: base.rsa,
    })
}

pub fn make_config() -> ClientConfig {
    let mut config = ClientConfig::new(default_provider());
    config.server_name = Some("testserver.com".into());
    config
}

#[derive(Clone, Default)]
pub struct EventLog {
    pub ready: Rc<Cell<usize>>,
    pub certificate_requested: Rc<Cell<usize>>,
}

impl HandshakeEvents for EventLog {
    fn ready_to_write(&mut self) {
        self.ready.set(self.ready.get() + 1);
    }

    fn certificate_requested(&mut self) {
        self.certificate_requested
            .set(self.certificate_requested.get() + 1);
    }
}

pub struct CountingTimer(pub Rc<Cell<usize>>);

impl HandshakeTimer for CountingTimer {
    fn cancel(self: Box<Self>) {
        self.0.set(self.0.get() + 1);
    }
}

pub fn handshake_message(typ: HandshakeType, payload: &impl Codec) -> Vec<u8> {
    HandshakeMessagePayload::from_codec(typ, payload).get_encoding()
}

pub fn server_hello_payload(suite: CipherSuite) -> ServerHelloPayload {
    ServerHelloPayload {
        server_version: ProtocolVersion::TLSv1_2,
        random: Random(SERVER_RANDOM),
        session_id: SessionId::new(&SESSION_ID),
        cipher_suite: suite,
        compression_method: Compression::Null,
        extensions: None,
    }
}

pub fn server_hello(suite: CipherSuite) -> Vec<u8> {
    handshake_message(HandshakeType::ServerHello, &server_hello_payload(suite))
}

pub fn server_hello_with(suite: CipherSuite, extensions: Vec<ServerExtension>) -> Vec<u8> {
    let mut hello = server_hello_payload(suite);
    hello.extensions = Some(extensions);
    handshake_message(HandshakeType::ServerHello, &hello)
}

pub fn alpn_extension(protocols: &[&[u8]]) -> ServerExtension {
    let list = protocols
        .iter()
        .map(|p| PayloadU8::new(p.to_vec()))
        .collect::<Vec<_>>();
    let mut body = Vec::new();
    let len: usize = list.iter().map(|p| 1 + p.0.len()).sum();
    (len as u16).encode(&mut body);
    for p in &list {
        p.encode(&mut body);
    }
    ServerExtension {
        typ: ExtensionType::ALProtocolNegotiation,
        payload: body,
    }
}

pub fn server_name_extension(name: &str) -> ServerExtension {
    let mut body = Vec::new();
    ((name.len() + 3) as u16).encode(&mut body);
    0u8.encode(&mut body);
    PayloadU16::new(name.as_bytes().to_vec()).encode(&mut body);
    ServerExtension {
        typ: ExtensionType::ServerName,
        payload: body,
    }
}

pub fn certificate(chain: &[&[u8]]) -> Vec<u8> {
    let chain = CertificatePayload(
        chain
            .iter()
            .map(|der| CertificateDer::from(der.to_vec()))
            .collect(),
    );
    handshake_message(HandshakeType::Certificate, &chain)
}

pub fn certificate_request() -> Vec<u8> {
    handshake_message(
        HandshakeType::CertificateRequest,
        &CertificateRequestPayload {
            certtypes: vec![ClientCertificateType::RSASign],
            sigschemes: vec![
                SignatureScheme::RSA_PKCS1_SHA256,
                SignatureScheme::RSA_PKCS1_SHA1,
            ],
            canames: Vec::new(),
        },
    )
}

pub fn bare(typ: HandshakeType, body: &[u8]) -> Vec<u8> {
    HandshakeMessagePayload::new(typ, body).get_encoding()
}

pub fn server_hello_done() -> Vec<u8> {
    bare(HandshakeType::ServerHelloDone, &[])
}

pub fn hello_request() -> Vec<u8> {
    bare(HandshakeType::HelloRequest, &[])
}

pub fn finished(verify_data: &[u8]) -> Vec<u8> {
    bare(HandshakeType::Finished, verify_data)
}

/// ServerHello, Certificate and ServerHelloDone, back to back.
pub fn server_flight(suite: CipherSuite) -> Vec<u8> {
    let mut flight = server_hello(suite);
    flight.extend(certificate(&[RSA_CERT]));
    flight.extend(server_hello_done());
    flight
}

pub fn handshake_type(msg: &OutboundMessage) -> Option<HandshakeType> {
    match msg.typ {
        ContentType::Handshake => Some(HandshakeType::from(msg.payload[0])),
        _ => None,
    }
}

pub fn parse_client_hello(msg: &OutboundMessage) -> ClientHelloPayload {
    assert_eq!(handshake_type(msg), Some(HandshakeType::ClientHello));
    ClientHelloPayload::read_bytes(&msg.payload[4..]).unwrap()
}

pub fn prf(secret: &[u8], label: &[u8], seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let key = HMAC_SHA256.with_key(secret).unwrap();
    tls12::prf(&mut out, key.as_ref(), label, seed);
    out
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    SHA256.hash(data).as_ref().to_vec()
}

/// Plays the server side of key agreement with the test RSA key.
pub struct TestServer {
    key: RsaPrivateKey,
}

impl TestServer {
    pub fn new() -> Self {
        Self {
            key: RsaPrivateKey::from_pkcs8_der(RSA_KEY).unwrap(),
        }
    }

    /// Recover the premaster secret from a `ClientKeyExchange` record.
    pub fn premaster_secret(&self, cke: &OutboundMessage) -> Vec<u8> {
        assert_eq!(handshake_type(cke), Some(HandshakeType::ClientKeyExchange));
        let mut r = Reader::init(&cke.payload[4..]);
        let encrypted = PayloadU16::read(&mut r).unwrap();
        assert!(!r.any_left());
        self.key
            .decrypt(Pkcs1v15Encrypt, &encrypted.0)
            .unwrap()
    }

    pub fn master_secret(&self, cke: &OutboundMessage, conn: &ClientConnection) -> Vec<u8> {
        let randoms = conn.randoms();
        let mut seed = randoms.client.to_vec();
        seed.extend_from_slice(&randoms.server);
        prf(&self.premaster_secret(cke), b"master secret", &seed, 48)
    }

    /// Our `Finished`, given the transcript hash up to and including the client's.
    pub fn finished(&self, master_secret: &[u8], transcript_hash: &[u8]) -> Vec<u8> {
        finished(&prf(master_secret, b"server finished", transcript_hash, 12))
    }
}

/// Bytes of every handshake message in `sent`, in order.
pub fn sent_handshake_bytes(sent: &[OutboundMessage]) -> Vec<u8> {
    sent.iter()
        .filter(|msg| msg.typ == ContentType::Handshake)
        .flat_map(|msg| msg.payload.iter().copied())
        .collect()
}
