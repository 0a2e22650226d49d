//! # tls12-handshake - the client side of a TLS 1.2 handshake
//!
//! This crate implements the part of a TLS 1.2 client that sits directly above
//! the record layer: it consumes handshake message bytes, validates and interprets
//! each message, drives the connection through negotiation to the `Established`
//! state, and decides what the client sends back at each step.
//!
//! ## Current features
//!
//! * TLS1.2 with RSA key exchange.
//! * AES-CBC and AES-GCM cipher suites using the SHA-256 PRF.
//! * ALPN support.
//! * SNI support.
//! * Client authentication by clients (certificate only).
//! * Client-initiated renegotiation.
//!
//! ## Non-features
//!
//! * TLS1.3.
//! * DTLS.
//! * The server side of the handshake.
//! * Record protection; encryption and MACs are the record layer's job.
//! * Certificate path building and validation policy.
//!
//! ## Design Overview
//! ### This crate does not take care of network IO
//! The caller owns the record layer.  It hands demultiplexed handshake bytes to
//! [`ClientConnection::read_handshake()`], and receives everything the client
//! wants to send through a [`PacketWriter`]:
//!
//! ```text
//!     handshake bytes     +-----------------------+     OutboundMessage
//!   -------------------->  |   ClientConnection    +-------------------->
//!   read_handshake()      +-----------------------+     PacketWriter
//! ```
//!
//! `read_handshake()` returns how many bytes it consumed.  A short count means
//! the buffer ends in an incomplete message: keep the remainder, append more
//! bytes, and call again.
//!
//! ### Cryptography is injected
//! Randomness, the transcript hash, the PRF and RSA encryption all come from a
//! [`crypto::CryptoProvider`].  With the default `rust_crypto` feature,
//! [`crypto::rust_crypto::default_provider()`] supplies implementations built on
//! the RustCrypto crates.
//!
//! ## Getting started
//!
//! ```rust,no_run
//! # #[cfg(feature = "rust_crypto")] {
//! use std::sync::Arc;
//! use tls12_handshake::{ClientConfig, ClientConnection, NoEvents, OutboundMessage};
//!
//! let mut config = ClientConfig::new(tls12_handshake::crypto::rust_crypto::default_provider());
//! config.server_name = Some("example.com".into());
//! config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
//!
//! let mut conn = ClientConnection::new(Arc::new(config), None, Box::new(NoEvents)).unwrap();
//! let mut outgoing: Vec<OutboundMessage> = Vec::new();
//! conn.start(&mut outgoing).unwrap();
//!
//! // ... send `outgoing` via the record layer, then feed received handshake
//! // bytes back in:
//! let received: &[u8] = &[];
//! let used = conn.read_handshake(received, &mut outgoing).unwrap();
//! # let _ = used; }
//! ```
//!
//! ## Crate features
//!
//! - `logging`: this makes the crate depend on the `log` crate.
//!   The crate outputs interesting protocol-level messages at `trace!` and `debug!`
//!   level, and protocol-level errors at `warn!` and `error!` level.  The log
//!   messages do not contain secret key data, and so are safe to archive without
//!   affecting session security.  This feature is in the default set.
//!
//! - `rust_crypto`: provides [`crypto::rust_crypto`], a [`crypto::CryptoProvider`]
//!   built on `sha2`, `hmac`, `rsa` and `rand_core`.  This feature is in the
//!   default set.

#![forbid(unsafe_code)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::use_self,
    missing_docs,
    trivial_casts,
    unreachable_pub,
    unused_import_braces,
    unused_extern_crates,
    unused_qualifications
)]

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
#[macro_use]
mod log {
    macro_rules! trace    ( ($($tt:tt)*) => {{}} );
    macro_rules! debug    ( ($($tt:tt)*) => {{}} );
    macro_rules! warn     ( ($($tt:tt)*) => {{}} );
    macro_rules! error    ( ($($tt:tt)*) => {{}} );
}

#[macro_use]
mod msgs;
mod client;
/// Crypto provider interface and the default `rust_crypto` implementation.
pub mod crypto;
mod enums;
mod error;
mod hash_hs;
mod suites;
mod tls12;
mod x509;

/// Internal classes that are used in integration tests.
/// The contents of this section DO NOT form part of the stable interface.
#[doc(hidden)]
pub mod internal {
    /// Low-level TLS message parsing and encoding functions.
    pub mod msgs {
        pub use crate::msgs::{codec, enums, handshake};
    }
}

pub use crate::client::{
    ClientConfig, ClientConnection, ClientVerification, ConnectionStatus, HandshakeEvents,
    HandshakeTimer, NoEvents,
};
pub use crate::enums::{
    AlertDescription, CipherSuite, ContentType, HandshakeType, ProtocolVersion, SignatureScheme,
};
pub use crate::error::{Error, InvalidMessage};
pub use crate::msgs::enums::{AlertLevel, ExtensionType};
pub use crate::msgs::message::{OutboundMessage, PacketWriter};
pub use crate::suites::{
    BulkAlgorithm, SupportedCipherSuite, ALL_CIPHER_SUITES, DEFAULT_CIPHER_SUITES,
    TLS_RSA_WITH_AES_128_CBC_SHA, TLS_RSA_WITH_AES_128_CBC_SHA256,
    TLS_RSA_WITH_AES_128_GCM_SHA256, TLS_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_256_CBC_SHA256,
};
pub use crate::tls12::ConnectionRandoms;
pub use crate::x509::{RsaPublicKeyParts, ServerCertificate, ServerPublicKey};

/// Re-export of the `pki-types` crate, for certificate types used in the API.
pub use pki_types;
