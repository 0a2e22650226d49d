use core::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use super::config::ClientConfig;
use super::hs::{self, WriteStage};
use super::state::{ClientVerification, ConnectionState, ConnectionStatus};
use crate::enums::{CipherSuite, ContentType, HandshakeType, ProtocolVersion, SignatureScheme};
use crate::error::Error;
use crate::msgs::alert::AlertMessagePayload;
use crate::msgs::ccs::ChangeCipherSpecPayload;
use crate::msgs::codec::{Codec, NeedMoreData};
use crate::msgs::enums::Compression;
use crate::msgs::handshake::{
    CertificatePayload, ClientExtension, ClientHelloPayload, HandshakeHeader,
    HandshakeMessagePayload, PayloadU16, PayloadU8, Random, SessionId,
};
use crate::msgs::message::{OutboundMessage, PacketWriter};
use crate::suites::SupportedCipherSuite;
use crate::tls12::{ConnectionRandoms, ConnectionSecrets, SECRET_LEN};
use crate::x509::ServerCertificate;

#[cfg(feature = "logging")]
use crate::log::{debug, error, trace, warn};

/// An externally owned handshake timeout.
///
/// The connection holds it until the handshake completes, then cancels it
/// exactly once.  If it fires first, aborting the connection is up to its owner.
pub trait HandshakeTimer {
    /// The handshake completed in time.
    fn cancel(self: Box<Self>);
}

/// Notifications from the handshake towards the application.
///
/// Both methods default to doing nothing.
pub trait HandshakeEvents {
    /// The connection reached [`ConnectionStatus::Established`]: application
    /// data may now be written.
    fn ready_to_write(&mut self) {}

    /// The server sent a `CertificateRequest`.
    ///
    /// [`ClientConfig::client_auth_cert_chain`] will be sent in reply.
    fn certificate_requested(&mut self) {}
}

/// A [`HandshakeEvents`] that ignores every notification.
#[derive(Debug)]
pub struct NoEvents;

impl HandshakeEvents for NoEvents {}

/// The client side of a TLS1.2 handshake.
///
/// This sits directly above the record layer: feed it the handshake bytes
/// the record layer received with [`ClientConnection::read_handshake()`],
/// and it hands what the client must send to a [`PacketWriter`].
pub struct ClientConnection {
    config: Arc<ClientConfig>,
    state: ConnectionState,
    events: Box<dyn HandshakeEvents>,
    /// Set by the first fatal error; every later call fails with it.
    critical: Option<Error>,
    hello_sent: bool,
    write_seq: u64,
}

impl ClientConnection {
    /// Make a new connection, drawing the client random from `config.provider`.
    ///
    /// Nothing is sent until [`ClientConnection::start()`].
    pub fn new(
        config: Arc<ClientConfig>,
        handshake_timeout: Option<Box<dyn HandshakeTimer>>,
        events: Box<dyn HandshakeEvents>,
    ) -> Result<Self, Error> {
        let randoms = ConnectionRandoms::for_client(&config.provider)?;
        Ok(Self {
            state: ConnectionState::new(randoms, handshake_timeout),
            config,
            events,
            critical: None,
            hello_sent: false,
            write_seq: 0,
        })
    }

    /// Send our `ClientHello`.
    pub fn start(&mut self, writer: &mut dyn PacketWriter) -> Result<(), Error> {
        self.check_critical()?;
        if self.hello_sent || self.state.status != ConnectionStatus::Disconnected {
            return Err(Error::General("handshake already started".into()));
        }

        self.emit_client_hello(writer);
        self.hello_sent = true;
        Ok(())
    }

    /// Start a fresh handshake over an established connection.
    ///
    /// Only allowed once the connection is [`ConnectionStatus::Established`].
    /// `handshake_timeout` replaces the timer cancelled by the first handshake.
    pub fn renegotiate(
        &mut self,
        handshake_timeout: Option<Box<dyn HandshakeTimer>>,
        writer: &mut dyn PacketWriter,
    ) -> Result<(), Error> {
        self.check_critical()?;
        if self.state.status != ConnectionStatus::Established {
            return Err(Error::General(
                "renegotiation requires an established connection".into(),
            ));
        }

        let mut client_random = [0u8; 32];
        self.config
            .provider
            .fill_random(&mut client_random)?;

        debug!("starting renegotiation");
        self.state
            .reset_for_renegotiation(client_random);
        self.state.handshake_timeout = handshake_timeout;
        self.emit_client_hello(writer);
        Ok(())
    }

    /// Process received handshake bytes, returning how many were used.
    ///
    /// `buf` may hold any number of whole messages, optionally followed by
    /// the start of another.  Whole messages are always consumed; a trailing
    /// partial message is left for the caller to present again, with more
    /// bytes appended, on a later call.
    ///
    /// Anything the client must send in response is written to `writer`
    /// before this returns.  On error, a fatal alert has already been written
    /// if the error has one, and the connection must be torn down.
    pub fn read_handshake(
        &mut self,
        buf: &[u8],
        writer: &mut dyn PacketWriter,
    ) -> Result<usize, Error> {
        self.check_critical()?;

        let mut used = 0;
        while buf.len() - used >= HandshakeHeader::LEN {
            let rest = &buf[used..];
            let header = match HandshakeHeader::peek(rest) {
                Ok(header) => header,
                Err(NeedMoreData) => {
                    trace!("need more data for {:?}", rest[0]);
                    break;
                }
            };

            let encoded = &rest[..header.encoded_len()];
            if let Err(err) = self.process_message(header.typ, encoded, writer) {
                return Err(self.fail(err, writer));
            }
            used += encoded.len();
        }

        Ok(used)
    }

    fn process_message(
        &mut self,
        typ: HandshakeType,
        encoded: &[u8],
        writer: &mut dyn PacketWriter,
    ) -> Result<(), Error> {
        trace!("received handshake message {:?} ({} bytes)", typ, encoded.len());

        if self.state.counters.get(typ) >= 1 {
            debug!("duplicate {:?} message", typ);
            return Err(Error::UnexpectedMessage);
        }
        self.state.counters.record(typ);

        let result = hs::handle_message(
            &mut hs::Context {
                state: &mut self.state,
                config: &self.config,
                events: self.events.as_mut(),
            },
            typ,
            &encoded[HandshakeHeader::LEN..],
        );

        // Errors included: the transcript records what arrived.
        if typ != HandshakeType::HelloRequest {
            self.state.transcript.add_raw(encoded);
        }

        match result? {
            WriteStage::Initial => Ok(()),
            WriteStage::ClientHandshake => self.emit_client_flight(writer),
        }
    }

    fn check_critical(&self) -> Result<(), Error> {
        match &self.critical {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Latch `err`, sending its alert if it has one.
    fn fail(&mut self, err: Error, writer: &mut dyn PacketWriter) -> Error {
        match err.alert_description() {
            Some(description) => {
                warn!("Sending fatal alert {:?}: {}", description, err);
                self.send(
                    writer,
                    ContentType::Alert,
                    AlertMessagePayload::fatal(description).get_encoding(),
                );
            }
            None => error!("handshake failed without alert: {}", err),
        }

        self.critical = Some(err.clone());
        err
    }

    fn send(&mut self, writer: &mut dyn PacketWriter, typ: ContentType, payload: Vec<u8>) {
        writer.write_packet(OutboundMessage {
            typ,
            version: self.config.version,
            payload,
        });
        self.write_seq += 1;
    }

    /// Send a handshake message, adding it to the transcript.
    fn send_handshake(
        &mut self,
        writer: &mut dyn PacketWriter,
        message: HandshakeMessagePayload,
    ) {
        trace!("sending handshake message {:?}", message.typ);
        let encoded = message.get_encoding();
        self.state.transcript.add_raw(&encoded);
        self.send(writer, ContentType::Handshake, encoded);
    }

    fn emit_client_hello(&mut self, writer: &mut dyn PacketWriter) {
        let config = &self.config;
        let mut extensions = Vec::new();

        if let Some(name) = config.sni() {
            extensions.push(ClientExtension::ServerName(name.to_owned()));
        }

        if !config.alpn_protocols.is_empty() {
            extensions.push(ClientExtension::Protocols(
                config
                    .alpn_protocols
                    .iter()
                    .map(|proto| PayloadU8::new(proto.clone()))
                    .collect(),
            ));
        }

        if !config.signature_schemes.is_empty() {
            extensions.push(ClientExtension::SignatureAlgorithms(
                config.signature_schemes.clone(),
            ));
        }

        let hello = ClientHelloPayload {
            client_version: config.version,
            random: Random::from(self.state.randoms.client),
            session_id: SessionId::empty(),
            cipher_suites: config
                .cipher_suites
                .iter()
                .map(|scs| scs.suite)
                .collect(),
            compression_methods: vec![Compression::Null],
            extensions,
        };

        debug!("Sending ClientHello {:#?}", hello);
        self.send_handshake(
            writer,
            HandshakeMessagePayload::from_codec(HandshakeType::ClientHello, &hello),
        );
    }

    /// Our reply to `ServerHelloDone`.
    fn emit_client_flight(&mut self, writer: &mut dyn PacketWriter) -> Result<(), Error> {
        if self.state.client_verification == ClientVerification::VerificationNeeded {
            let chain = CertificatePayload(self.config.client_auth_cert_chain.clone());
            debug!("sending client certificate chain of {} entries", chain.0.len());
            self.send_handshake(
                writer,
                HandshakeMessagePayload::from_codec(HandshakeType::Certificate, &chain),
            );
            self.state.client_verification = ClientVerification::Verified;
        }

        self.emit_client_key_exchange(writer)?;

        self.send(
            writer,
            ContentType::ChangeCipherSpec,
            ChangeCipherSpecPayload.get_encoding(),
        );
        self.write_seq = 0;

        self.emit_finished(writer)
    }

    fn emit_client_key_exchange(&mut self, writer: &mut dyn PacketWriter) -> Result<(), Error> {
        let suite = self
            .state
            .suite
            .ok_or(Error::UnexpectedMessage)?;
        let server_key = self
            .state
            .certificate_chain
            .first()
            .and_then(ServerCertificate::rsa_public_key)
            .ok_or(Error::UnsupportedCertificate)?;

        let premaster = self.make_premaster_secret()?;
        let encrypted = self
            .config
            .provider
            .rsa
            .encrypt_pkcs1(
                server_key,
                &premaster[..],
                self.config.provider.secure_random,
            )?;

        let secrets = ConnectionSecrets::from_premaster(
            self.config.provider.prf,
            &premaster,
            self.state.randoms,
            suite,
        )
        .map_err(|_err| {
            error!("master secret derivation failed: {}", _err);
            Error::KeyDerivationFailed
        })?;
        drop(premaster);
        self.state.secrets = Some(secrets);

        self.send_handshake(
            writer,
            HandshakeMessagePayload::from_codec(
                HandshakeType::ClientKeyExchange,
                &PayloadU16::new(encrypted),
            ),
        );
        self.state.status = ConnectionStatus::KeyExchange;
        Ok(())
    }

    /// 48 random bytes, none of them zero, led by our advertised version.
    fn make_premaster_secret(&self) -> Result<Zeroizing<[u8; SECRET_LEN]>, Error> {
        let provider = &self.config.provider;
        let mut premaster = Zeroizing::new([0u8; SECRET_LEN]);
        provider.fill_random(&mut premaster[..])?;

        for byte in premaster.iter_mut() {
            while *byte == 0 {
                let mut fresh = [0u8; 1];
                provider.fill_random(&mut fresh)?;
                *byte = fresh[0];
            }
        }

        premaster[..2].copy_from_slice(&self.config.version.to_array());
        Ok(premaster)
    }

    fn emit_finished(&mut self, writer: &mut dyn PacketWriter) -> Result<(), Error> {
        let verify_data = match (&self.state.secrets, self.state.transcript.current_hash()) {
            (Some(secrets), Some(hash)) => secrets.client_verify_data(&hash),
            _ => return Err(Error::General("no keys for Finished".into())),
        };

        self.send_handshake(
            writer,
            HandshakeMessagePayload::new(HandshakeType::Finished, verify_data),
        );
        Ok(())
    }

    /// Where the handshake has got to.
    pub fn status(&self) -> ConnectionStatus {
        self.state.status
    }

    /// Whether the handshake is still in progress.
    pub fn is_handshaking(&self) -> bool {
        self.state.status != ConnectionStatus::Established && self.critical.is_none()
    }

    /// The protocol version the server selected.
    pub fn negotiated_version(&self) -> Option<ProtocolVersion> {
        self.state.negotiated_version
    }

    /// The cipher suite the server selected.
    pub fn negotiated_cipher_suite(&self) -> Option<&'static SupportedCipherSuite> {
        self.state.suite
    }

    /// Shorthand for the identifier of
    /// [`ClientConnection::negotiated_cipher_suite()`].
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        self.state.suite.map(|scs| scs.suite)
    }

    /// Our random, and the server's once its `ServerHello` arrived.
    pub fn randoms(&self) -> &ConnectionRandoms {
        &self.state.randoms
    }

    /// The session id the server assigned, if it sent a usable one.
    pub fn session_id(&self) -> Option<&[u8]> {
        self.state
            .session_id
            .as_ref()
            .map(|id| id.as_ref())
    }

    /// The structurally valid certificates the server presented, in order.
    ///
    /// Validating them is the caller's job.
    pub fn certificate_chain(&self) -> &[ServerCertificate] {
        &self.state.certificate_chain
    }

    /// Retrieves the protocol agreed with the server via ALPN.
    ///
    /// This is always one of [`ClientConfig::alpn_protocols`].
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.state.negotiated_alpn.as_deref()
    }

    /// The host name carried by the server's `server_name` extension.
    pub fn server_name_indication(&self) -> Option<&str> {
        self.state
            .server_name_indication
            .as_deref()
    }

    /// Whether the server asked for, and got, our certificate.
    pub fn client_verification(&self) -> ClientVerification {
        self.state.client_verification
    }

    /// The signature schemes from the server's `CertificateRequest`, if one arrived.
    pub fn requested_signature_schemes(&self) -> Option<&[SignatureScheme]> {
        self.state
            .certificate_request
            .as_ref()
            .map(|req| req.sigschemes.as_slice())
    }

    /// The current transcript hash, once the `ServerHello` fixed its algorithm.
    pub fn transcript_hash(&self) -> Option<Vec<u8>> {
        self.state
            .transcript
            .current_hash()
            .map(|hash| hash.as_ref().to_vec())
    }

    /// The sequence number of the next record we send.
    ///
    /// Our `ChangeCipherSpec` resets it to zero.
    pub fn write_sequence_number(&self) -> u64 {
        self.write_seq
    }

    /// `PRF(master_secret, "key expansion", server_random + client_random)`,
    /// as long as the negotiated suite needs.
    ///
    /// Available once our `ClientKeyExchange` has been sent.  The record layer
    /// slices this into MAC keys, encryption keys and IVs.
    pub fn key_block(&self) -> Option<Zeroizing<Vec<u8>>> {
        self.state
            .secrets
            .as_ref()
            .map(|secrets| Zeroizing::new(secrets.make_key_block()))
    }

    /// The error that ended this connection, if any.
    pub fn error(&self) -> Option<&Error> {
        self.critical.as_ref()
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("status", &self.state.status)
            .field("suite", &self.state.suite)
            .field("transcript", &self.state.transcript.algorithm())
            .field("write_seq", &self.write_seq)
            .field("critical", &self.critical)
            .finish_non_exhaustive()
    }
}
