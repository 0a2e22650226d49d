use crate::enums::{HandshakeType, ProtocolVersion};
use crate::hash_hs::Transcript;
use crate::msgs::handshake::{CertificateRequestPayload, SessionId};
use crate::suites::SupportedCipherSuite;
use crate::tls12::{ConnectionRandoms, ConnectionSecrets};
use crate::x509::ServerCertificate;

use super::connection::HandshakeTimer;

/// Where a connection is in its handshake.
///
/// Status only moves forward: `Disconnected` → `Negotiating` → `KeyExchange`
/// → `Established`.  `Renegotiating` stands in for `Negotiating` while a
/// second handshake runs over an established connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No `ServerHello` has been accepted yet.
    Disconnected,
    /// The `ServerHello` has been accepted.
    Negotiating,
    /// A renegotiation is underway.
    Renegotiating,
    /// Our `ClientKeyExchange` has been sent; waiting for the server's `Finished`.
    KeyExchange,
    /// The server's `Finished` verified.
    Established,
}

impl ConnectionStatus {
    /// `ServerHello` may follow, and server flight messages are legal.
    pub(crate) fn is_negotiating(self) -> bool {
        matches!(self, Self::Negotiating | Self::Renegotiating)
    }
}

/// Whether the server asked us for a certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientVerification {
    /// No `CertificateRequest` was received.
    NotRequested,
    /// A `CertificateRequest` was received; our `Certificate` is yet to be sent.
    VerificationNeeded,
    /// Our `Certificate` has been sent.
    Verified,
}

/// How many of each handshake message type arrived in this negotiation.
pub(crate) struct MessageCounters([u8; 256]);

impl MessageCounters {
    pub(crate) fn new() -> Self {
        Self([0; 256])
    }

    pub(crate) fn get(&self, typ: HandshakeType) -> u8 {
        self.0[usize::from(u8::from(typ))]
    }

    pub(crate) fn record(&mut self, typ: HandshakeType) {
        let count = &mut self.0[usize::from(u8::from(typ))];
        *count = count.saturating_add(1);
    }

    pub(crate) fn reset(&mut self) {
        self.0 = [0; 256];
    }
}

/// Everything the handshake learns and derives, for one connection.
pub(crate) struct ConnectionState {
    pub(crate) status: ConnectionStatus,
    pub(crate) negotiated_version: Option<ProtocolVersion>,
    pub(crate) suite: Option<&'static SupportedCipherSuite>,
    pub(crate) randoms: ConnectionRandoms,
    pub(crate) session_id: Option<SessionId>,
    pub(crate) certificate_chain: Vec<ServerCertificate>,
    pub(crate) certificate_request: Option<CertificateRequestPayload>,
    pub(crate) negotiated_alpn: Option<Vec<u8>>,
    pub(crate) server_name_indication: Option<String>,
    pub(crate) secrets: Option<ConnectionSecrets>,
    pub(crate) transcript: Transcript,
    pub(crate) counters: MessageCounters,
    pub(crate) client_verification: ClientVerification,
    pub(crate) handshake_timeout: Option<Box<dyn HandshakeTimer>>,
}

impl ConnectionState {
    pub(crate) fn new(
        randoms: ConnectionRandoms,
        handshake_timeout: Option<Box<dyn HandshakeTimer>>,
    ) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            negotiated_version: None,
            suite: None,
            randoms,
            session_id: None,
            certificate_chain: Vec::new(),
            certificate_request: None,
            negotiated_alpn: None,
            server_name_indication: None,
            secrets: None,
            transcript: Transcript::new(),
            counters: MessageCounters::new(),
            client_verification: ClientVerification::NotRequested,
            handshake_timeout,
        }
    }

    /// Forget what the last negotiation learned, ready for another.
    ///
    /// Secrets survive until the next key exchange replaces them, because
    /// the record layer keeps using them until the next `ChangeCipherSpec`.
    pub(crate) fn reset_for_renegotiation(&mut self, client_random: [u8; 32]) {
        self.randoms = ConnectionRandoms {
            client: client_random,
            server: [0u8; 32],
        };
        self.session_id = None;
        self.certificate_chain.clear();
        self.certificate_request = None;
        self.negotiated_alpn = None;
        self.server_name_indication = None;
        self.transcript = Transcript::new();
        self.counters.reset();
        self.client_verification = ClientVerification::NotRequested;
        self.status = ConnectionStatus::Renegotiating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_each_type() {
        let mut c = MessageCounters::new();
        c.record(HandshakeType::ServerHello);
        c.record(HandshakeType::ServerHello);
        c.record(HandshakeType::Unknown(0xfe));
        assert_eq!(c.get(HandshakeType::ServerHello), 2);
        assert_eq!(c.get(HandshakeType::Unknown(0xfe)), 1);
        assert_eq!(c.get(HandshakeType::Finished), 0);
        c.reset();
        assert_eq!(c.get(HandshakeType::ServerHello), 0);
    }

    #[test]
    fn renegotiation_reset_keeps_secrets_slot() {
        let randoms = ConnectionRandoms {
            client: [1; 32],
            server: [2; 32],
        };
        let mut state = ConnectionState::new(randoms, None);
        state.status = ConnectionStatus::Established;
        state.negotiated_alpn = Some(b"h2".to_vec());
        state.counters.record(HandshakeType::Finished);

        state.reset_for_renegotiation([3; 32]);
        assert_eq!(state.status, ConnectionStatus::Renegotiating);
        assert!(state.status.is_negotiating());
        assert_eq!(state.randoms.client, [3; 32]);
        assert_eq!(state.randoms.server, [0; 32]);
        assert_eq!(state.negotiated_alpn, None);
        assert_eq!(state.counters.get(HandshakeType::Finished), 0);
        assert!(state.transcript.current_hash().is_none());
    }
}
