use subtle::ConstantTimeEq;

use super::config::ClientConfig;
use super::connection::HandshakeEvents;
use super::state::{ClientVerification, ConnectionState, ConnectionStatus};
use crate::enums::HandshakeType;
use crate::error::{Error, InvalidMessage};
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::{Compression, ExtensionType};
use crate::msgs::handshake::{
    read_server_name, CertificatePayload, CertificateRequestPayload, DigitallySignedStruct,
    PayloadU8, ServerExtension, ServerHelloPayload,
};
use crate::suites;
use crate::tls12::VERIFY_DATA_LEN;
use crate::x509::ServerCertificate;

#[cfg(feature = "logging")]
use crate::log::{debug, trace};

/// What the client must send once a message has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteStage {
    /// Nothing to send.
    Initial,
    /// Send our flight: `Certificate` if requested, `ClientKeyExchange`,
    /// `ChangeCipherSpec` and `Finished`.
    ClientHandshake,
}

/// Everything a handler may read or change.
pub(crate) struct Context<'a> {
    pub(crate) state: &'a mut ConnectionState,
    pub(crate) config: &'a ClientConfig,
    pub(crate) events: &'a mut dyn HandshakeEvents,
}

/// Interpret one complete handshake message.
///
/// `body` is exactly the bytes announced by the header, so running out of
/// bytes inside it is a corrupt message rather than an incomplete one.
pub(crate) fn handle_message(
    cx: &mut Context<'_>,
    typ: HandshakeType,
    body: &[u8],
) -> Result<WriteStage, Error> {
    let mut r = Reader::init(body);
    match typ {
        HandshakeType::HelloRequest => handle_hello_request(cx),
        HandshakeType::ServerHello => handle_server_hello(cx, &mut r),
        HandshakeType::Certificate => handle_certificate(cx, &mut r),
        HandshakeType::ServerKeyExchange => handle_server_key_exchange(cx, &mut r),
        HandshakeType::CertificateRequest => handle_certificate_request(cx, &mut r),
        HandshakeType::ServerHelloDone => handle_server_hello_done(cx),
        HandshakeType::CertificateVerify => handle_certificate_verify(&mut r),
        HandshakeType::Finished => handle_finished(cx, &mut r),
        HandshakeType::ClientHello | HandshakeType::ClientKeyExchange => {
            debug!("client received its own message type {:?}", typ);
            Err(Error::UnexpectedMessage)
        }
        _ => {
            debug!("no handler for handshake message {:?}", typ);
            Err(Error::NotUnderstood)
        }
    }
}

fn require_negotiating(state: &ConnectionState) -> Result<(), Error> {
    match state.status.is_negotiating() {
        true => Ok(()),
        false => Err(Error::UnexpectedMessage),
    }
}

fn handle_hello_request(cx: &mut Context<'_>) -> Result<WriteStage, Error> {
    match cx.state.status {
        ConnectionStatus::Established => Err(Error::NoRenegotiation),
        _ => {
            trace!("ignoring HelloRequest during negotiation");
            Ok(WriteStage::Initial)
        }
    }
}

fn handle_server_hello(cx: &mut Context<'_>, r: &mut Reader<'_>) -> Result<WriteStage, Error> {
    let state = &mut *cx.state;
    match state.status {
        ConnectionStatus::Disconnected | ConnectionStatus::Renegotiating => {}
        _ => return Err(Error::UnexpectedMessage),
    }

    // Extensions are decoded only once the fixed fields have been accepted,
    // so a compressed hello is refused whatever follows it.
    let mut hello = ServerHelloPayload::read_fixed(r)?;

    // We never offer compression.
    if hello.compression_method != Compression::Null {
        return Err(Error::CompressionNotSupported);
    }

    if hello.server_version != cx.config.version {
        debug!("server selected unsupported version {:?}", hello.server_version);
        return Err(Error::NotSafe);
    }

    state.randoms.server = hello.random.0;
    state.session_id = hello.session_id;

    let suite = match suites::find_suite(&cx.config.cipher_suites, hello.cipher_suite) {
        Some(suite) => suite,
        None => {
            state.suite = None;
            return Err(Error::NoCommonCipher);
        }
    };
    debug!("Using ciphersuite {:?}", suite);
    state.suite = Some(suite);
    state.negotiated_version = Some(hello.server_version);
    state
        .transcript
        .start_hash(cx.config.provider.hash);

    if state.status == ConnectionStatus::Disconnected {
        state.status = ConnectionStatus::Negotiating;
    }

    hello.extensions = ServerHelloPayload::read_extensions(r)?;
    trace!("We got ServerHello {:?}", hello);

    for ext in hello.extensions.iter().flatten() {
        process_server_extension(state, cx.config, ext)?;
    }

    Ok(WriteStage::Initial)
}

fn process_server_extension(
    state: &mut ConnectionState,
    config: &ClientConfig,
    ext: &ServerExtension,
) -> Result<(), Error> {
    match ext.typ {
        ExtensionType::ServerName if !ext.payload.is_empty() => {
            match read_server_name(&ext.payload)?.map(String::from_utf8) {
                Some(Ok(name)) => {
                    debug!("server name indication: {name}");
                    state.server_name_indication = Some(name);
                }
                Some(Err(_)) => debug!("ignoring non-UTF-8 server name"),
                None => {}
            }
        }
        ExtensionType::ALProtocolNegotiation if !config.alpn_protocols.is_empty() => {
            state.negotiated_alpn = choose_alpn(&ext.payload, &config.alpn_protocols)?;
            debug!("ALPN protocol is {:?}", state.negotiated_alpn);
        }
        ExtensionType::SignatureAlgorithms => {
            debug!("server sent signature_algorithms; ignored");
        }
        _ => {
            trace!("skipping {} bytes of {:?} extension", ext.payload.len(), ext.typ);
        }
    }
    Ok(())
}

/// The first protocol in the server's list that we offered.
///
/// Entries after a match are not examined.
fn choose_alpn(body: &[u8], offered: &[Vec<u8>]) -> Result<Option<Vec<u8>>, InvalidMessage> {
    let mut r = Reader::init(body);
    let len = usize::from(u16::read(&mut r)?);
    let mut list = r.sub(len)?;

    while list.any_left() {
        let proto = PayloadU8::read(&mut list)?;
        if offered.contains(&proto.0) {
            return Ok(Some(proto.0));
        }
        debug!("server offered unrequested ALPN protocol {:?}", proto);
    }

    Ok(None)
}

fn handle_certificate(cx: &mut Context<'_>, r: &mut Reader<'_>) -> Result<WriteStage, Error> {
    require_negotiating(cx.state)?;

    let payload = CertificatePayload::read(r)?;
    r.expect_empty("CertificatePayload")?;

    let chain = payload
        .0
        .into_iter()
        .enumerate()
        .filter_map(|(_i, der)| {
            let parsed = ServerCertificate::parse(der);
            if parsed.is_none() {
                debug!("skipping malformed certificate at position {_i}");
            }
            parsed
        })
        .collect::<Vec<_>>();

    let first = chain
        .first()
        .ok_or(Error::BadCertificate)?;
    if first.rsa_public_key().is_none() {
        debug!("server certificate {} has no RSA key", first.subject());
        return Err(Error::UnsupportedCertificate);
    }

    trace!("server certificate chain has {} entries", chain.len());
    cx.state.certificate_chain = chain;
    Ok(WriteStage::Initial)
}

fn handle_server_key_exchange(
    cx: &mut Context<'_>,
    r: &mut Reader<'_>,
) -> Result<WriteStage, Error> {
    require_negotiating(cx.state)?;

    // RSA key exchange has no server parameters to use.
    let _params = r.rest();
    debug!("ignoring {} bytes of ServerKeyExchange", _params.len());
    Ok(WriteStage::Initial)
}

fn handle_certificate_request(
    cx: &mut Context<'_>,
    r: &mut Reader<'_>,
) -> Result<WriteStage, Error> {
    require_negotiating(cx.state)?;

    let request = CertificateRequestPayload::read(r)?;
    r.expect_empty("CertificateRequestPayload")?;
    debug!("Got CertificateRequest {:?}", request);

    cx.state.certificate_request = Some(request);
    cx.state.client_verification = ClientVerification::VerificationNeeded;
    cx.events.certificate_requested();
    Ok(WriteStage::Initial)
}

fn handle_server_hello_done(cx: &mut Context<'_>) -> Result<WriteStage, Error> {
    require_negotiating(cx.state)?;

    if cx.state.certificate_chain.is_empty() {
        debug!("ServerHelloDone without a server certificate");
        return Err(Error::UnexpectedMessage);
    }

    Ok(WriteStage::ClientHandshake)
}

fn handle_certificate_verify(r: &mut Reader<'_>) -> Result<WriteStage, Error> {
    // Only a server receives this; a well-formed one is still out of place.
    let _dss = DigitallySignedStruct::read(r)?;
    debug!("received CertificateVerify {:?}", _dss);
    Err(Error::UnexpectedMessage)
}

fn handle_finished(cx: &mut Context<'_>, r: &mut Reader<'_>) -> Result<WriteStage, Error> {
    let state = &mut *cx.state;
    if state.status != ConnectionStatus::KeyExchange {
        return Err(Error::UnexpectedMessage);
    }

    let verify_data = r
        .take(VERIFY_DATA_LEN)
        .ok_or(Error::BrokenPacket(InvalidMessage::MessageTooShort))?;

    let (secrets, hash) = match (&state.secrets, state.transcript.current_hash()) {
        (Some(secrets), Some(hash)) => (secrets, hash),
        _ => return Err(Error::UnexpectedMessage),
    };

    let expect_verify_data = secrets.server_verify_data(&hash);
    if !bool::from(expect_verify_data[..].ct_eq(verify_data)) {
        return Err(Error::NotVerified);
    }

    debug!("server Finished verified; connection established");
    state.status = ConnectionStatus::Established;
    if let Some(timer) = state.handshake_timeout.take() {
        timer.cancel();
    }
    state.counters.reset();
    cx.events.ready_to_write();
    Ok(WriteStage::Initial)
}
