use core::fmt;

use pki_types::CertificateDer;

use crate::enums::{CipherSuite, HandshakeType, ProtocolVersion, SignatureScheme};
use crate::error::InvalidMessage;
#[cfg(feature = "logging")]
use crate::log::debug;
use crate::msgs::codec::{
    self, read_vec_u16, read_vec_u8, Codec, LengthPrefixedBuffer, ListLength, NeedMoreData,
    Reader, u24,
};
use crate::msgs::enums::{ClientCertificateType, Compression, ExtensionType, ServerNameType};

/// The 1-byte type and 3-byte length that precede every handshake message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandshakeHeader {
    pub typ: HandshakeType,
    pub length: usize,
}

impl HandshakeHeader {
    pub const LEN: usize = 1 + 3;

    /// Look at the front of `buf` without consuming it.
    ///
    /// Succeeds only if the header and the whole body it announces are
    /// present in `buf`.
    pub fn peek(buf: &[u8]) -> Result<Self, NeedMoreData> {
        let (&typ, rest) = buf.split_first().ok_or(NeedMoreData)?;
        Ok(Self {
            typ: HandshakeType::from(typ),
            length: read_length(rest)?,
        })
    }

    /// The length of the header plus body.
    pub fn encoded_len(&self) -> usize {
        Self::LEN + self.length
    }
}

/// Read a 3-byte big-endian length from the front of `bytes`, requiring
/// that many bytes to follow it.
pub fn read_length(bytes: &[u8]) -> Result<usize, NeedMoreData> {
    let length = bytes
        .get(..3)
        .and_then(u24::decode)
        .map(usize::from)
        .ok_or(NeedMoreData)?;

    match bytes.len() - 3 >= length {
        true => Ok(length),
        false => Err(NeedMoreData),
    }
}

/// The 2-byte type and 2-byte length that precede every extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionHeader {
    pub typ: ExtensionType,
    pub length: u16,
}

impl Codec for ExtensionHeader {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);
        self.length.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            typ: ExtensionType::read(r)?,
            length: u16::read(r)?,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Random(pub [u8; 32]);

impl fmt::Debug for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(f, &self.0)
    }
}

impl Codec for Random {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let bytes = match r.take(32) {
            Some(bytes) => bytes,
            None => return Err(InvalidMessage::MissingData("Random")),
        };

        let mut opaque = [0; 32];
        opaque.clone_from_slice(bytes);
        Ok(Self(opaque))
    }
}

impl From<[u8; 32]> for Random {
    #[inline]
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[derive(Copy, Clone)]
pub struct SessionId {
    len: usize,
    data: [u8; 32],
}

impl SessionId {
    pub const MAX_LEN: usize = 32;

    pub fn empty() -> Self {
        Self {
            data: [0u8; 32],
            len: 0,
        }
    }

    pub fn new(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > Self::MAX_LEN {
            return None;
        }

        let mut data = [0u8; 32];
        data[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            data,
            len: bytes.len(),
        })
    }

    /// Decode a session id, tolerating an over-long one.
    ///
    /// All the announced bytes are consumed, but only ids within the
    /// defined 0-32 byte range are returned as usable.
    pub fn read_lenient(r: &mut Reader<'_>) -> Result<Option<Self>, InvalidMessage> {
        let len = usize::from(u8::read(r)?);
        match r.take(len) {
            Some(bytes) => Ok(Self::new(bytes)),
            None => Err(InvalidMessage::MissingData("SessionID")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for SessionId {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl PartialEq for SessionId {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl Eq for SessionId {}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(f, self.as_ref())
    }
}

impl Codec for SessionId {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.len <= Self::MAX_LEN);
        bytes.push(self.len as u8);
        bytes.extend_from_slice(self.as_ref());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Self::read_lenient(r)?.ok_or(InvalidMessage::MissingData("SessionID"))
    }
}

/// An arbitrary, unknown-content, u8-length-prefixed payload
#[derive(Clone, Eq, PartialEq)]
pub struct PayloadU8(pub Vec<u8>);

impl PayloadU8 {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Codec for PayloadU8 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.0.len() <= 0xff);
        (self.0.len() as u8).encode(bytes);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = usize::from(u8::read(r)?);
        let mut sub = r.sub(len)?;
        Ok(Self(sub.rest().to_vec()))
    }
}

impl fmt::Debug for PayloadU8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(f, &self.0)
    }
}

/// An arbitrary, unknown-content, u16-length-prefixed payload
#[derive(Clone, Eq, PartialEq)]
pub struct PayloadU16(pub Vec<u8>);

impl PayloadU16 {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Codec for PayloadU16 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.0.len() <= 0xffff);
        (self.0.len() as u16).encode(bytes);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = usize::from(u16::read(r)?);
        let mut sub = r.sub(len)?;
        Ok(Self(sub.rest().to_vec()))
    }
}

impl fmt::Debug for PayloadU16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(f, &self.0)
    }
}

fn hex(f: &mut fmt::Formatter<'_>, payload: &[u8]) -> fmt::Result {
    for b in payload {
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

/// An extension as sent in a `ServerHello`, with its body left undecoded.
///
/// What a body means depends on what the client offered, so it is
/// interpreted by the handshake rather than here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerExtension {
    pub typ: ExtensionType,
    pub payload: Vec<u8>,
}

impl Codec for ServerExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);
        PayloadU16(self.payload.clone()).encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let header = ExtensionHeader::read(r)?;
        match r.take(usize::from(header.length)) {
            Some(body) => Ok(Self {
                typ: header.typ,
                payload: body.to_vec(),
            }),
            None => Err(InvalidMessage::MissingData("ServerExtension")),
        }
    }
}

/// The host name carried by a `server_name` extension.
///
/// Only the common single-entry list is understood: the name length sits
/// after the 2-byte list length and the 1-byte name type.
pub(crate) fn read_server_name(body: &[u8]) -> Result<Option<Vec<u8>>, InvalidMessage> {
    let mut r = Reader::init(body);
    let _list_len = u16::read(&mut r)?;
    let typ = ServerNameType::read(&mut r)?;
    let name = PayloadU16::read(&mut r)?.0;
    match typ {
        ServerNameType::HostName => Ok(Some(name)),
        _typ => {
            debug!("ignoring server name of type {:?}", _typ);
            Ok(None)
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerHelloPayload {
    pub server_version: ProtocolVersion,
    pub random: Random,
    /// `None` if the server sent an id longer than [`SessionId::MAX_LEN`].
    pub session_id: Option<SessionId>,
    pub cipher_suite: CipherSuite,
    pub compression_method: Compression,
    /// `None` if the extensions block is absent altogether.
    pub extensions: Option<Vec<ServerExtension>>,
}

impl Codec for ServerHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.server_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id
            .unwrap_or_else(SessionId::empty)
            .encode(bytes);
        self.cipher_suite.encode(bytes);
        self.compression_method.encode(bytes);
        if let Some(extensions) = &self.extensions {
            codec::encode_vec_u16(bytes, extensions);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let mut hello = Self::read_fixed(r)?;
        hello.extensions = Self::read_extensions(r)?;
        Ok(hello)
    }
}

impl ServerHelloPayload {
    /// Everything up to and including the compression method.
    ///
    /// `extensions` is left as `None`; see [`Self::read_extensions`].
    pub fn read_fixed(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            server_version: ProtocolVersion::read(r)?,
            random: Random::read(r)?,
            session_id: SessionId::read_lenient(r)?,
            cipher_suite: CipherSuite::read(r)?,
            compression_method: Compression::read(r)?,
            extensions: None,
        })
    }

    /// The optional extensions block that ends the message.
    pub fn read_extensions(
        r: &mut Reader<'_>,
    ) -> Result<Option<Vec<ServerExtension>>, InvalidMessage> {
        let extensions = match r.any_left() {
            true => Some(read_vec_u16::<ServerExtension>(r)?),
            false => None,
        };
        r.expect_empty("ServerHelloPayload")?;
        Ok(extensions)
    }
}

/// A certificate chain exactly as framed in a TLS 1.2 `Certificate` message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CertificatePayload(pub Vec<CertificateDer<'static>>);

impl Codec for CertificatePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        let nest = LengthPrefixedBuffer::new(ListLength::U24, bytes);
        for cert in &self.0 {
            let inner = LengthPrefixedBuffer::new(ListLength::U24, nest.buf);
            inner.buf.extend_from_slice(cert.as_ref());
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = usize::from(u24::read(r)?);
        let mut sub = r.sub(len)?;
        let mut certs = Vec::new();

        while sub.any_left() {
            let cert_len = usize::from(u24::read(&mut sub)?);
            match sub.take(cert_len) {
                Some(der) => certs.push(CertificateDer::from(der.to_vec())),
                None => return Err(InvalidMessage::MissingData("CertificateDer")),
            }
        }

        Ok(Self(certs))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistinguishedName(pub PayloadU16);

impl Codec for DistinguishedName {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.0.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        PayloadU16::read(r).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CertificateRequestPayload {
    pub certtypes: Vec<ClientCertificateType>,
    pub sigschemes: Vec<SignatureScheme>,
    pub canames: Vec<DistinguishedName>,
}

impl Codec for CertificateRequestPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_vec_u8(bytes, &self.certtypes);
        codec::encode_vec_u16(bytes, &self.sigschemes);
        codec::encode_vec_u16(bytes, &self.canames);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let certtypes = read_vec_u8(r)?;
        let sigschemes = read_vec_u16(r)?;
        let canames = read_vec_u16(r)?;

        // TLS1.2 requires at least one signature scheme.
        if sigschemes.is_empty() {
            return Err(InvalidMessage::MissingData("SignatureSchemes"));
        }

        Ok(Self {
            certtypes,
            sigschemes,
            canames,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DigitallySignedStruct {
    pub scheme: SignatureScheme,
    pub sig: PayloadU16,
}

impl Codec for DigitallySignedStruct {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.scheme.encode(bytes);
        self.sig.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let scheme = SignatureScheme::read(r)?;
        let sig = PayloadU16::read(r)?;
        Ok(Self { scheme, sig })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClientExtension {
    ServerName(String),
    Protocols(Vec<PayloadU8>),
    SignatureAlgorithms(Vec<SignatureScheme>),
}

impl ClientExtension {
    pub fn ext_type(&self) -> ExtensionType {
        match self {
            Self::ServerName(_) => ExtensionType::ServerName,
            Self::Protocols(_) => ExtensionType::ALProtocolNegotiation,
            Self::SignatureAlgorithms(_) => ExtensionType::SignatureAlgorithms,
        }
    }
}

impl Codec for ClientExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.ext_type().encode(bytes);

        let nest = LengthPrefixedBuffer::new(ListLength::U16, bytes);
        match self {
            Self::ServerName(name) => {
                let list = LengthPrefixedBuffer::new(ListLength::U16, nest.buf);
                ServerNameType::HostName.encode(list.buf);
                PayloadU16(name.as_bytes().to_vec()).encode(list.buf);
            }
            Self::Protocols(protocols) => codec::encode_vec_u16(nest.buf, protocols),
            Self::SignatureAlgorithms(schemes) => codec::encode_vec_u16(nest.buf, schemes),
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let header = ExtensionHeader::read(r)?;
        let mut sub = r.sub(usize::from(header.length))?;

        let ext = match header.typ {
            ExtensionType::ServerName => {
                let name = read_server_name(sub.rest())?
                    .ok_or(InvalidMessage::InvalidServerName)?;
                Self::ServerName(
                    String::from_utf8(name).map_err(|_| InvalidMessage::InvalidServerName)?,
                )
            }
            ExtensionType::ALProtocolNegotiation => Self::Protocols(read_vec_u16(&mut sub)?),
            ExtensionType::SignatureAlgorithms => {
                Self::SignatureAlgorithms(read_vec_u16(&mut sub)?)
            }
            _ => return Err(InvalidMessage::MissingData("ClientExtension")),
        };

        sub.expect_empty("ClientExtension")
            .map(|_| ext)
    }
}

#[derive(Clone, Debug)]
pub struct ClientHelloPayload {
    pub client_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<Compression>,
    pub extensions: Vec<ClientExtension>,
}

impl ClientHelloPayload {
    pub fn find_extension(&self, typ: ExtensionType) -> Option<&ClientExtension> {
        self.extensions
            .iter()
            .find(|ext| ext.ext_type() == typ)
    }
}

impl Codec for ClientHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.client_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id.encode(bytes);
        codec::encode_vec_u16(bytes, &self.cipher_suites);
        codec::encode_vec_u8(bytes, &self.compression_methods);
        if !self.extensions.is_empty() {
            codec::encode_vec_u16(bytes, &self.extensions);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let mut ret = Self {
            client_version: ProtocolVersion::read(r)?,
            random: Random::read(r)?,
            session_id: SessionId::read(r)?,
            cipher_suites: read_vec_u16(r)?,
            compression_methods: read_vec_u8(r)?,
            extensions: Vec::new(),
        };

        if r.any_left() {
            ret.extensions = read_vec_u16(r)?;
        }

        r.expect_empty("ClientHelloPayload")
            .map(|_| ret)
    }
}

/// A whole handshake message: header plus an already-encoded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeMessagePayload {
    pub typ: HandshakeType,
    pub body: Vec<u8>,
}

impl HandshakeMessagePayload {
    pub fn new(typ: HandshakeType, body: impl Into<Vec<u8>>) -> Self {
        Self {
            typ,
            body: body.into(),
        }
    }

    pub fn from_codec(typ: HandshakeType, payload: &impl Codec) -> Self {
        Self::new(typ, payload.get_encoding())
    }
}

impl Codec for HandshakeMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);
        let nest = LengthPrefixedBuffer::new(ListLength::U24, bytes);
        nest.buf.extend_from_slice(&self.body);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let typ = HandshakeType::read(r)?;
        let len = usize::from(u24::read(r)?);
        let mut sub = r.sub(len)?;
        Ok(Self {
            typ,
            body: sub.rest().to_vec(),
        })
    }
}
