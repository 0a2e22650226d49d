use crate::enums::{ContentType, ProtocolVersion};
use crate::msgs::codec::Codec;

/// A TLS frame the handshake engine wants sent, named `TLSPlaintext` in the standard.
///
/// The record layer is responsible for protecting it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// The content type of this message
    pub typ: ContentType,
    /// The protocol version of this message
    pub version: ProtocolVersion,
    /// The payload of this message
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Length of the TLS plaintext record header.
    pub const HEADER_SIZE: usize = 1 + 2 + 2;

    /// Largest plaintext payload one record may carry.
    pub const MAX_FRAGMENT_LEN: usize = 16384;

    /// Encode as unprotected TLS records.
    ///
    /// A payload longer than [`Self::MAX_FRAGMENT_LEN`] (a long client
    /// certificate chain, say) is split over as many records as it needs.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::HEADER_SIZE + self.payload.len());
        if self.payload.is_empty() {
            self.encode_record(&[], &mut buf);
        }
        for chunk in self.payload.chunks(Self::MAX_FRAGMENT_LEN) {
            self.encode_record(chunk, &mut buf);
        }
        buf
    }

    fn encode_record(&self, fragment: &[u8], buf: &mut Vec<u8>) {
        debug_assert!(fragment.len() <= Self::MAX_FRAGMENT_LEN);
        self.typ.encode(buf);
        self.version.encode(buf);
        (fragment.len() as u16).encode(buf);
        buf.extend_from_slice(fragment);
    }
}

/// The record-layer sender: everything the handshake emits goes through here.
///
/// Writing is synchronous and infallible from the engine's point of view;
/// a record layer that fails to send is expected to tear the connection down.
pub trait PacketWriter {
    /// Hand one message to the record layer.
    fn write_packet(&mut self, message: OutboundMessage);
}

impl PacketWriter for Vec<OutboundMessage> {
    fn write_packet(&mut self, message: OutboundMessage) {
        self.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_encoding() {
        let msg = OutboundMessage {
            typ: ContentType::ChangeCipherSpec,
            version: ProtocolVersion::TLSv1_2,
            payload: vec![0x01],
        };
        assert_eq!(msg.encode(), vec![0x14, 0x03, 0x03, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn long_payload_is_fragmented() {
        let msg = OutboundMessage {
            typ: ContentType::Handshake,
            version: ProtocolVersion::TLSv1_2,
            payload: vec![0xab; 20000],
        };
        let enc = msg.encode();
        assert_eq!(enc.len(), 2 * OutboundMessage::HEADER_SIZE + 20000);
        assert_eq!(&enc[..5], &[0x16, 0x03, 0x03, 0x40, 0x00]);
        let second = OutboundMessage::HEADER_SIZE + 16384;
        assert_eq!(&enc[second..second + 5], &[0x16, 0x03, 0x03, 0x0e, 0x20]);
        assert!(enc[second + 5..].iter().all(|b| *b == 0xab));

        let empty = OutboundMessage {
            payload: Vec::new(),
            ..msg
        };
        assert_eq!(empty.encode(), vec![0x16, 0x03, 0x03, 0x00, 0x00]);
    }
}
