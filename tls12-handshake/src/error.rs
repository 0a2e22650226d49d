use core::fmt;
use std::error::Error as StdError;

use crate::enums::AlertDescription;

/// The handshake engine reports fatal errors using this type.
///
/// Every variant ends the connection.  An incomplete message is not an
/// error: it is reported by consuming fewer bytes than were offered.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// We received a handshake message that isn't valid right now:
    /// it is out of order, repeated, or one a client never receives.
    UnexpectedMessage,

    /// The peer sent us a handshake message with invalid contents.
    BrokenPacket(InvalidMessage),

    /// The server selected a compression method other than `null`.
    CompressionNotSupported,

    /// The server selected a cipher suite we did not offer.
    NoCommonCipher,

    /// We received a handshake message type we do not understand.
    NotUnderstood,

    /// The server asked to renegotiate an established connection.
    NoRenegotiation,

    /// The peer's `Finished` message did not match the transcript.
    NotVerified,

    /// The server did not present a certificate we could parse.
    BadCertificate,

    /// The server's certificate has no key we can use for key exchange.
    UnsupportedCertificate,

    /// We couldn't decrypt a message.  This is invariably fatal.
    DecryptionFailed,

    /// The server selected a protocol version we do not support.
    NotSafe,

    /// We failed to acquire random bytes from the system.
    FailedToGetRandomBytes,

    /// Computing the master secret failed.
    KeyDerivationFailed,

    /// A catch-all error for unlikely errors.
    General(String),
}

impl Error {
    /// The fatal alert to send the peer for this error, if any.
    ///
    /// Internal failures have no alert: the connection is simply torn down.
    pub fn alert_description(&self) -> Option<AlertDescription> {
        Some(match self {
            Self::UnexpectedMessage => AlertDescription::UnexpectedMessage,
            Self::CompressionNotSupported => AlertDescription::DecompressionFailure,
            Self::BrokenPacket(_) => AlertDescription::DecodeError,
            Self::NotVerified => AlertDescription::BadRecordMac,
            Self::BadCertificate => AlertDescription::BadCertificate,
            Self::UnsupportedCertificate => AlertDescription::UnsupportedCertificate,
            Self::NoCommonCipher => AlertDescription::InsufficientSecurity,
            Self::NotUnderstood => AlertDescription::InternalError,
            Self::NoRenegotiation => AlertDescription::NoRenegotiation,
            Self::DecryptionFailed => AlertDescription::DecryptionFailed,
            Self::NotSafe => AlertDescription::ProtocolVersion,
            Self::FailedToGetRandomBytes | Self::KeyDerivationFailed | Self::General(_) => {
                return None;
            }
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedMessage => write!(f, "received unexpected handshake message"),
            Self::BrokenPacket(why) => write!(f, "received corrupt message: {why:?}"),
            Self::CompressionNotSupported => write!(f, "server selected unsupported compression"),
            Self::NoCommonCipher => write!(f, "server selected a cipher suite we did not offer"),
            Self::NotUnderstood => write!(f, "received handshake message of unknown type"),
            Self::NoRenegotiation => write!(f, "server requested renegotiation"),
            Self::NotVerified => write!(f, "server Finished message did not verify"),
            Self::BadCertificate => write!(f, "server presented no usable certificate"),
            Self::UnsupportedCertificate => {
                write!(f, "server certificate key unsupported for key exchange")
            }
            Self::DecryptionFailed => write!(f, "cannot decrypt peer's message"),
            Self::NotSafe => write!(f, "server selected an unsupported protocol version"),
            Self::FailedToGetRandomBytes => write!(f, "failed to get random bytes"),
            Self::KeyDerivationFailed => write!(f, "failed to derive master secret"),
            Self::General(err) => write!(f, "unexpected error: {err}"),
        }
    }
}

impl StdError for Error {}

impl From<InvalidMessage> for Error {
    #[inline]
    fn from(e: InvalidMessage) -> Self {
        Self::BrokenPacket(e)
    }
}

impl From<crate::crypto::GetRandomFailed> for Error {
    fn from(_: crate::crypto::GetRandomFailed) -> Self {
        Self::FailedToGetRandomBytes
    }
}

/// A corrupt TLS message payload that resulted in an error.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMessage {
    /// Missing data for the named handshake payload value
    MissingData(&'static str),
    /// Bytes were left over after decoding the named payload
    TrailingData(&'static str),
    /// Message is shorter than the expected length
    MessageTooShort,
    /// A peer's server name could not be decoded
    InvalidServerName,
}

#[cfg(test)]
mod tests {
    use super::{Error, InvalidMessage};
    use crate::enums::AlertDescription;

    #[test]
    fn alert_table() {
        let table = [
            (Error::UnexpectedMessage, AlertDescription::UnexpectedMessage),
            (
                Error::CompressionNotSupported,
                AlertDescription::DecompressionFailure,
            ),
            (
                Error::BrokenPacket(InvalidMessage::MessageTooShort),
                AlertDescription::DecodeError,
            ),
            (Error::NotVerified, AlertDescription::BadRecordMac),
            (Error::BadCertificate, AlertDescription::BadCertificate),
            (
                Error::UnsupportedCertificate,
                AlertDescription::UnsupportedCertificate,
            ),
            (Error::NoCommonCipher, AlertDescription::InsufficientSecurity),
            (Error::NotUnderstood, AlertDescription::InternalError),
            (Error::NoRenegotiation, AlertDescription::NoRenegotiation),
            (Error::DecryptionFailed, AlertDescription::DecryptionFailed),
            (Error::NotSafe, AlertDescription::ProtocolVersion),
        ];

        for (err, alert) in table {
            assert_eq!(err.alert_description(), Some(alert), "{err:?}");
        }
    }

    #[test]
    fn internal_failures_have_no_alert() {
        assert_eq!(Error::KeyDerivationFailed.alert_description(), None);
        assert_eq!(Error::FailedToGetRandomBytes.alert_description(), None);
        assert_eq!(Error::General("x".into()).alert_description(), None);
    }

    #[test]
    fn smoke() {
        let all = vec![
            Error::UnexpectedMessage,
            Error::BrokenPacket(InvalidMessage::TrailingData("ServerHello")),
            Error::CompressionNotSupported,
            Error::NoCommonCipher,
            Error::NotUnderstood,
            Error::NoRenegotiation,
            Error::NotVerified,
            Error::BadCertificate,
            Error::UnsupportedCertificate,
            Error::DecryptionFailed,
            Error::NotSafe,
            Error::FailedToGetRandomBytes,
            Error::KeyDerivationFailed,
            Error::General("undocumented error".to_string()),
        ];

        for err in all {
            println!("{err:?}:");
            println!("  fmt '{err}'");
        }
    }
}
