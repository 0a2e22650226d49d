use crate::enums::AlertDescription;
use crate::error::InvalidMessage;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::AlertLevel;

#[derive(Debug)]
pub(crate) struct AlertMessagePayload {
    pub(crate) level: AlertLevel,
    pub(crate) description: AlertDescription,
}

impl AlertMessagePayload {
    pub(crate) fn fatal(description: AlertDescription) -> Self {
        Self {
            level: AlertLevel::Fatal,
            description,
        }
    }
}

impl Codec for AlertMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.level.encode(bytes);
        self.description.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let level = AlertLevel::read(r)?;
        let description = AlertDescription::read(r)?;
        r.expect_empty("AlertMessagePayload")
            .map(|_| Self { level, description })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_alert_wire_format() {
        let alert = AlertMessagePayload::fatal(AlertDescription::DecodeError);
        assert_eq!(alert.get_encoding(), vec![0x02, 0x32]);

        let back = AlertMessagePayload::read_bytes(&[0x02, 0x0a]).unwrap();
        assert_eq!(back.level, AlertLevel::Fatal);
        assert_eq!(back.description, AlertDescription::UnexpectedMessage);
        assert!(AlertMessagePayload::read_bytes(&[0x02, 0x0a, 0x00]).is_err());
    }
}
