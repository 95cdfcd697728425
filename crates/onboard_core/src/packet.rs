//! Packet serialization seam for extracted templates.
//!
//! Templates are stored together with a raw, self-describing form of the
//! single-segment record they came in. The encoding is pluggable; the default
//! writes JSON.

use crate::model::capture::BiometricRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to encode a biometric record.
#[derive(Debug)]
pub struct SerializeError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl SerializeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl Display for SerializeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to serialize biometric record: {}", self.message)
    }
}

impl Error for SerializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(value: serde_json::Error) -> Self {
        Self {
            message: value.to_string(),
            source: Some(Box::new(value)),
        }
    }
}

/// Converts a biometric record into the bytes kept in `bio_raw_image`.
pub trait PacketSerializer {
    fn to_raw_record(&self, record: &BiometricRecord) -> Result<Vec<u8>, SerializeError>;
}

/// Default serializer producing UTF-8 JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPacketSerializer;

impl PacketSerializer for JsonPacketSerializer {
    fn to_raw_record(&self, record: &BiometricRecord) -> Result<Vec<u8>, SerializeError> {
        Ok(serde_json::to_vec(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonPacketSerializer, PacketSerializer};
    use crate::model::capture::{Bir, BiometricRecord};

    #[test]
    fn json_serializer_wraps_single_segment() {
        let template = Bir::new(vec![1, 2, 3], vec!["Left".into(), "Thumb".into()], 70);
        let raw = JsonPacketSerializer
            .to_raw_record(&BiometricRecord::single(&template))
            .unwrap();

        let decoded: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(decoded["segments"].as_array().map(Vec::len), Some(1));
        assert_eq!(decoded["segments"][0]["bdbInfo"]["quality"]["score"], 70);
        assert_eq!(decoded["others"], serde_json::json!({}));
    }
}
