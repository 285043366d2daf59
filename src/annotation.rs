//! The annotation record persisted across the wrap/unwrap boundary.
//!
//! Produced on wrap, embedded by the caller into the image manifest,
//! and handed back verbatim on unwrap. The only state this service
//! ever emits.

use crate::error::KeyProviderError;
use crate::protocol::base64_bytes;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPacket {
    /// KMS key identifier used at wrap time.
    pub key_url: String,
    /// Ciphertext of the content-encryption key.
    #[serde(with = "base64_bytes")]
    pub wrapped_key: Vec<u8>,
}

impl AnnotationPacket {
    pub fn new(key_url: impl Into<String>, wrapped_key: Vec<u8>) -> Self {
        Self { key_url: key_url.into(), wrapped_key }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, KeyProviderError> {
        serde_json::to_vec(self).map_err(|err| KeyProviderError::Serialize("annotation packet", err))
    }

    /// Parse failures are internal faults, not caller errors: the
    /// annotation is expected to be this service's own prior output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyProviderError> {
        serde_json::from_slice(bytes).map_err(KeyProviderError::MalformedAnnotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_round_trips() {
        let packet = AnnotationPacket::new("arn:example", b"ciphertext".to_vec());
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(AnnotationPacket::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn wire_form_matches_protocol() {
        let packet = AnnotationPacket::new("arn:example", b"secret|arn:example".to_vec());
        let value: serde_json::Value = serde_json::from_slice(&packet.to_bytes().unwrap()).unwrap();
        assert_eq!(value["key_url"], "arn:example");
        assert_eq!(value["wrapped_key"], "c2VjcmV0fGFybjpleGFtcGxl");
    }

    #[test]
    fn malformed_packet_is_internal_error() {
        let err = AnnotationPacket::from_bytes(b"garbage").unwrap_err();
        assert!(matches!(err, KeyProviderError::MalformedAnnotation(_)));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn empty_annotation_is_internal_error() {
        let err = AnnotationPacket::from_bytes(b"").unwrap_err();
        assert!(matches!(err, KeyProviderError::MalformedAnnotation(_)));
    }
}
