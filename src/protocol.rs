//! Serde model of the ocicrypt keyprovider JSON envelope.
//!
//! The envelope travels as opaque bytes inside the gRPC messages. Byte
//! fields (`optsdata`, `annotation`, the per-provider key id lists) are
//! base64 strings on the wire, matching Go's `[]byte` JSON encoding.

use crate::error::KeyProviderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// A byte string that is base64-encoded in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Bytes(#[serde(with = "base64_bytes")] pub Vec<u8>);

impl Base64Bytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Base64Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Base64Bytes(bytes)
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(bytes: &[u8]) -> Self {
        Base64Bytes(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Base64Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Per-provider key id lists. The protocol allows one list per
/// keyprovider so that several recipients can wrap the same key; this
/// service only ever consults its own entry.
pub type ProviderParameters = HashMap<String, Vec<Base64Bytes>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "keywrap")]
    KeyWrap,
    #[serde(rename = "keyunwrap")]
    KeyUnwrap,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::KeyWrap => f.write_str("keywrap"),
            Operation::KeyUnwrap => f.write_str("keyunwrap"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyProviderInput {
    pub op: Operation,
    #[serde(default)]
    pub keywrapparams: KeyWrapParams,
    #[serde(default)]
    pub keyunwrapparams: KeyUnwrapParams,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyWrapParams {
    #[serde(default)]
    pub ec: Option<EncryptConfig>,
    #[serde(default)]
    pub optsdata: Option<Base64Bytes>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyUnwrapParams {
    #[serde(default)]
    pub dc: Option<DecryptConfig>,
    #[serde(default)]
    pub annotation: Option<Base64Bytes>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EncryptConfig {
    #[serde(rename = "Parameters", default)]
    pub parameters: Option<ProviderParameters>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DecryptConfig {
    #[serde(rename = "Parameters", default)]
    pub parameters: Option<ProviderParameters>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyWrapOutput {
    pub keywrapresults: KeyWrapResults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyWrapResults {
    pub annotation: Base64Bytes,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyUnwrapOutput {
    pub keyunwrapresults: KeyUnwrapResults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyUnwrapResults {
    pub optsdata: Base64Bytes,
}

/// Decode a request envelope. Any malformed JSON or unknown operation
/// tag is a caller error.
pub fn decode(envelope: &[u8]) -> Result<KeyProviderInput, KeyProviderError> {
    serde_json::from_slice(envelope).map_err(KeyProviderError::InvalidProtocol)
}

/// Encode a response envelope. Only fails on a serialization fault,
/// never on a well-formed output value.
pub fn encode<T: Serialize>(output: &T) -> Result<Vec<u8>, KeyProviderError> {
    serde_json::to_vec(output).map_err(|err| KeyProviderError::Serialize("protocol output", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keywrap_envelope() {
        let envelope = br#"{
            "op": "keywrap",
            "keywrapparams": {
                "ec": {"Parameters": {"aws": ["YXJuOmV4YW1wbGU="]}},
                "optsdata": "c2VjcmV0"
            }
        }"#;
        let input = decode(envelope).unwrap();
        assert_eq!(input.op, Operation::KeyWrap);
        let params = input.keywrapparams.ec.unwrap().parameters.unwrap();
        assert_eq!(params["aws"][0].as_slice(), b"arn:example");
        assert_eq!(input.keywrapparams.optsdata.unwrap().as_slice(), b"secret");
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, KeyProviderError::InvalidProtocol(_)));
    }

    #[test]
    fn decode_rejects_unknown_operation() {
        let err = decode(br#"{"op": "keyrotate"}"#).unwrap_err();
        assert!(matches!(err, KeyProviderError::InvalidProtocol(_)));
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let err = decode(br#"{"op": "keywrap", "keywrapparams": {"optsdata": "%%%"}}"#).unwrap_err();
        assert!(matches!(err, KeyProviderError::InvalidProtocol(_)));
    }

    #[test]
    fn null_parameters_decode_as_absent() {
        let input = decode(br#"{"op": "keywrap", "keywrapparams": {"ec": {"Parameters": null}}}"#).unwrap();
        assert!(input.keywrapparams.ec.unwrap().parameters.is_none());
    }

    #[test]
    fn encode_wrap_output_is_base64() {
        let output = KeyWrapOutput { keywrapresults: KeyWrapResults { annotation: b"ann".as_slice().into() } };
        let bytes = encode(&output).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["keywrapresults"]["annotation"], "YW5u");
    }

    #[test]
    fn unwrap_output_round_trips() {
        let output = KeyUnwrapOutput { keyunwrapresults: KeyUnwrapResults { optsdata: b"plain".as_slice().into() } };
        let bytes = encode(&output).unwrap();
        let parsed: KeyUnwrapOutput = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.keyunwrapresults.optsdata.as_slice(), b"plain");
    }
}
