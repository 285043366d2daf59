//! gRPC key-provider plugin for container-image encryption.
//!
//! Implements the ocicrypt keyprovider protocol: `WrapKey` encrypts a
//! content-encryption key under a KMS master key and returns an
//! annotation record for the image manifest; `UnWrapKey` takes that
//! annotation back and recovers the key. The KMS itself is a pluggable
//! backend behind [`kms::KmsProvider`].

pub mod annotation;
pub mod error;
pub mod kms;
pub mod protocol;
pub mod service;

/// Generated protobuf types for the keyprovider gRPC contract.
pub mod pb {
    tonic::include_proto!("keyprovider");
}
