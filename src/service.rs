//! Key-provider orchestration: one wrap and one unwrap sequence,
//! stateless per request, no retries, no partial results.

use crate::annotation::AnnotationPacket;
use crate::error::KeyProviderError;
use crate::kms::KmsProvider;
use crate::pb;
use crate::pb::key_provider_service_server::KeyProviderService as KeyProviderServiceGrpc;
use crate::protocol::{self, KeyUnwrapOutput, KeyUnwrapResults, KeyWrapOutput, KeyWrapResults, Operation, ProviderParameters};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

/// Pick the key id for this service out of the multi-recipient
/// parameter map: always the first entry under our own provider name.
/// The id's syntax is left to the backend to validate.
pub fn resolve_key_id(params: &ProviderParameters, own_name: &str) -> Result<String, KeyProviderError> {
    let keys = params.get(own_name).ok_or_else(|| KeyProviderError::MissingProvider(own_name.to_string()))?;
    let first = keys.first().ok_or_else(|| KeyProviderError::MissingKey(own_name.to_string()))?;
    Ok(String::from_utf8_lossy(first.as_slice()).into_owned())
}

pub struct KeyProviderService {
    provider: Arc<dyn KmsProvider>,
    provider_name: String,
}

impl KeyProviderService {
    pub fn new(provider: Arc<dyn KmsProvider>, provider_name: impl Into<String>) -> Self {
        Self { provider, provider_name: provider_name.into() }
    }

    pub async fn wrap(&self, envelope: &[u8]) -> Result<Vec<u8>, KeyProviderError> {
        let input = protocol::decode(envelope)?;
        if input.op != Operation::KeyWrap {
            return Err(KeyProviderError::WrongOperation { expected: "keywrap", actual: input.op.to_string() });
        }

        let params = input
            .keywrapparams
            .ec
            .as_ref()
            .and_then(|ec| ec.parameters.as_ref())
            .ok_or(KeyProviderError::MissingParameters("encryption"))?;
        let key_id = resolve_key_id(params, &self.provider_name)?;

        let opts_data = input.keywrapparams.optsdata.as_ref().map(|b| b.as_slice()).unwrap_or_default();
        let ciphertext = self.provider.encrypt(opts_data, &key_id).await?;
        debug!(key_id = %key_id, plaintext_len = opts_data.len(), ciphertext_len = ciphertext.len(), "wrapped key");

        let annotation = AnnotationPacket::new(key_id, ciphertext).to_bytes()?;
        protocol::encode(&KeyWrapOutput { keywrapresults: KeyWrapResults { annotation: annotation.into() } })
    }

    pub async fn unwrap(&self, envelope: &[u8]) -> Result<Vec<u8>, KeyProviderError> {
        let input = protocol::decode(envelope)?;
        if input.op != Operation::KeyUnwrap {
            return Err(KeyProviderError::WrongOperation { expected: "keyunwrap", actual: input.op.to_string() });
        }

        let params = input
            .keyunwrapparams
            .dc
            .as_ref()
            .and_then(|dc| dc.parameters.as_ref())
            .ok_or(KeyProviderError::MissingParameters("decryption"))?;

        let annotation = input.keyunwrapparams.annotation.as_ref().map(|b| b.as_slice()).unwrap_or_default();
        let packet = AnnotationPacket::from_bytes(annotation)?;

        // The key id comes from the caller-supplied parameters, not
        // from the packet's key_url written at wrap time. Kept this
        // way to match the established plugin behavior.
        let key_id = resolve_key_id(params, &self.provider_name)?;

        let plaintext = self.provider.decrypt(&packet.wrapped_key, &key_id).await?;
        debug!(key_id = %key_id, plaintext_len = plaintext.len(), "unwrapped key");

        protocol::encode(&KeyUnwrapOutput { keyunwrapresults: KeyUnwrapResults { optsdata: plaintext.into() } })
    }
}

#[tonic::async_trait]
impl KeyProviderServiceGrpc for KeyProviderService {
    async fn wrap_key(
        &self,
        request: Request<pb::KeyProviderKeyWrapProtocolInput>,
    ) -> Result<Response<pb::KeyProviderKeyWrapProtocolOutput>, Status> {
        let envelope = request.into_inner().key_provider_key_wrap_protocol_input;
        let out = self.wrap(&envelope).await.map_err(|err| {
            warn!(error = %err, "wrap_key failed");
            Status::from(err)
        })?;
        Ok(Response::new(pb::KeyProviderKeyWrapProtocolOutput { key_provider_key_wrap_protocol_output: out }))
    }

    async fn un_wrap_key(
        &self,
        request: Request<pb::KeyProviderKeyWrapProtocolInput>,
    ) -> Result<Response<pb::KeyProviderKeyWrapProtocolOutput>, Status> {
        let envelope = request.into_inner().key_provider_key_wrap_protocol_input;
        let out = self.unwrap(&envelope).await.map_err(|err| {
            warn!(error = %err, "un_wrap_key failed");
            Status::from(err)
        })?;
        Ok(Response::new(pb::KeyProviderKeyWrapProtocolOutput { key_provider_key_wrap_protocol_output: out }))
    }
}
