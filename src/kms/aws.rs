//! AWS KMS backend.

use crate::error::KeyProviderError;
use crate::kms::KmsProvider;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::primitives::Blob;
use tracing::debug;

pub struct AwsKms {
    client: aws_sdk_kms::Client,
}

impl AwsKms {
    /// Build a client from ambient configuration: environment
    /// variables, shared credentials/config files, or the instance
    /// role. Credentials are resolved lazily on the first call.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self { client: aws_sdk_kms::Client::new(&sdk_config) }
    }
}

#[async_trait]
impl KmsProvider for AwsKms {
    async fn encrypt(&self, plaintext: &[u8], key_id: &str) -> Result<Vec<u8>, KeyProviderError> {
        let resp = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .send()
            .await
            .map_err(|err| KeyProviderError::Backend(format!("kms encrypt: {err}")))?;
        let blob = resp
            .ciphertext_blob()
            .ok_or_else(|| KeyProviderError::Backend("kms encrypt response missing ciphertext".to_string()))?;
        debug!(key_id = %key_id, ciphertext_len = blob.as_ref().len(), "kms encrypt ok");
        Ok(blob.as_ref().to_vec())
    }

    async fn decrypt(&self, ciphertext: &[u8], key_id: &str) -> Result<Vec<u8>, KeyProviderError> {
        let resp = self
            .client
            .decrypt()
            .key_id(key_id)
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|err| KeyProviderError::Backend(format!("kms decrypt: {err}")))?;
        let blob = resp
            .plaintext()
            .ok_or_else(|| KeyProviderError::Backend("kms decrypt response missing plaintext".to_string()))?;
        debug!(key_id = %key_id, plaintext_len = blob.as_ref().len(), "kms decrypt ok");
        Ok(blob.as_ref().to_vec())
    }
}
