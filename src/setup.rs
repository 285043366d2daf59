use kms_keyprovider::error::KeyProviderError;
use kms_keyprovider::kms::{AwsKms, ProviderRegistry};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn init_logging(level: &str) -> Result<(), KeyProviderError> {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .map_err(|err| KeyProviderError::Config(err.to_string()))?;
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
    Ok(())
}

/// Build the backend registry. Every implemented backend is
/// constructed here, explicitly, before the server accepts requests.
pub async fn build_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("aws", Arc::new(AwsKms::from_env().await));
    registry
}

#[derive(Debug, Serialize)]
struct OcicryptKeyproviderConfig {
    #[serde(rename = "key-providers")]
    key_providers: HashMap<String, GrpcEndpoint>,
}

#[derive(Debug, Serialize)]
struct GrpcEndpoint {
    grpc: String,
}

/// Write the client-side ocicrypt keyprovider config so that container
/// tooling on this host can find the service. The advertised address
/// comes from `POD_IP` when set (in-cluster), falling back to
/// localhost.
pub fn write_ocicrypt_config(path: &Path, keyprovider_name: &str, port: u16) -> Result<(), KeyProviderError> {
    let host = std::env::var("POD_IP").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mut key_providers = HashMap::new();
    key_providers.insert(keyprovider_name.to_string(), GrpcEndpoint { grpc: format!("{host}:{port}") });
    let config = OcicryptKeyproviderConfig { key_providers };

    let body = serde_json::to_vec_pretty(&config)
        .map_err(|err| KeyProviderError::Config(format!("marshal ocicrypt config: {err}")))?;
    std::fs::write(path, body)
        .map_err(|err| KeyProviderError::Config(format!("write ocicrypt config {}: {err}", path.display())))?;
    info!(path = %path.display(), keyprovider = %keyprovider_name, "wrote ocicrypt keyprovider config");
    Ok(())
}
