mod cli;
mod setup;

use crate::cli::Cli;
use kms_keyprovider::error::KeyProviderError;
use kms_keyprovider::pb::key_provider_service_server::KeyProviderServiceServer;
use kms_keyprovider::service::KeyProviderService;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    setup::init_logging(&args.log_level)?;
    info!(
        "kms-keyprovider starting listen={} keyprovider={} backend={}",
        args.listen, args.keyprovider_name, args.kms_backend
    );

    if let Some(path) = &args.ocicrypt_config {
        setup::write_ocicrypt_config(path, &args.keyprovider_name, args.listen.port())?;
    }

    // An unregistered backend name is fatal: the service never starts
    // serving with a backend it cannot reach.
    let registry = setup::build_registry().await;
    let provider = registry.lookup(&args.kms_backend).ok_or_else(|| {
        KeyProviderError::Config(format!(
            "kms backend {} is not registered (available: {})",
            args.kms_backend,
            registry.names().join(", ")
        ))
    })?;

    let service = KeyProviderService::new(provider, args.keyprovider_name.clone());
    info!("serving grpc on {}", args.listen);
    Server::builder()
        .add_service(KeyProviderServiceServer::new(service))
        .serve_with_shutdown(args.listen, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
