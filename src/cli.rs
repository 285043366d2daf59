use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kms-keyprovider")]
#[command(about = "ocicrypt key-provider gRPC service backed by a cloud KMS", long_about = None)]
pub struct Cli {
    /// Address to bind the gRPC server to
    #[arg(short, long, default_value = "0.0.0.0:9666")]
    pub listen: SocketAddr,

    /// Name of this keyprovider in the ocicrypt configuration
    #[arg(short, long, default_value = "kms-crypt")]
    pub keyprovider_name: String,

    /// Which KMS backend to use. Implemented backends: aws
    #[arg(short = 'b', long, default_value = "aws")]
    pub kms_backend: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write an ocicrypt keyprovider client config to this path on startup
    #[arg(long)]
    pub ocicrypt_config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
