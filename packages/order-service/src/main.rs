//! order-service binary: parse configuration, set up logging, run the
//! gRPC server until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use orderflow_order_service::{OrderServer, ServiceConfig, TlsConfig};

#[derive(Debug, Parser)]
#[command(name = "order-service", about = "orderflow order backend")]
struct Args {
    /// Bind address.
    #[arg(long, env = "ORDER_SERVICE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port.
    #[arg(long, env = "ORDER_SERVICE_PORT", default_value_t = 50051)]
    port: u16,

    /// PEM certificate path; enables TLS together with --tls-key.
    #[arg(long, env = "ORDER_SERVICE_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key path.
    #[arg(long, env = "ORDER_SERVICE_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn into_config(self) -> ServiceConfig {
        let tls = match (self.tls_cert, self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            _ => None,
        };
        ServiceConfig {
            host: self.host,
            port: self.port,
            tls,
            ..ServiceConfig::default()
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut server = OrderServer::new(args.into_config());
    server.start().await?;
    server.serve(termination_signal()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_json);

    if let Err(err) = run(args).await {
        error!("order service failed: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
