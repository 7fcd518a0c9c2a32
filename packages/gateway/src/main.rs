//! gateway binary: parse configuration, set up logging, dial the backend
//! once, and serve HTTP until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use orderflow_gateway::{Gateway, GatewayConfig, TlsConfig};

#[derive(Debug, Parser)]
#[command(name = "gateway", about = "orderflow HTTP gateway")]
struct Args {
    /// Bind address.
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port.
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 3000)]
    port: u16,

    /// Order service address as host:port.
    #[arg(long, env = "ORDER_SERVICE_ADDR", default_value = "localhost:50051")]
    order_service_addr: String,

    /// PEM certificate path; enables TLS together with --tls-key.
    #[arg(long, env = "GATEWAY_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key path.
    #[arg(long, env = "GATEWAY_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn into_config(self) -> GatewayConfig {
        let tls = match (self.tls_cert, self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            _ => None,
        };
        let mut config = GatewayConfig {
            host: self.host,
            port: self.port,
            tls,
            ..GatewayConfig::default()
        };
        config.backend.addr = self.order_service_addr;
        config
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
    let mut gateway = Gateway::new(args.into_config());
    gateway.connect_backend().await;
    gateway.start().await?;
    gateway.serve(termination_signal()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_json);

    if let Err(err) = run(args).await {
        error!("gateway failed: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
