//! Configuration types for the gateway.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address for the HTTP server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for an HTTP request to complete.
    pub request_timeout: Duration,
    /// Backend (order service) connection settings.
    pub backend: BackendConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tls: None,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            backend: BackendConfig::default(),
        }
    }
}

/// Where and how to reach the order service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend address as `host:port`, without a scheme.
    pub addr: String,
    /// Deadline for each forwarded call.
    pub call_timeout: Duration,
    /// Time budget for the single startup dial.
    pub connect_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            addr: "localhost:50051".to_string(),
            call_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl BackendConfig {
    /// The dial target as a URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// TLS certificate configuration.
///
/// No `Default` impl because certificate paths have no sensible defaults.
/// Missing or mismatched files are a fatal startup error.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the PEM certificate file.
    pub cert_path: PathBuf,
    /// Path to the PEM private key file.
    pub key_path: PathBuf,
}
