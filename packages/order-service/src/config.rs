//! Configuration types for the order service.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the backend server.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind address.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
    /// Maximum time to wait for in-flight calls during shutdown.
    pub drain_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            tls: None,
            drain_timeout: Duration::from_secs(30),
        }
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
