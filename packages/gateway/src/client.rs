//! Backend connection management.
//!
//! The gateway dials the order service exactly once at startup. A failed
//! dial leaves it disconnected and every order route answers 503 without
//! attempting a call; there is no reconnection or health re-probe after the
//! initial attempt, so a connection that later dies surfaces as per-call
//! failures instead.

use orderflow_core::rpc::OrderServiceClient;
use tonic::transport::{Channel, Endpoint};

use crate::config::BackendConfig;

/// The connected-state client handle. Cloning is cheap; each request
/// handler clones one off the shared application state.
pub type OrderClient = OrderServiceClient<Channel>;

/// Performs the single startup dial.
///
/// # Errors
///
/// Returns the transport error when the address is invalid or the backend
/// is unreachable; the caller records the gateway as disconnected.
pub async fn connect(config: &BackendConfig) -> Result<OrderClient, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(config.url())?.connect_timeout(config.connect_timeout);
    let channel = endpoint.connect().await?;
    Ok(OrderServiceClient::new(channel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn connect_fails_fast_when_nothing_listens() {
        let config = BackendConfig {
            addr: "127.0.0.1:1".to_string(),
            connect_timeout: Duration::from_millis(200),
            ..BackendConfig::default()
        };
        assert!(connect(&config).await.is_err());
    }

    #[tokio::test]
    async fn connect_rejects_malformed_address() {
        let config = BackendConfig {
            addr: "not a host".to_string(),
            ..BackendConfig::default()
        };
        assert!(connect(&config).await.is_err());
    }
}
