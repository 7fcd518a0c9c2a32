//! Server lifecycle for the order service.
//!
//! Deferred startup: `new()` allocates shared state, `start()` binds the
//! TCP listener, and `serve()` accepts calls until the shutdown future
//! resolves. Splitting bind from serve lets bootstrap code report a bind
//! failure as a fatal startup error and lets tests run on an OS-assigned
//! port.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use orderflow_core::rpc::OrderServiceServer;
use orderflow_core::shutdown::ShutdownController;
use orderflow_core::telemetry::{TelemetrySink, TracingSink};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::service::OrderServiceHandler;
use crate::store::OrderStore;

/// Manages the gRPC server lifecycle around one [`OrderStore`].
pub struct OrderServer {
    config: ServiceConfig,
    listener: Option<TcpListener>,
    store: Arc<OrderStore>,
    shutdown: Arc<ShutdownController>,
    sink: Arc<dyn TelemetrySink>,
}

impl OrderServer {
    /// Creates a server without binding any port.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            listener: None,
            store: Arc::new(OrderStore::new()),
            shutdown: Arc::new(ShutdownController::new()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the telemetry sink. Tests inject a capturing sink here.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Shared handle to the store, for inspection in tests.
    #[must_use]
    pub fn store(&self) -> Arc<OrderStore> {
        Arc::clone(&self.store)
    }

    /// Shared handle to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Binds the TCP listener and returns the actual bound port (useful
    /// when the configured port is 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound; bootstrap treats
    /// this as fatal.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!("order service listening on {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Accepts calls until `shutdown` resolves, then stops accepting,
    /// drains in-flight calls, and releases the socket.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TLS material or a fatal transport error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called first.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Self {
            config,
            listener,
            store,
            shutdown: shutdown_ctrl,
            sink,
        } = self;
        let listener = listener.expect("start() must be called before serve()");

        let handler =
            OrderServiceHandler::new(store, sink, Arc::clone(&shutdown_ctrl));

        let mut builder = tonic::transport::Server::builder();
        if let Some(ref tls) = config.tls {
            let cert = tokio::fs::read(&tls.cert_path)
                .await
                .with_context(|| format!("failed to read {}", tls.cert_path.display()))?;
            let key = tokio::fs::read(&tls.key_path)
                .await
                .with_context(|| format!("failed to read {}", tls.key_path.display()))?;
            let identity = tonic::transport::Identity::from_pem(cert, key);
            builder = builder
                .tls_config(tonic::transport::ServerTlsConfig::new().identity(identity))
                .context("invalid TLS certificate/key pair")?;
            info!("TLS enabled");
        }

        shutdown_ctrl.set_ready();

        builder
            .add_service(OrderServiceServer::new(handler))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
            .context("gRPC server error")?;

        shutdown_ctrl.begin_drain();
        if shutdown_ctrl.drain(config.drain_timeout).await {
            info!("all in-flight calls drained");
        } else {
            warn!("drain timeout expired with calls still in flight");
        }
        Ok(())
    }
}
