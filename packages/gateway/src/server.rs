//! Gateway server lifecycle.
//!
//! Deferred startup: `new()` allocates shared state, `connect_backend()`
//! performs the single dial to the order service, `start()` binds the TCP
//! listener, and `serve()` accepts connections (plain or TLS) until the
//! shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use orderflow_core::shutdown::ShutdownController;
use orderflow_core::telemetry::{TelemetrySink, TracingSink};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::client::{self, OrderClient};
use crate::config::GatewayConfig;
use crate::handlers::{
    create_order_handler, health_handler, list_orders_handler, products_handler, AppState,
};
use crate::middleware::build_http_layers;

/// How long `serve` waits for in-flight requests after the shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Manages the HTTP server lifecycle and the backend connection state.
pub struct Gateway {
    config: GatewayConfig,
    listener: Option<TcpListener>,
    backend: Option<OrderClient>,
    shutdown: Arc<ShutdownController>,
    sink: Arc<dyn TelemetrySink>,
    start_time: Instant,
}

impl Gateway {
    /// Creates a gateway in the disconnected state, without binding a port.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            listener: None,
            backend: None,
            shutdown: Arc::new(ShutdownController::new()),
            sink: Arc::new(TracingSink),
            start_time: Instant::now(),
        }
    }

    /// Replaces the telemetry sink. Tests inject a capturing sink here.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Shared handle to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Whether the startup dial succeeded.
    #[must_use]
    pub fn backend_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Dials the order service once. On failure the gateway stays
    /// disconnected and order routes answer 503; there is no retry.
    pub async fn connect_backend(&mut self) {
        match client::connect(&self.config.backend).await {
            Ok(client) => {
                info!("connected to order service at {}", self.config.backend.addr);
                self.backend = Some(client);
            }
            Err(err) => {
                warn!(
                    "failed to connect to order service at {}: {err}",
                    self.config.backend.addr
                );
            }
        }
    }

    /// Assembles the axum router with all routes and middleware.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let state = AppState {
            backend: self.backend.clone(),
            sink: Arc::clone(&self.sink),
            call_timeout: self.config.backend.call_timeout,
            shutdown: Arc::clone(&self.shutdown),
            start_time: self.start_time,
        };

        let layers = build_http_layers(&self.config);

        Router::new()
            .route("/products", get(products_handler))
            .route(
                "/products/{product_id}/orders",
                post(create_order_handler).get(list_orders_handler),
            )
            .route("/health", get(health_handler))
            .layer(layers)
            .with_state(state)
    }

    /// Binds the TCP listener and returns the actual bound port.
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

        info!("gateway listening on {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TLS material or a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called first.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let shutdown_ctrl = Arc::clone(&self.shutdown);
        let tls = self.config.tls.clone();

        shutdown_ctrl.set_ready();

        if let Some(ref tls) = tls {
            serve_tls(listener, router, tls, &shutdown_ctrl, shutdown).await
        } else {
            serve_plain(listener, router, &shutdown_ctrl, shutdown).await
        }
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown_ctrl: &ShutdownController,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    drain(shutdown_ctrl).await;
    Ok(())
}

/// Serves TLS connections via `axum-server` with rustls, reusing the
/// pre-bound listener. Unreadable or mismatched PEM files fail here, before
/// any request is accepted.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls: &crate::config::TlsConfig,
    shutdown_ctrl: &ShutdownController,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!("serving TLS connections on {addr}");

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    drain(shutdown_ctrl).await;
    Ok(())
}

async fn drain(shutdown_ctrl: &ShutdownController) {
    shutdown_ctrl.begin_drain();
    if shutdown_ctrl.drain(DRAIN_TIMEOUT).await {
        info!("all in-flight requests drained");
    } else {
        warn!("drain timeout expired with in-flight requests remaining");
    }
}
