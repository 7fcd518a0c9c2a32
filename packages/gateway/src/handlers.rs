//! HTTP route handlers: validation, backend forwarding, translation, and
//! failure mapping.
//!
//! Per-request flow for order routes: record the inbound body as a wire
//! event, answer 503 when no backend connection was ever established,
//! validate (400), forward with a bounded deadline (timeout or transport
//! failure becomes an opaque 500, no retry), then record the response body
//! and status before replying.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::SecondsFormat;
use orderflow_core::rpc::{self, CreateOrderRequest, ListOrdersRequest};
use orderflow_core::shutdown::ShutdownController;
use orderflow_core::telemetry::{TelemetrySink, WireEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::timeout;
use tracing::warn;

use crate::client::OrderClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// `None` means the startup dial never succeeded; order routes answer
    /// 503 without attempting a call.
    pub backend: Option<OrderClient>,
    pub sink: Arc<dyn TelemetrySink>,
    /// Deadline applied to each forwarded backend call.
    pub call_timeout: Duration,
    pub shutdown: Arc<ShutdownController>,
    pub start_time: Instant,
}

/// Body accepted by the create-order route.
#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub quantity: i32,
}

/// The stable public order shape returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: String,
    pub product_id: String,
    pub quantity: i32,
    pub status: String,
    pub created_at: String,
}

impl OrderView {
    /// Translates a wire order into the public shape. A missing wire
    /// timestamp renders as an empty string.
    #[must_use]
    pub fn from_wire(order: rpc::Order) -> Self {
        Self {
            id: order.id,
            product_id: order.product_id,
            quantity: order.quantity,
            status: order.status,
            created_at: render_timestamp(order.created_at.as_ref()),
        }
    }
}

/// RFC 3339 rendering of a wire timestamp; empty string when absent or out
/// of range.
fn render_timestamp(ts: Option<&prost_types::Timestamp>) -> String {
    ts.and_then(|t| chrono::DateTime::from_timestamp(t.seconds, u32::try_from(t.nanos).unwrap_or(0)))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// The trace identifier for this request: the `x-request-id` header set by
/// the request-id middleware.
fn trace_id_from(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Records the response wire event and builds the JSON reply.
fn reply(
    state: &AppState,
    trace_id: &str,
    operation: &str,
    status: StatusCode,
    body: serde_json::Value,
) -> Response {
    state.sink.record(
        &WireEvent::response(trace_id, operation, body.to_string()).with_status(status.as_u16()),
    );
    (status, Json(body)).into_response()
}

/// `GET /products` -- placeholder; catalog management is out of scope.
pub async fn products_handler() -> &'static str {
    "Product service"
}

/// `POST /products/{product_id}/orders`
pub async fn create_order_handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let _guard = state.shutdown.track();
    let trace_id = trace_id_from(&headers);
    let operation = format!("POST /products/{product_id}/orders");

    state.sink.record(&WireEvent::request(
        &trace_id,
        &operation,
        String::from_utf8_lossy(&body).into_owned(),
    ));

    let Some(client) = state.backend.clone() else {
        return reply(
            &state,
            &trace_id,
            &operation,
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "order service unavailable" }),
        );
    };
    let mut client = client;

    let Ok(parsed) = serde_json::from_slice::<CreateOrderBody>(&body) else {
        return reply(
            &state,
            &trace_id,
            &operation,
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid request body" }),
        );
    };

    if parsed.quantity <= 0 {
        return reply(
            &state,
            &trace_id,
            &operation,
            StatusCode::BAD_REQUEST,
            json!({ "error": "quantity must be positive" }),
        );
    }

    let request = backend_request(
        CreateOrderRequest {
            product_id: product_id.clone(),
            quantity: parsed.quantity,
        },
        &trace_id,
    );

    match timeout(state.call_timeout, client.create_order(request)).await {
        Ok(Ok(response)) => match response.into_inner().order {
            Some(order) => {
                let view = OrderView::from_wire(order);
                reply(
                    &state,
                    &trace_id,
                    &operation,
                    StatusCode::CREATED,
                    serde_json::to_value(view).unwrap_or_default(),
                )
            }
            None => {
                warn!(trace_id, "backend returned an empty create response");
                reply(
                    &state,
                    &trace_id,
                    &operation,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "failed to create order" }),
                )
            }
        },
        Ok(Err(status)) => {
            warn!(trace_id, %status, "create order call failed");
            reply(
                &state,
                &trace_id,
                &operation,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to create order" }),
            )
        }
        Err(_) => {
            warn!(trace_id, "create order call exceeded its deadline");
            reply(
                &state,
                &trace_id,
                &operation,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to create order" }),
            )
        }
    }
}

/// `GET /products/{product_id}/orders`
pub async fn list_orders_handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let _guard = state.shutdown.track();
    let trace_id = trace_id_from(&headers);
    let operation = format!("GET /products/{product_id}/orders");

    state
        .sink
        .record(&WireEvent::request(&trace_id, &operation, ""));

    let Some(client) = state.backend.clone() else {
        return reply(
            &state,
            &trace_id,
            &operation,
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "order service unavailable" }),
        );
    };
    let mut client = client;

    let request = backend_request(
        ListOrdersRequest {
            product_id: product_id.clone(),
        },
        &trace_id,
    );

    match timeout(state.call_timeout, client.list_orders(request)).await {
        Ok(Ok(response)) => {
            let orders: Vec<OrderView> = response
                .into_inner()
                .orders
                .into_iter()
                .map(OrderView::from_wire)
                .collect();
            reply(
                &state,
                &trace_id,
                &operation,
                StatusCode::OK,
                serde_json::to_value(orders).unwrap_or_default(),
            )
        }
        Ok(Err(status)) => {
            warn!(trace_id, %status, "list orders call failed");
            reply(
                &state,
                &trace_id,
                &operation,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to list orders" }),
            )
        }
        Err(_) => {
            warn!(trace_id, "list orders call exceeded its deadline");
            reply(
                &state,
                &trace_id,
                &operation,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to list orders" }),
            )
        }
    }
}

/// `GET /health` -- gateway health snapshot.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "state": state.shutdown.state().as_str(),
        "backend_connected": state.backend.is_some(),
        "in_flight": state.shutdown.in_flight(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Wraps a message in a tonic request carrying the trace identifier as
/// `x-request-id` metadata.
fn backend_request<T>(message: T, trace_id: &str) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    if let Ok(value) = trace_id.parse() {
        request.metadata_mut().insert("x-request-id", value);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::telemetry::{Direction, MemorySink};

    fn disconnected_state(sink: Arc<MemorySink>) -> AppState {
        AppState {
            backend: None,
            sink,
            call_timeout: Duration::from_secs(5),
            shutdown: Arc::new(ShutdownController::new()),
            start_time: Instant::now(),
        }
    }

    #[test]
    fn from_wire_translates_every_field() {
        let view = OrderView::from_wire(rpc::Order {
            id: "o-1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            status: "pending".to_string(),
            created_at: Some(prost_types::Timestamp {
                seconds: 1_714_566_600,
                nanos: 0,
            }),
        });

        assert_eq!(view.id, "o-1");
        assert_eq!(view.product_id, "p1");
        assert_eq!(view.quantity, 3);
        assert_eq!(view.status, "pending");
        assert_eq!(view.created_at, "2024-05-01T12:30:00Z");
    }

    #[test]
    fn missing_timestamp_renders_empty_string() {
        let view = OrderView::from_wire(rpc::Order {
            id: "o-1".to_string(),
            product_id: "p1".to_string(),
            quantity: 1,
            status: "pending".to_string(),
            created_at: None,
        });
        assert_eq!(view.created_at, "");
    }

    #[test]
    fn backend_request_carries_trace_metadata() {
        let request = backend_request(
            ListOrdersRequest {
                product_id: "p1".to_string(),
            },
            "trace-9",
        );
        let value = request.metadata().get("x-request-id").unwrap();
        assert_eq!(value.to_str().unwrap(), "trace-9");
    }

    #[tokio::test]
    async fn create_without_backend_is_503_before_validation() {
        let sink = Arc::new(MemorySink::new());
        let state = disconnected_state(Arc::clone(&sink));

        // Even a body that would fail validation gets 503 first: no
        // connection means no work is attempted.
        let response = create_order_handler(
            State(state),
            Path("p1".to_string()),
            HeaderMap::new(),
            Bytes::from_static(b"{\"quantity\":0}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].direction, Direction::Request);
        assert_eq!(events[1].status, Some(503));
    }

    #[tokio::test]
    async fn list_without_backend_is_503() {
        let sink = Arc::new(MemorySink::new());
        let state = disconnected_state(Arc::clone(&sink));

        let response =
            list_orders_handler(State(state), Path("p1".to_string()), HeaderMap::new()).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_disconnected_backend() {
        let sink = Arc::new(MemorySink::new());
        let state = disconnected_state(sink);
        state.shutdown.set_ready();

        let Json(body) = health_handler(State(state)).await;
        assert_eq!(body["state"], "ready");
        assert_eq!(body["backend_connected"], false);
        assert_eq!(body["in_flight"], 0);
    }
}
