//! gRPC-facing façade over the order store.
//!
//! Validation lives at the gateway, so this layer trusts its callers. Each
//! call records a request and a response wire event through the injected
//! telemetry sink, keyed by the trace identifier carried in `x-request-id`
//! request metadata (one is generated for callers that send none).

use std::sync::Arc;

use orderflow_core::rpc::{
    CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse,
    ListOrdersRequest, ListOrdersResponse, OrderService,
};
use orderflow_core::shutdown::ShutdownController;
use orderflow_core::telemetry::{TelemetrySink, WireEvent};
use serde_json::json;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::store::OrderStore;

/// Implements the generated [`OrderService`] trait over a shared store.
///
/// Introduces no failure modes of its own: every RPC completes with an OK
/// status, and an unknown order id is answered with the absent-marker
/// (`order: None`), not an error.
pub struct OrderServiceHandler {
    store: Arc<OrderStore>,
    sink: Arc<dyn TelemetrySink>,
    shutdown: Arc<ShutdownController>,
}

impl OrderServiceHandler {
    pub fn new(
        store: Arc<OrderStore>,
        sink: Arc<dyn TelemetrySink>,
        shutdown: Arc<ShutdownController>,
    ) -> Self {
        Self {
            store,
            sink,
            shutdown,
        }
    }
}

/// Reads the shared trace identifier from request metadata, generating one
/// for callers that did not send any.
fn trace_id_from(metadata: &tonic::metadata::MetadataMap) -> String {
    metadata
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string)
}

#[tonic::async_trait]
impl OrderService for OrderServiceHandler {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let _guard = self.shutdown.track();
        let trace_id = trace_id_from(request.metadata());
        let req = request.into_inner();

        self.sink.record(&WireEvent::request(
            &trace_id,
            "CreateOrder",
            json!({ "product_id": req.product_id, "quantity": req.quantity }).to_string(),
        ));

        let order = self.store.create(&req.product_id, req.quantity);

        self.sink.record(&WireEvent::response(
            &trace_id,
            "CreateOrder",
            order.to_json().to_string(),
        ));

        Ok(Response::new(CreateOrderResponse {
            order: Some(order.to_wire()),
        }))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<GetOrderResponse>, Status> {
        let _guard = self.shutdown.track();
        let trace_id = trace_id_from(request.metadata());
        let req = request.into_inner();

        self.sink.record(&WireEvent::request(
            &trace_id,
            "GetOrder",
            json!({ "id": req.id }).to_string(),
        ));

        let order = self.store.get(&req.id);

        let payload = order
            .as_ref()
            .map_or_else(|| "null".to_string(), |o| o.to_json().to_string());
        self.sink
            .record(&WireEvent::response(&trace_id, "GetOrder", payload));

        Ok(Response::new(GetOrderResponse {
            order: order.map(|o| o.to_wire()),
        }))
    }

    async fn list_orders(
        &self,
        request: Request<ListOrdersRequest>,
    ) -> Result<Response<ListOrdersResponse>, Status> {
        let _guard = self.shutdown.track();
        let trace_id = trace_id_from(request.metadata());
        let req = request.into_inner();

        self.sink.record(&WireEvent::request(
            &trace_id,
            "ListOrders",
            json!({ "product_id": req.product_id }).to_string(),
        ));

        let filter = if req.product_id.is_empty() {
            None
        } else {
            Some(req.product_id.as_str())
        };
        let orders = self.store.list(filter);

        let snapshot: Vec<serde_json::Value> = orders.iter().map(|o| o.to_json()).collect();
        self.sink.record(&WireEvent::response(
            &trace_id,
            "ListOrders",
            serde_json::Value::Array(snapshot).to_string(),
        ));

        Ok(Response::new(ListOrdersResponse {
            orders: orders.iter().map(|o| o.to_wire()).collect(),
        }))
    }
}
