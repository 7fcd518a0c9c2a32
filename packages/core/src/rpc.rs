//! Order RPC contract -- prost message types plus the tonic-generated
//! `OrderService` server trait and client.
//!
//! The wire format is standard protobuf; message types carry prost derives
//! directly and the service is defined in `build.rs` via manual codegen, so
//! the contract lives entirely in this file.
//!
//! ## Operations
//!
//! - `CreateOrder` -- allocate and store a new order, return it.
//! - `GetOrder` -- look up one order by id; absence is `order: None`, not an
//!   error status.
//! - `ListOrders` -- all orders, or those matching a `product_id` filter.

/// A stored order as it travels over the wire.
///
/// `created_at` is optional at the protobuf level; the backend always sets
/// it, but renderers must tolerate its absence (empty string).
#[derive(Clone, PartialEq, prost::Message)]
pub struct Order {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub product_id: String,
    #[prost(int32, tag = "3")]
    pub quantity: i32,
    #[prost(string, tag = "4")]
    pub status: String,
    #[prost(message, optional, tag = "5")]
    pub created_at: Option<prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateOrderRequest {
    #[prost(string, tag = "1")]
    pub product_id: String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateOrderResponse {
    #[prost(message, optional, tag = "1")]
    pub order: Option<Order>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetOrderRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

/// `order` is `None` when the id is unknown -- the absent-marker response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetOrderResponse {
    #[prost(message, optional, tag = "1")]
    pub order: Option<Order>,
}

/// An empty `product_id` means "no filter".
#[derive(Clone, PartialEq, prost::Message)]
pub struct ListOrdersRequest {
    #[prost(string, tag = "1")]
    pub product_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListOrdersResponse {
    #[prost(message, repeated, tag = "1")]
    pub orders: Vec<Order>,
}

include!(concat!(env!("OUT_DIR"), "/orderflow.v1.OrderService.rs"));

pub use order_service_client::OrderServiceClient;
pub use order_service_server::{OrderService, OrderServiceServer};

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn order_round_trips_through_protobuf() {
        let order = Order {
            id: "o-1".to_string(),
            product_id: "p-1".to_string(),
            quantity: 3,
            status: "pending".to_string(),
            created_at: Some(prost_types::Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
        };

        let bytes = order.encode_to_vec();
        let decoded = Order::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn absent_order_decodes_as_none() {
        let resp = GetOrderResponse { order: None };
        let bytes = resp.encode_to_vec();
        let decoded = GetOrderResponse::decode(bytes.as_slice()).unwrap();
        assert!(decoded.order.is_none());
    }

    #[test]
    fn list_request_default_is_unfiltered() {
        let req = ListOrdersRequest::default();
        assert!(req.product_id.is_empty());
    }
}
