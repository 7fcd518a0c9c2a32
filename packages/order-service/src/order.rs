//! Order domain types and their wire/JSON renderings.

use chrono::{DateTime, SecondsFormat, Utc};
use orderflow_core::rpc;
use serde_json::json;

/// Lifecycle state of an order.
///
/// Creation only ever produces `Pending` today; the enum (rather than a bare
/// string) gives future transition logic a typed extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

/// A stored order record.
///
/// Immutable after insertion: the store hands out clones, never a handle
/// that permits mutation of what it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub quantity: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Renders the record into its RPC wire shape.
    #[must_use]
    pub fn to_wire(&self) -> rpc::Order {
        // Sub-second nanos are < 1e9 and always fit in i32.
        let nanos = i32::try_from(self.created_at.timestamp_subsec_nanos()).unwrap_or_default();
        rpc::Order {
            id: self.id.clone(),
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            status: self.status.as_str().to_string(),
            created_at: Some(prost_types::Timestamp {
                seconds: self.created_at.timestamp(),
                nanos,
            }),
        }
    }

    /// JSON snapshot used for wire-event payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "product_id": self.product_id,
            "quantity": self.quantity,
            "status": self.status.as_str(),
            "created_at": self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Order {
        Order {
            id: "order-1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn status_renders_pending() {
        assert_eq!(OrderStatus::Pending.as_str(), "pending");
    }

    #[test]
    fn wire_shape_carries_all_fields() {
        let wire = sample().to_wire();
        assert_eq!(wire.id, "order-1");
        assert_eq!(wire.product_id, "p1");
        assert_eq!(wire.quantity, 3);
        assert_eq!(wire.status, "pending");

        let ts = wire.created_at.expect("created_at always set");
        assert_eq!(ts.seconds, sample().created_at.timestamp());
        assert_eq!(ts.nanos, 0);
    }

    #[test]
    fn json_snapshot_uses_rfc3339() {
        let value = sample().to_json();
        assert_eq!(value["created_at"], "2024-05-01T12:30:00Z");
        assert_eq!(value["quantity"], 3);
        assert_eq!(value["status"], "pending");
    }
}
