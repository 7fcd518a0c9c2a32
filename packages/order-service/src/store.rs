//! In-memory order repository guarded by a single reader/writer lock.
//!
//! The whole collection sits behind one `RwLock`: creates take the write
//! lock, lookups and scans take the read lock and may run concurrently with
//! each other. Records never change after insertion, so no per-record
//! locking exists and readers always see fully written orders.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::order::{Order, OrderStatus};

/// Concurrency-safe keyed collection of [`Order`] records.
///
/// Supports insert and read only -- no update, no delete. Orders survive for
/// the process lifetime; a restart discards everything.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh order, stamps the current time, and inserts it
    /// under the write lock. Returns a clone of the stored record.
    ///
    /// Callers must have validated `quantity > 0`; passing anything else is
    /// a contract violation.
    pub fn create(&self, product_id: &str, quantity: i32) -> Order {
        debug_assert!(quantity > 0, "quantity must be validated before create");

        let order = Order {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            quantity,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        self.orders.write().insert(order.id.clone(), order.clone());
        order
    }

    /// Looks up one order under the read lock. Absence is `None`, never an
    /// error, and the store is left untouched.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Order> {
        self.orders.read().get(id).cloned()
    }

    /// Scans every record under the read lock.
    ///
    /// `None` or an empty filter returns all orders; otherwise only exact
    /// `product_id` matches. Result order is arbitrary -- the backing map has
    /// no defined iteration order and callers must not depend on one.
    #[must_use]
    pub fn list(&self, product_id: Option<&str>) -> Vec<Order> {
        let orders = self.orders.read();
        orders
            .values()
            .filter(|order| match product_id {
                None | Some("") => true,
                Some(filter) => order.product_id == filter,
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}
