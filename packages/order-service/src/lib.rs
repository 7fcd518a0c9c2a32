//! orderflow order service -- the backend process owning order records.
//!
//! Orders live in a single in-memory [`store::OrderStore`] and are exposed
//! over the gRPC contract from `orderflow-core`. The store is the only
//! shared mutable state; everything else is request-scoped.

pub mod config;
pub mod order;
pub mod server;
pub mod service;
pub mod store;

pub use config::{ServiceConfig, TlsConfig};
pub use server::OrderServer;
pub use store::OrderStore;
