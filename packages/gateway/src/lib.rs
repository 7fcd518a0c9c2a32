//! orderflow gateway -- the HTTP-facing process.
//!
//! Validates caller input, forwards order operations to the backend over
//! gRPC with a per-call deadline, and translates results into a stable
//! public JSON shape.

pub mod client;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::{BackendConfig, GatewayConfig, TlsConfig};
pub use server::Gateway;
