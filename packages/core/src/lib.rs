//! orderflow core -- the order RPC contract, the shared wire-event telemetry
//! hook, and the graceful-shutdown controller used by both services.

pub mod rpc;
pub mod shutdown;
pub mod telemetry;

pub use shutdown::{HealthState, InFlightGuard, ShutdownController};
pub use telemetry::{Direction, MemorySink, TelemetrySink, TracingSink, WireEvent};
