//! Wire-event telemetry shared by the backend and the gateway.
//!
//! Both services attach request/response payload snapshots to the active
//! trace span and emit one correlated structured log line per snapshot. The
//! snapshot is modeled as an explicit [`WireEvent`] record handed to a
//! [`TelemetrySink`] injected into each component, so the components never
//! build ad hoc log payloads inline.

use std::sync::Mutex;

/// Whether a wire event captures the inbound request or the outbound response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

/// A request or response payload snapshot, keyed by the trace identifier
/// shared across the request's hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    /// Correlation token shared by every hop of one request.
    pub trace_id: String,
    /// Operation name (RPC method, or HTTP method + path at the gateway).
    pub operation: String,
    pub direction: Direction,
    /// Serialized payload, already rendered to its wire form.
    pub payload: String,
    /// HTTP status code, set on gateway response events only.
    pub status: Option<u16>,
}

impl WireEvent {
    #[must_use]
    pub fn request(
        trace_id: impl Into<String>,
        operation: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            operation: operation.into(),
            direction: Direction::Request,
            payload: payload.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn response(
        trace_id: impl Into<String>,
        operation: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            operation: operation.into(),
            direction: Direction::Response,
            payload: payload.into(),
            status: None,
        }
    }

    /// Tags a response event with the HTTP status it was sent with.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Capability that attaches a [`WireEvent`] to the active span and writes the
/// correlated log line. Components hold this behind `Arc<dyn TelemetrySink>`.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &WireEvent);
}

/// Production sink: one structured `tracing` event per snapshot, emitted
/// inside the caller's active span so subscribers can fold the payload into
/// span attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &WireEvent) {
        match event.status {
            Some(status) => tracing::info!(
                target: "orderflow::wire",
                trace_id = %event.trace_id,
                operation = %event.operation,
                direction = event.direction.as_str(),
                status,
                body = %event.payload,
                "{}",
                event.direction.as_str(),
            ),
            None => tracing::info!(
                target: "orderflow::wire",
                trace_id = %event.trace_id,
                operation = %event.operation,
                direction = event.direction.as_str(),
                body = %event.payload,
                "{}",
                event.direction.as_str(),
            ),
        }
    }
}

/// In-memory sink for tests: captures every recorded event for assertion.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<WireEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all events recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the internal lock panicked.
    #[must_use]
    pub fn events(&self) -> Vec<WireEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: &WireEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
