//! Tower middleware stack applied to every gateway HTTP request.
//!
//! Ordering follows the outer-to-inner convention: the first layer listed
//! processes the request first on the way in and the response last on the
//! way out.

use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;

/// The composed Tower layer type produced by [`build_http_layers`].
///
/// Kept as an alias so the builder function signature stays readable; each
/// layer wraps the next in a `Stack`, outermost first.
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        TimeoutLayer,
        tower::layer::util::Stack<
            CorsLayer,
            tower::layer::util::Stack<
                TraceLayer<
                    tower_http::classify::SharedClassifier<
                        tower_http::classify::ServerErrorsAsFailures,
                    >,
                >,
                tower::layer::util::Stack<
                    SetRequestIdLayer<MakeRequestUuid>,
                    tower::layer::util::Identity,
                >,
            >,
        >,
    >,
>;

/// Builds the gateway middleware stack.
///
/// **Ordering (outermost to innermost):**
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id`; this doubles as
///    the trace identifier for wire events and backend metadata
/// 2. `Trace` -- structured request/response spans
/// 3. `CORS` -- based on configured origins
/// 4. `Timeout` -- caps total request processing time
/// 5. `PropagateRequestId` -- echoes `X-Request-Id` on the response
#[must_use]
pub fn build_http_layers(config: &GatewayConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    let cors = build_cors_layer(&config.cors_origins);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// Builds the CORS layer from the configured origin list. A `"*"` entry
/// allows any origin; otherwise each origin is parsed into an allowlist.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn build_http_layers_with_defaults() {
        let _layers = build_http_layers(&GatewayConfig::default());
    }

    #[test]
    fn build_http_layers_with_custom_timeout() {
        let config = GatewayConfig {
            request_timeout: Duration::from_secs(5),
            ..GatewayConfig::default()
        };
        let _layers = build_http_layers(&config);
    }

    #[test]
    fn cors_layer_accepts_explicit_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://shop.example".to_string(),
        ];
        let _cors = build_cors_layer(&origins);
    }
}
