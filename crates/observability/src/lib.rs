//! # syncmusic-observability
//!
//! Observability-Crate fuer syncmusic:
//! - Status-Endpunkt (`/` und `/status`)
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod status;

pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, RelayMetrics};
pub use middleware::timing_middleware;
pub use status::{status_router, RelayStatus, StatusQuelle, StatusResponse, StatusWert};
