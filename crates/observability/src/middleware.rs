//! Request-Timing Middleware fuer Axum
//!
//! Misst die Antwortzeit jeder HTTP-Anfrage und protokolliert sie als
//! strukturiertes Log-Event. WebSocket-Upgrades erscheinen hier nur mit
//! der Dauer des Handshakes.

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    middleware::Next,
};
use std::time::Instant;

/// Axum-Middleware-Funktion: misst Antwortzeit und loggt strukturiert.
///
/// Serverfehler werden als `warn` geloggt, alles andere als `debug`.
///
/// Verwendung:
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn(timing_middleware))
/// ```
pub async fn timing_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let methode = req.method().clone();
    let pfad = req.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;

    let dauer_ms = start.elapsed().as_millis();
    let status = response.status();
    let ws_upgrade = status == StatusCode::SWITCHING_PROTOCOLS;

    if status.is_server_error() {
        tracing::warn!(
            method = %methode,
            path = %pfad,
            status = status.as_u16(),
            duration_ms = dauer_ms,
            "HTTP-Anfrage fehlgeschlagen"
        );
    } else {
        tracing::debug!(
            method = %methode,
            path = %pfad,
            status = status.as_u16(),
            ws_upgrade,
            duration_ms = dauer_ms,
            "HTTP-Anfrage abgeschlossen"
        );
    }

    response
}
