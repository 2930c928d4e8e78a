//! Prometheus-kompatible Metriken fuer syncmusic
//!
//! Registrierte Metriken:
//! - `syncmusic_connected_listeners` – Gauge: Aktuell offene Verbindungen
//! - `syncmusic_commands_applied_total` – Counter: Angewendete Befehle (event)
//! - `syncmusic_commands_rejected_total` – Counter: Verworfene Befehle (reason)
//! - `syncmusic_admin_logins_total` – Counter: Admin-Logins (outcome)
//! - `syncmusic_broadcasts_total` – Counter: Broadcasts an alle Verbindungen
//! - `syncmusic_connections_refused_total` – Counter: Abgelehnte Verbindungen

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Grund fuer einen nicht autorisierten Befehl
pub const GRUND_NICHT_AUTORISIERT: &str = "unauthorized";

/// Grund fuer einen ungueltigen Payload
pub const GRUND_UNGUELTIG: &str = "malformed";

/// Alle syncmusic-Prometheus-Metriken
///
/// Clone teilt die Registry und alle Metrik-Handles.
#[derive(Clone)]
pub struct RelayMetrics {
    pub registry: Arc<Registry>,

    pub connected_listeners: IntGauge,
    pub commands_applied_total: IntCounterVec,
    pub commands_rejected_total: IntCounterVec,
    pub admin_logins_total: IntCounterVec,
    pub broadcasts_total: IntCounter,
    pub connections_refused_total: IntCounter,
}

impl RelayMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let connected_listeners = IntGauge::with_opts(Opts::new(
            "syncmusic_connected_listeners",
            "Anzahl aktuell offener Verbindungen",
        ))?;
        registry.register(Box::new(connected_listeners.clone()))?;

        let commands_applied_total = IntCounterVec::new(
            Opts::new(
                "syncmusic_commands_applied_total",
                "Angewendete mutierende Befehle",
            ),
            &["event"],
        )?;
        registry.register(Box::new(commands_applied_total.clone()))?;

        let commands_rejected_total = IntCounterVec::new(
            Opts::new(
                "syncmusic_commands_rejected_total",
                "Verworfene Befehle (nicht autorisiert oder ungueltig)",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(commands_rejected_total.clone()))?;

        let admin_logins_total = IntCounterVec::new(
            Opts::new("syncmusic_admin_logins_total", "Admin-Login-Versuche"),
            &["outcome"],
        )?;
        registry.register(Box::new(admin_logins_total.clone()))?;

        let broadcasts_total = IntCounter::with_opts(Opts::new(
            "syncmusic_broadcasts_total",
            "Events die an alle Verbindungen gesendet wurden",
        ))?;
        registry.register(Box::new(broadcasts_total.clone()))?;

        let connections_refused_total = IntCounter::with_opts(Opts::new(
            "syncmusic_connections_refused_total",
            "Wegen Verbindungslimit abgelehnte Verbindungen",
        ))?;
        registry.register(Box::new(connections_refused_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_listeners,
            commands_applied_total,
            commands_rejected_total,
            admin_logins_total,
            broadcasts_total,
            connections_refused_total,
        })
    }

    pub fn befehl_angewendet(&self, event: &str) {
        self.commands_applied_total.with_label_values(&[event]).inc();
    }

    pub fn befehl_verworfen(&self, grund: &str) {
        self.commands_rejected_total.with_label_values(&[grund]).inc();
    }

    pub fn admin_login(&self, erfolg: bool) {
        let ergebnis = if erfolg { "success" } else { "failure" };
        self.admin_logins_total.with_label_values(&[ergebnis]).inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: RelayMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<RelayMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = RelayMetrics::neu().unwrap();
        assert!(!metriken.registry.gather().is_empty());
    }

    #[test]
    fn gauge_listener_setzen() {
        let metriken = RelayMetrics::neu().unwrap();
        metriken.connected_listeners.set(42);
        assert_eq!(metriken.connected_listeners.get(), 42);
    }

    #[test]
    fn zaehler_mit_labels() {
        let metriken = RelayMetrics::neu().unwrap();
        metriken.befehl_angewendet("play-track");
        metriken.befehl_angewendet("play-track");
        metriken.befehl_verworfen(GRUND_NICHT_AUTORISIERT);
        metriken.admin_login(false);

        assert_eq!(
            metriken
                .commands_applied_total
                .with_label_values(&["play-track"])
                .get(),
            2
        );
        assert_eq!(
            metriken
                .commands_rejected_total
                .with_label_values(&["unauthorized"])
                .get(),
            1
        );
        assert_eq!(
            metriken.admin_logins_total.with_label_values(&["failure"]).get(),
            1
        );
    }

    #[test]
    fn metriken_export_prometheus_format() {
        let metriken = RelayMetrics::neu().unwrap();
        metriken.connected_listeners.set(5);
        metriken.broadcasts_total.inc();

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("syncmusic_connected_listeners 5"));
        assert!(output.contains("syncmusic_broadcasts_total 1"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn getrennte_registries() {
        let a = RelayMetrics::neu().unwrap();
        let b = RelayMetrics::neu().unwrap();
        a.broadcasts_total.inc();
        assert_eq!(b.broadcasts_total.get(), 0);
    }

    #[tokio::test]
    async fn metrics_endpunkt_liefert_text() {
        use tower::ServiceExt;

        let metriken = RelayMetrics::neu().unwrap();
        metriken.connections_refused_total.inc();

        let antwort = metrics_router(metriken)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/metrics")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("syncmusic_connections_refused_total 1"));
    }
}
