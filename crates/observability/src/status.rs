//! Status-Endpunkt fuer syncmusic
//!
//! Endpoints: `GET /` und `GET /status`
//! Response: JSON mit Status, Listener-Anzahl, aktuellem Titel und
//! Play/Pause-Flag. Rein lesend, ohne Seiteneffekte.

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Momentaufnahme des Relays fuer den Status-Endpunkt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStatus {
    pub listener_count: usize,
    pub current_track_title: Option<String>,
    pub is_playing: bool,
}

/// Quelle fuer Status-Abfragen
///
/// `None` bedeutet: die Quelle ist nicht erreichbar (Relay beendet).
#[async_trait]
pub trait StatusQuelle: Send + Sync + 'static {
    async fn status_abfragen(&self) -> Option<RelayStatus>;
}

/// Status des Servers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StatusWert {
    Ok,
    Unavailable,
}

/// Antwort des Status-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: StatusWert,
    pub listener_count: usize,
    pub current_track_title: Option<String>,
    pub is_playing: bool,
    pub version: String,
    pub uptime_seconds: u64,
}

impl StatusResponse {
    fn aus_status(status: Option<RelayStatus>, uptime_seconds: u64) -> Self {
        let version = env!("CARGO_PKG_VERSION").to_string();
        match status {
            Some(s) => Self {
                status: StatusWert::Ok,
                listener_count: s.listener_count,
                current_track_title: s.current_track_title,
                is_playing: s.is_playing,
                version,
                uptime_seconds,
            },
            None => Self {
                status: StatusWert::Unavailable,
                listener_count: 0,
                current_track_title: None,
                is_playing: false,
                version,
                uptime_seconds,
            },
        }
    }
}

/// Geteilter Zustand fuer den Status-Handler
#[derive(Clone)]
struct StatusState {
    quelle: Arc<dyn StatusQuelle>,
    start_time: Instant,
}

/// Axum-Router fuer `/` und `/status`
pub fn status_router(quelle: Arc<dyn StatusQuelle>) -> Router {
    let state = StatusState {
        quelle,
        start_time: Instant::now(),
    };
    Router::new()
        .route("/", get(status_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// `GET /status` – gibt den Relay-Status zurueck
async fn status_handler(State(state): State<StatusState>) -> impl IntoResponse {
    let status = state.quelle.status_abfragen().await;
    let response = StatusResponse::aus_status(status, state.start_time.elapsed().as_secs());

    let http_status = match response.status {
        StatusWert::Ok => StatusCode::OK,
        StatusWert::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
