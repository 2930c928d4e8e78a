//! WebSocket-Verbindung – ein Task pro Client
//!
//! Jede Verbindung bekommt beim Upgrade eine neue `ConnectionId`. Der Task
//! dekodiert eingehende Text-Frames, reicht sie an den Relay-Worker weiter
//! und schreibt die Events aus der eigenen Send-Queue auf den Socket.
//! Admin-Rechte ueberleben das Trennen nicht: ein Reconnect ist immer eine
//! neue, nicht authentifizierte Verbindung.

use crate::worker::RelayHandle;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use syncmusic_core::ConnectionId;
use syncmusic_observability::{metrics::GRUND_UNGUELTIG, RelayMetrics};
use syncmusic_protocol::TextCodec;
use tokio::sync::watch;

/// Geteilter Kontext aller Verbindungs-Tasks
#[derive(Clone)]
pub struct VerbindungsKontext {
    pub handle: RelayHandle,
    pub codec: TextCodec,
    pub metrics: RelayMetrics,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Axum-Router fuer `GET /ws`
pub fn ws_router(kontext: VerbindungsKontext) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(kontext)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(kontext): State<VerbindungsKontext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| verbindung_verarbeiten(socket, kontext))
}

/// Verarbeitungsschleife einer WebSocket-Verbindung
///
/// Laeuft bis der Client trennt, der Socket fehlschlaegt, die Send-Queue
/// geschlossen wird oder ein Shutdown-Signal eingeht.
pub async fn verbindung_verarbeiten(socket: WebSocket, kontext: VerbindungsKontext) {
    let id = ConnectionId::new();
    let VerbindungsKontext {
        handle,
        codec,
        metrics,
        mut shutdown_rx,
    } = kontext;
    let (mut sender, mut empfaenger) = socket.split();

    let mut ausgang_rx = match handle.verbinden(id).await {
        Ok(Some(rx)) => rx,
        Ok(None) => {
            // Limit erreicht, bereits vom Worker geloggt
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
        Err(e) => {
            tracing::warn!(connection = %id, fehler = %e, "Verbindung nicht registrierbar");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!(connection = %id, "Neue Verbindung");

    loop {
        tokio::select! {
            // Eingehender Frame vom Client
            eingang = empfaenger.next() => {
                match eingang {
                    Some(Ok(Message::Text(text))) => match codec.dekodieren(&text) {
                        Ok(envelope) => {
                            tracing::trace!(connection = %id, event = %envelope.event, "Nachricht empfangen");
                            if handle.nachricht(id, envelope).await.is_err() {
                                tracing::warn!(connection = %id, "Relay-Worker beendet");
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(connection = %id, fehler = %e, "Ungueltiger Frame verworfen");
                            metrics.befehl_verworfen(GRUND_UNGUELTIG);
                        }
                    },
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(connection = %id, "Binaer-Frame ignoriert");
                    }
                    // Pings beantwortet axum selbst
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(connection = %id, "Verbindung vom Client getrennt");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(connection = %id, fehler = %e, "WebSocket-Lesefehler");
                        break;
                    }
                }
            }

            // Ausgehendes Event aus der Send-Queue
            ausgehend = ausgang_rx.recv() => {
                let Some(event) = ausgehend else {
                    // Der Worker hat die Verbindung entfernt (z.B. zu langsam)
                    tracing::info!(connection = %id, "Send-Queue geschlossen");
                    break;
                };
                let text = match codec.kodieren(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(connection = %id, event = event.name(), fehler = %e, "Event nicht kodierbar");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(text.into())).await {
                    tracing::warn!(connection = %id, fehler = %e, "Senden fehlgeschlagen");
                    break;
                }
            }

            // Shutdown-Signal
            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!(connection = %id, "Shutdown-Signal – Verbindung wird getrennt");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    // Queue zuerst schliessen, damit keine weiteren Events mehr auflaufen
    drop(ausgang_rx);
    if let Err(e) = handle.trennen(id).await {
        tracing::debug!(connection = %id, fehler = %e, "Trennen nicht zugestellt");
    }

    tracing::info!(connection = %id, "Verbindungs-Task beendet");
}
