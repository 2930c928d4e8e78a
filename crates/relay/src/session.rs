//! Session-Manager – Verbindungsaufbau, Trennen und Sync-Anfragen
//!
//! Haelt die Listener-Anzahl exakt: jede Registrierung und jede
//! Entfernung loest genau einen `listener-count` Broadcast aus.

use crate::state::RelayState;
use serde_json::Number;
use syncmusic_core::ConnectionId;
use syncmusic_protocol::{events::SyncDaten, OutboundEvent};
use tokio::sync::mpsc;

/// Serverseitiger Zeitstempel in Millisekunden seit Unix-Epoch
pub fn server_zeitstempel() -> Number {
    Number::from(chrono::Utc::now().timestamp_millis())
}

/// Momentaufnahme des Wiedergabezustands mit Server-Zeitstempel
pub fn snapshot(state: &RelayState) -> SyncDaten {
    SyncDaten::aus_zustand(state.store.get(), server_zeitstempel())
}

/// Anzahl der aktuell registrierten Verbindungen
pub fn listener_anzahl(state: &RelayState) -> usize {
    state.broadcaster.anzahl()
}

/// Neue Verbindung: registrieren, privaten Sync senden, Anzahl broadcasten
///
/// Gibt `None` zurueck wenn das Verbindungslimit erreicht ist.
pub fn verbindung_oeffnen(
    state: &mut RelayState,
    id: ConnectionId,
) -> Option<mpsc::Receiver<OutboundEvent>> {
    if listener_anzahl(state) >= state.config.max_verbindungen {
        tracing::warn!(
            connection = %id,
            max = state.config.max_verbindungen,
            "Verbindungslimit erreicht – Verbindung abgelehnt"
        );
        state.metrics.connections_refused_total.inc();
        return None;
    }

    let rx = state.broadcaster.registrieren(id);
    tracing::info!(connection = %id, listener = listener_anzahl(state), "Verbindung registriert");

    // Der Snapshot geht vor dem neuen Listener-Count raus
    let sync = snapshot(state);
    state.an_verbindung(&id, OutboundEvent::Sync(sync));
    listener_anzahl_senden(state);

    Some(rx)
}

/// Verbindung entfernen und Admin-Rechte entziehen
///
/// Idempotent: nur wenn die Verbindung registriert war wird die neue
/// Anzahl gebroadcastet. Gibt zurueck ob sie registriert war.
pub fn verbindung_schliessen(state: &mut RelayState, id: ConnectionId) -> bool {
    if state.gate.entziehen(&id) {
        tracing::info!(connection = %id, "Admin-Rechte entzogen");
    }
    if !state.broadcaster.entfernen(&id) {
        return false;
    }
    tracing::info!(connection = %id, listener = listener_anzahl(state), "Verbindung getrennt");
    listener_anzahl_senden(state);
    true
}

/// Privater Snapshot auf `request-sync` (fuer jeden, ohne Admin-Pruefung)
pub fn sync_anfordern(state: &mut RelayState, id: ConnectionId) {
    let sync = snapshot(state);
    tracing::debug!(connection = %id, "Sync angefordert");
    state.an_verbindung(&id, OutboundEvent::Sync(sync));
}

/// Trennt alle Verbindungen die beim Senden hinterhergehangen haben
///
/// Jedes Trennen broadcastet selbst wieder, daher wird bis zum Fixpunkt
/// wiederholt.
pub fn abgehaengte_trennen(state: &mut RelayState) {
    loop {
        let ids = state.broadcaster.abgehaengte_nehmen();
        if ids.is_empty() {
            break;
        }
        for id in ids {
            if verbindung_schliessen(state, id) {
                tracing::warn!(connection = %id, "Langsame Verbindung getrennt");
            }
        }
    }
}

fn listener_anzahl_senden(state: &mut RelayState) {
    let anzahl = listener_anzahl(state);
    state.metrics.connected_listeners.set(anzahl as i64);
    state.an_alle(OutboundEvent::listener_count(anzahl));
}
