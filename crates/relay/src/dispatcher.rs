//! Command-Dispatcher – Leitet eingehende Events an die zustaendige Komponente
//!
//! Der Dispatcher ist die einzige Stelle die den Wiedergabezustand
//! veraendert. Jede angewendete Mutation wird sofort aus dem resultierenden
//! Zustand heraus gebroadcastet.
//!
//! | Event          | Admin | Wirkung                                      |
//! |----------------|-------|----------------------------------------------|
//! | `admin-login`  | nein  | privat `admin-authenticated`                 |
//! | `play-track`   | ja    | `track-changed`, dann `transport-state`      |
//! | `pause-track`  | ja    | `transport-state`                            |
//! | `resume-track` | ja    | `transport-state`                            |
//! | `stop-track`   | ja    | `track-changed` (null), dann `transport-state` |
//! | `set-volume`   | ja    | `volume-changed`                             |
//! | `force-sync`   | ja    | `full-sync`                                  |
//! | `request-sync` | nein  | privat `sync`                                |

use crate::session;
use crate::state::RelayState;
use crate::store::Mutation;
use syncmusic_core::ConnectionId;
use syncmusic_observability::{
    metrics::{GRUND_NICHT_AUTORISIERT, GRUND_UNGUELTIG},
    RelayStatus,
};
use syncmusic_protocol::{
    events::{AdminLoginDaten, SyncDaten},
    Envelope, InboundEvent, OutboundEvent,
};
use tokio::sync::mpsc;

/// Verarbeitet Ereignisse seriell gegen den `RelayState`
pub struct CommandDispatcher {
    state: RelayState,
}

impl CommandDispatcher {
    pub fn neu(state: RelayState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Neue Verbindung ueber den Session-Manager oeffnen
    pub fn verbinden(&mut self, id: ConnectionId) -> Option<mpsc::Receiver<OutboundEvent>> {
        let rx = session::verbindung_oeffnen(&mut self.state, id);
        session::abgehaengte_trennen(&mut self.state);
        rx
    }

    /// Verbindung schliessen (idempotent)
    pub fn trennen(&mut self, id: ConnectionId) {
        session::verbindung_schliessen(&mut self.state, id);
        session::abgehaengte_trennen(&mut self.state);
    }

    /// Dekodiertes Envelope einer Verbindung verarbeiten
    ///
    /// Unbekannte Events und ungueltige Payloads werden geloggt und
    /// verworfen, ohne Zustandsaenderung und ohne Antwort.
    pub fn dispatch(&mut self, id: ConnectionId, envelope: Envelope) {
        if !self.state.broadcaster.ist_registriert(&id) {
            tracing::debug!(connection = %id, event = %envelope.event, "Event einer getrennten Verbindung verworfen");
            return;
        }

        match InboundEvent::try_from(envelope) {
            Ok(ereignis) => self.ereignis_verarbeiten(id, ereignis),
            Err(e) => {
                tracing::warn!(connection = %id, fehler = %e, "Ungueltige Nachricht verworfen");
                self.state.metrics.befehl_verworfen(GRUND_UNGUELTIG);
            }
        }

        session::abgehaengte_trennen(&mut self.state);
    }

    /// Momentaufnahme fuer den Status-Endpunkt
    pub fn status(&self) -> RelayStatus {
        let zustand = self.state.store.get();
        RelayStatus {
            listener_count: session::listener_anzahl(&self.state),
            current_track_title: zustand.aktueller_titel().map(str::to_owned),
            is_playing: zustand.is_playing,
        }
    }

    fn ereignis_verarbeiten(&mut self, id: ConnectionId, ereignis: InboundEvent) {
        match ereignis {
            InboundEvent::AdminLogin(daten) => self.admin_login(id, daten),
            InboundEvent::RequestSync => session::sync_anfordern(&mut self.state, id),
            befehl => {
                debug_assert!(befehl.ist_mutierend());
                if let Err(e) = self.state.gate.autorisieren(&id, befehl.name()) {
                    // Still verwerfen: der Client bekommt keine Antwort
                    tracing::debug!(connection = %id, fehler = %e, "Befehl ohne Admin-Rechte verworfen");
                    self.state.metrics.befehl_verworfen(GRUND_NICHT_AUTORISIERT);
                    return;
                }
                self.befehl_anwenden(id, befehl);
            }
        }
    }

    fn admin_login(&mut self, id: ConnectionId, daten: AdminLoginDaten) {
        let erfolg = match self.state.gate.authentifizieren(id, &daten.password) {
            Ok(()) => {
                tracing::info!(connection = %id, "Admin authentifiziert");
                true
            }
            Err(e) => {
                tracing::warn!(connection = %id, fehler = %e, "Admin-Login fehlgeschlagen");
                false
            }
        };
        self.state.metrics.admin_login(erfolg);
        self.state
            .an_verbindung(&id, OutboundEvent::admin_authenticated(erfolg));
    }

    /// Mutation anwenden und die Broadcasts aus dem neuen Zustand bilden
    fn befehl_anwenden(&mut self, id: ConnectionId, befehl: InboundEvent) {
        let name = befehl.name();
        let store = &mut self.state.store;

        let events = match befehl {
            InboundEvent::PlayTrack(daten) => {
                let zustand = store.anwenden(Mutation::Abspielen(daten.track));
                vec![
                    OutboundEvent::track_changed(zustand.track.clone()),
                    OutboundEvent::transport_state(zustand.is_playing, daten.timestamp),
                ]
            }
            InboundEvent::PauseTrack(daten) => {
                let zustand = store.anwenden(Mutation::Pausieren);
                vec![OutboundEvent::transport_state(
                    zustand.is_playing,
                    daten.timestamp,
                )]
            }
            InboundEvent::ResumeTrack(daten) => {
                let zustand = store.anwenden(Mutation::Fortsetzen);
                vec![OutboundEvent::transport_state(
                    zustand.is_playing,
                    daten.timestamp,
                )]
            }
            InboundEvent::StopTrack(daten) => {
                let zustand = store.anwenden(Mutation::Stoppen);
                vec![
                    OutboundEvent::track_changed(zustand.track.clone()),
                    OutboundEvent::transport_state(zustand.is_playing, daten.timestamp),
                ]
            }
            InboundEvent::SetVolume(daten) => {
                let zustand = store.anwenden(Mutation::LautstaerkeSetzen(daten.volume));
                vec![OutboundEvent::volume_changed(zustand.volume)]
            }
            InboundEvent::ForceSync(daten) => {
                let zustand = store.anwenden(Mutation::Ueberschreiben {
                    track: daten.track,
                    is_playing: daten.is_playing,
                    volume: daten.volume,
                });
                vec![OutboundEvent::FullSync(SyncDaten::aus_zustand(
                    zustand,
                    daten.timestamp,
                ))]
            }
            // Werden in `ereignis_verarbeiten` behandelt
            InboundEvent::AdminLogin(_) | InboundEvent::RequestSync => return,
        };

        tracing::info!(connection = %id, event = name, "Befehl angewendet");
        self.state.metrics.befehl_angewendet(name);
        for event in events {
            self.state.an_alle(event);
        }
    }
}
