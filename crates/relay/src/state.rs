//! Relay-State – Zustand den der Relay-Worker exklusiv besitzt

use crate::admin::AuthorizationGate;
use crate::broadcast::{Broadcaster, STANDARD_SEND_QUEUE_GROESSE};
use crate::store::StateStore;
use syncmusic_core::ConnectionId;
use syncmusic_observability::RelayMetrics;
use syncmusic_protocol::OutboundEvent;

/// Passwort wenn keines konfiguriert ist
pub const STANDARD_ADMIN_PASSWORT: &str = "admin123";

/// Standard-Limit gleichzeitiger Verbindungen
pub const STANDARD_MAX_VERBINDUNGEN: usize = 512;

/// Laufzeit-Konfiguration des Relays
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Geteiltes Admin-Passwort
    pub admin_passwort: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen
    pub max_verbindungen: usize,
    /// Groesse der Send-Queue pro Verbindung
    pub send_queue_groesse: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            admin_passwort: STANDARD_ADMIN_PASSWORT.to_string(),
            max_verbindungen: STANDARD_MAX_VERBINDUNGEN,
            send_queue_groesse: STANDARD_SEND_QUEUE_GROESSE,
        }
    }
}

/// Alle Komponenten des Relays
///
/// Wird genau einmal erzeugt und dann an den Relay-Worker uebergeben.
pub struct RelayState {
    pub config: RelayConfig,
    pub store: StateStore,
    pub gate: AuthorizationGate,
    pub broadcaster: Broadcaster,
    pub metrics: RelayMetrics,
}

impl RelayState {
    pub fn neu(config: RelayConfig, metrics: RelayMetrics) -> Self {
        Self {
            store: StateStore::neu(),
            gate: AuthorizationGate::neu(config.admin_passwort.clone()),
            broadcaster: Broadcaster::neu(config.send_queue_groesse),
            metrics,
            config,
        }
    }

    /// Privates Event an eine Verbindung
    pub fn an_verbindung(&mut self, id: &ConnectionId, event: OutboundEvent) -> bool {
        self.broadcaster.an_verbindung_senden(id, event)
    }

    /// Broadcast an alle Verbindungen
    pub fn an_alle(&mut self, event: OutboundEvent) -> usize {
        self.metrics.broadcasts_total.inc();
        self.broadcaster.an_alle_senden(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let config = RelayConfig::default();
        assert_eq!(config.admin_passwort, "admin123");
        assert_eq!(config.max_verbindungen, 512);
        assert_eq!(config.send_queue_groesse, 256);
    }

    #[test]
    fn neuer_state_ist_leer() {
        let state = RelayState::neu(RelayConfig::default(), RelayMetrics::neu().unwrap());
        assert_eq!(state.broadcaster.anzahl(), 0);
        assert_eq!(state.gate.registry().anzahl(), 0);
        assert!(state.store.get().track.is_none());
    }

    #[test]
    fn broadcast_wird_gezaehlt() {
        let mut state = RelayState::neu(RelayConfig::default(), RelayMetrics::neu().unwrap());
        let _rx = state.broadcaster.registrieren(ConnectionId::new());

        assert_eq!(state.an_alle(OutboundEvent::listener_count(1)), 1);
        assert_eq!(state.metrics.broadcasts_total.get(), 1);
    }
}
