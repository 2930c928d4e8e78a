//! Broadcaster – Sendet Events an einzelne oder alle Verbindungen
//!
//! Jede Verbindung besitzt eine begrenzte Send-Queue. Der Broadcaster
//! schreibt nicht-blockierend hinein, damit ein langsamer Client den
//! Relay-Worker nie aufhalten kann. Verbindungen deren Queue voll oder
//! geschlossen ist werden als abgehaengt vermerkt und vom Aufrufer
//! anschliessend getrennt.
//!
//! - An eine Verbindung: `an_verbindung_senden`
//! - An alle Verbindungen: `an_alle_senden`

use std::collections::HashMap;
use syncmusic_core::ConnectionId;
use syncmusic_protocol::OutboundEvent;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standardgroesse der Send-Queue pro Verbindung
pub const STANDARD_SEND_QUEUE_GROESSE: usize = 256;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub id: ConnectionId,
    pub tx: mpsc::Sender<OutboundEvent>,
}

impl ClientSender {
    /// Legt ein Event nicht-blockierend in die Queue
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, event: OutboundEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    connection = %self.id,
                    event = event.name(),
                    "Send-Queue voll – Verbindung haengt hinterher"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection = %self.id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Broadcaster
// ---------------------------------------------------------------------------

/// Send-Queues aller registrierten Verbindungen
///
/// Gehoert exklusiv dem Relay-Worker, daher ohne interne Synchronisation.
#[derive(Debug)]
pub struct Broadcaster {
    clients: HashMap<ConnectionId, ClientSender>,
    queue_groesse: usize,
    abgehaengt: Vec<ConnectionId>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::neu(STANDARD_SEND_QUEUE_GROESSE)
    }
}

impl Broadcaster {
    /// Erstellt einen Broadcaster; eine Queue-Groesse von 0 wird auf 1 angehoben
    pub fn neu(queue_groesse: usize) -> Self {
        Self {
            clients: HashMap::new(),
            queue_groesse: queue_groesse.max(1),
            abgehaengt: Vec::new(),
        }
    }

    /// Registriert eine Verbindung und gibt das Empfangsende ihrer Queue zurueck
    ///
    /// Eine erneute Registrierung derselben Id ersetzt die alte Queue.
    pub fn registrieren(&mut self, id: ConnectionId) -> mpsc::Receiver<OutboundEvent> {
        let (tx, rx) = mpsc::channel(self.queue_groesse);
        self.clients.insert(id, ClientSender { id, tx });
        rx
    }

    /// Entfernt eine Verbindung. Gibt `true` zurueck wenn sie registriert war.
    pub fn entfernen(&mut self, id: &ConnectionId) -> bool {
        self.clients.remove(id).is_some()
    }

    pub fn ist_registriert(&self, id: &ConnectionId) -> bool {
        self.clients.contains_key(id)
    }

    /// Anzahl der registrierten Verbindungen
    pub fn anzahl(&self) -> usize {
        self.clients.len()
    }

    /// Sendet ein Event an genau eine Verbindung
    ///
    /// Gibt `false` zurueck wenn die Verbindung unbekannt ist oder nicht
    /// erreicht wurde.
    pub fn an_verbindung_senden(&mut self, id: &ConnectionId, event: OutboundEvent) -> bool {
        let Some(client) = self.clients.get(id) else {
            tracing::debug!(connection = %id, event = event.name(), "Event an unbekannte Verbindung verworfen");
            return false;
        };
        if client.senden(event) {
            true
        } else {
            self.abgehaengt.push(*id);
            false
        }
    }

    /// Sendet ein Event an alle registrierten Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreich erreichten Verbindungen zurueck.
    pub fn an_alle_senden(&mut self, event: OutboundEvent) -> usize {
        let mut erreicht = 0;
        for client in self.clients.values() {
            if client.senden(event.clone()) {
                erreicht += 1;
            } else {
                self.abgehaengt.push(client.id);
            }
        }
        erreicht
    }

    /// Nimmt die seit dem letzten Aufruf abgehaengten Verbindungen heraus
    pub fn abgehaengte_nehmen(&mut self) -> Vec<ConnectionId> {
        let mut ids = std::mem::take(&mut self.abgehaengt);
        ids.sort();
        ids.dedup();
        ids
    }
}
