//! Identifikationstypen fuer syncmusic
//!
//! Verbindungen werden ausschliesslich ueber eine opake ID unterschieden.
//! Der Server kennt keine Identitaet der Listener ueber diese ID hinaus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID einer Client-Verbindung
///
/// Wird beim Verbindungsaufbau vergeben und nie wiederverwendet. Ein
/// Reconnect erhaelt immer eine neue ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_eindeutig() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b, "Zwei neue ConnectionIds muessen verschieden sein");
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId(Uuid::nil());
        assert_eq!(
            id.to_string(),
            "conn:00000000-0000-0000-0000-000000000000"
        );
    }
}
