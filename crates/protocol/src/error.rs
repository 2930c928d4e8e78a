//! Fehlertypen fuer das Protokoll

use thiserror::Error;

/// Fehler beim Dekodieren oder Kodieren von Nachrichten
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame ist kein gueltiges JSON-Envelope
    #[error("Ungueltiges JSON: {0}")]
    UngueltigesJson(#[source] serde_json::Error),

    /// Event-Name ist unbekannt
    #[error("Unbekanntes Event: {0}")]
    UnbekanntesEvent(String),

    /// Payload passt nicht zum Event
    #[error("Ungueltiger Payload fuer '{event}': {grund}")]
    UngueltigerPayload { event: String, grund: String },

    /// Nachricht ueberschreitet die maximale Groesse
    #[error("Nachricht zu gross: {groesse} Bytes (Maximum: {maximum} Bytes)")]
    NachrichtZuGross { groesse: usize, maximum: usize },

    /// Ausgehendes Event konnte nicht serialisiert werden
    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(#[source] serde_json::Error),
}

/// Result-Typ fuer das Protokoll
pub type ProtocolResult<T> = Result<T, ProtocolError>;
