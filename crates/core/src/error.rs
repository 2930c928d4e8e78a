//! Fehlertypen fuer syncmusic
//!
//! Domain-Fehler die unabhaengig vom Transport auftreten koennen.

use thiserror::Error;

/// Globaler Result-Alias fuer syncmusic
pub type Result<T> = std::result::Result<T, SyncMusicError>;

/// Alle Domain-Fehler im syncmusic-System
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncMusicError {
    /// Lautstaerke ausserhalb von 0..=100
    #[error("Ungueltige Lautstaerke: {0} (erlaubt: 0-100)")]
    UngueltigeLautstaerke(i64),

    /// Admin-Login mit falschem Passwort
    #[error("Authentifizierung fehlgeschlagen")]
    Authentifizierung,

    /// Mutierender Befehl von einer Nicht-Admin-Verbindung
    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = SyncMusicError::UngueltigeLautstaerke(150);
        assert_eq!(e.to_string(), "Ungueltige Lautstaerke: 150 (erlaubt: 0-100)");
    }

    #[test]
    fn zugriff_verweigert_enthaelt_event() {
        let e = SyncMusicError::ZugriffVerweigert("set-volume".into());
        assert!(e.to_string().contains("set-volume"));
    }
}
