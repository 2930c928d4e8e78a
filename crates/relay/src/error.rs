//! Fehlertypen fuer das Relay

use thiserror::Error;

/// Fehlertyp fuer das Relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Der Relay-Worker laeuft nicht mehr (Befehls-Queue geschlossen)
    #[error("Relay-Worker nicht erreichbar")]
    WorkerBeendet,
}

/// Result-Typ fuer das Relay
pub type RelayResult<T> = Result<T, RelayError>;
