//! syncmusic-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen syncmusic-Crates gemeinsam genutzt werden: Verbindungs-IDs,
//! der Wiedergabezustand und die Domain-Fehler.

pub mod error;
pub mod playback;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{Result, SyncMusicError};
pub use playback::{PlaybackState, Track, Volume};
pub use types::ConnectionId;
