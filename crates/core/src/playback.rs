//! Wiedergabezustand – Track, Lautstaerke und Play/Pause-Flag
//!
//! Der `PlaybackState` ist immer ein vollstaendiger Snapshot. Teil-Updates
//! existieren nur als Mutationen im State Store, nie als eigener Zustand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SyncMusicError;

/// Standard-Lautstaerke beim Serverstart
pub const STANDARD_LAUTSTAERKE: u8 = 70;

/// Maximale Lautstaerke
pub const MAX_LAUTSTAERKE: u8 = 100;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Metadaten eines Tracks
///
/// `id` und `title` sind Pflicht. Alle weiteren Felder (Artist, Cover-URL,
/// Dauer, ...) werden unveraendert durchgereicht.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub metadaten: Map<String, Value>,
}

impl Track {
    /// Erstellt einen Track ohne zusaetzliche Metadaten
    pub fn neu(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            metadaten: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// Lautstaerke im Bereich 0..=100
///
/// Wird auf dem Wire als ganze Zahl uebertragen. Werte ausserhalb des
/// Bereichs scheitern bereits bei der Deserialisierung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Volume(u8);

impl Volume {
    /// Erstellt eine Lautstaerke, `None` ausserhalb von 0..=100
    pub fn neu(wert: u8) -> Option<Self> {
        (wert <= MAX_LAUTSTAERKE).then_some(Self(wert))
    }

    pub fn wert(&self) -> u8 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(STANDARD_LAUTSTAERKE)
    }
}

impl TryFrom<i64> for Volume {
    type Error = SyncMusicError;

    fn try_from(wert: i64) -> Result<Self, Self::Error> {
        u8::try_from(wert)
            .ok()
            .and_then(Volume::neu)
            .ok_or(SyncMusicError::UngueltigeLautstaerke(wert))
    }
}

impl From<Volume> for u8 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

impl std::fmt::Display for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Gemeinsamer Wiedergabezustand aller Listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub track: Option<Track>,
    pub is_playing: bool,
    pub volume: Volume,
}

impl PlaybackState {
    /// Titel des aktuellen Tracks (fuer Status-Abfragen)
    pub fn aktueller_titel(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.title.as_str())
    }
}
