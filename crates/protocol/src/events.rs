//! Event-Definitionen (Client <-> Server)
//!
//! ## Design
//! - Envelope `{"event", "data"}` fuer beide Richtungen
//! - Eingehende Events werden zweistufig geparst: erst das Envelope, dann
//!   der Payload passend zum Event-Namen. So kann ein ungueltiger Payload
//!   gezielt ignoriert werden, ohne die Verbindung zu verlieren.
//! - Ausgehende Events sind ein adjacently tagged Enum und serialisieren
//!   direkt in dieselbe Envelope-Form.
//! - Client-Zeitstempel werden als `serde_json::Number` gehalten und
//!   unveraendert zurueckgesendet (Ganzzahl oder Gleitkomma).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use syncmusic_core::{PlaybackState, Track, Volume};

use crate::error::{ProtocolError, ProtocolResult};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Rohe Nachricht: Event-Name plus unausgewerteter Payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn neu(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Eingehende Payloads
// ---------------------------------------------------------------------------

/// `admin-login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminLoginDaten {
    pub password: String,
}

/// `play-track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayTrackDaten {
    pub track: Track,
    pub timestamp: Number,
}

/// `pause-track`, `resume-track`, `stop-track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportDaten {
    pub timestamp: Number,
}

/// `set-volume`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVolumeDaten {
    pub volume: Volume,
}

/// `force-sync`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceSyncDaten {
    pub track: Option<Track>,
    pub is_playing: bool,
    pub volume: Volume,
    pub timestamp: Number,
}

// ---------------------------------------------------------------------------
// InboundEvent
// ---------------------------------------------------------------------------

/// Alle Events die ein Client senden darf
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    AdminLogin(AdminLoginDaten),
    PlayTrack(PlayTrackDaten),
    PauseTrack(TransportDaten),
    ResumeTrack(TransportDaten),
    StopTrack(TransportDaten),
    SetVolume(SetVolumeDaten),
    ForceSync(ForceSyncDaten),
    RequestSync,
}

impl InboundEvent {
    /// Wire-Name des Events
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdminLogin(_) => "admin-login",
            Self::PlayTrack(_) => "play-track",
            Self::PauseTrack(_) => "pause-track",
            Self::ResumeTrack(_) => "resume-track",
            Self::StopTrack(_) => "stop-track",
            Self::SetVolume(_) => "set-volume",
            Self::ForceSync(_) => "force-sync",
            Self::RequestSync => "request-sync",
        }
    }

    /// Gibt true zurueck wenn das Event den Wiedergabezustand veraendert
    /// und damit Admin-Rechte erfordert
    pub fn ist_mutierend(&self) -> bool {
        !matches!(self, Self::AdminLogin(_) | Self::RequestSync)
    }
}

impl TryFrom<Envelope> for InboundEvent {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> ProtocolResult<Self> {
        let Envelope { event, data } = envelope;
        let ereignis = match event.as_str() {
            "admin-login" => Self::AdminLogin(payload(&event, data)?),
            "play-track" => Self::PlayTrack(payload(&event, data)?),
            "pause-track" => Self::PauseTrack(payload(&event, data)?),
            "resume-track" => Self::ResumeTrack(payload(&event, data)?),
            "stop-track" => Self::StopTrack(payload(&event, data)?),
            "set-volume" => Self::SetVolume(payload(&event, data)?),
            "force-sync" => Self::ForceSync(payload(&event, data)?),
            // Payload wird ignoriert
            "request-sync" => Self::RequestSync,
            _ => return Err(ProtocolError::UnbekanntesEvent(event)),
        };
        Ok(ereignis)
    }
}

fn payload<T: DeserializeOwned>(event: &str, data: Value) -> ProtocolResult<T> {
    serde_json::from_value(data).map_err(|e| ProtocolError::UngueltigerPayload {
        event: event.to_string(),
        grund: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Ausgehende Payloads
// ---------------------------------------------------------------------------

/// Vollstaendiger Snapshot (`sync` und `full-sync`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDaten {
    pub track: Option<Track>,
    pub is_playing: bool,
    pub volume: Volume,
    pub timestamp: Number,
}

impl SyncDaten {
    /// Snapshot eines Zustands mit dem gegebenen Zeitstempel
    pub fn aus_zustand(zustand: &PlaybackState, timestamp: Number) -> Self {
        Self {
            track: zustand.track.clone(),
            is_playing: zustand.is_playing,
            volume: zustand.volume,
            timestamp,
        }
    }
}

/// `listener-count`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerCountDaten {
    pub count: usize,
}

/// `track-changed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackChangedDaten {
    pub track: Option<Track>,
}

/// `transport-state`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStateDaten {
    pub is_playing: bool,
    pub timestamp: Number,
}

/// `volume-changed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeChangedDaten {
    pub volume: Volume,
}

/// `admin-authenticated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAuthenticatedDaten {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// OutboundEvent
// ---------------------------------------------------------------------------

/// Alle Events die der Server sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OutboundEvent {
    /// Privat: Snapshot bei Verbindungsaufbau und auf `request-sync`
    Sync(SyncDaten),
    ListenerCount(ListenerCountDaten),
    TrackChanged(TrackChangedDaten),
    TransportState(TransportStateDaten),
    VolumeChanged(VolumeChangedDaten),
    /// Broadcast nach `force-sync`
    FullSync(SyncDaten),
    /// Privat: Ergebnis von `admin-login`
    AdminAuthenticated(AdminAuthenticatedDaten),
}

impl OutboundEvent {
    pub fn listener_count(count: usize) -> Self {
        Self::ListenerCount(ListenerCountDaten { count })
    }

    pub fn track_changed(track: Option<Track>) -> Self {
        Self::TrackChanged(TrackChangedDaten { track })
    }

    pub fn transport_state(is_playing: bool, timestamp: Number) -> Self {
        Self::TransportState(TransportStateDaten {
            is_playing,
            timestamp,
        })
    }

    pub fn volume_changed(volume: Volume) -> Self {
        Self::VolumeChanged(VolumeChangedDaten { volume })
    }

    pub fn admin_authenticated(success: bool) -> Self {
        Self::AdminAuthenticated(AdminAuthenticatedDaten { success })
    }

    /// Wire-Name des Events (fuer Logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::ListenerCount(_) => "listener-count",
            Self::TrackChanged(_) => "track-changed",
            Self::TransportState(_) => "transport-state",
            Self::VolumeChanged(_) => "volume-changed",
            Self::FullSync(_) => "full-sync",
            Self::AdminAuthenticated(_) => "admin-authenticated",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
