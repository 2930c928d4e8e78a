//! Text-Codec fuer WebSocket-Frames
//!
//! Ein Frame enthaelt genau ein JSON-Envelope. Die maximale Groesse ist
//! konfigurierbar (Standard: 64 KiB) und gilt nur fuer eingehende Frames.
//! Ausgehende Events werden nicht begrenzt.
//!
//! Der Codec dekodiert nur das Envelope. Die Auswertung des Payloads
//! (`InboundEvent::try_from`) passiert erst im Dispatcher, damit ein
//! ungueltiger Payload dort als solcher behandelt werden kann.

use crate::error::{ProtocolError, ProtocolResult};
use crate::events::{Envelope, OutboundEvent};

/// Standard-maximale Nachrichtengroesse (64 KiB)
pub const DEFAULT_MAX_NACHRICHT_GROESSE: usize = 64 * 1024;

/// Codec fuer JSON-Textframes
#[derive(Debug, Clone)]
pub struct TextCodec {
    /// Maximale erlaubte Nachrichtengroesse in Bytes
    max_groesse: usize,
}

impl TextCodec {
    /// Erstellt einen neuen `TextCodec` mit Standard-Limit
    pub fn new() -> Self {
        Self {
            max_groesse: DEFAULT_MAX_NACHRICHT_GROESSE,
        }
    }

    /// Erstellt einen `TextCodec` mit benutzerdefinierter maximaler Groesse
    pub fn with_max_size(max_groesse: usize) -> Self {
        Self { max_groesse }
    }

    /// Gibt die konfigurierte maximale Nachrichtengroesse zurueck
    pub fn max_groesse(&self) -> usize {
        self.max_groesse
    }

    /// Dekodiert einen Textframe in ein Envelope
    pub fn dekodieren(&self, text: &str) -> ProtocolResult<Envelope> {
        self.groesse_pruefen(text.len())?;
        serde_json::from_str(text).map_err(ProtocolError::UngueltigesJson)
    }

    /// Kodiert ein ausgehendes Event als Textframe
    pub fn kodieren(&self, event: &OutboundEvent) -> ProtocolResult<String> {
        serde_json::to_string(event).map_err(ProtocolError::Serialisierung)
    }

    fn groesse_pruefen(&self, groesse: usize) -> ProtocolResult<()> {
        if groesse > self.max_groesse {
            return Err(ProtocolError::NachrichtZuGross {
                groesse,
                maximum: self.max_groesse,
            });
        }
        Ok(())
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InboundEvent;
    use serde_json::json;

    #[test]
    fn envelope_dekodieren() {
        let codec = TextCodec::new();
        let envelope = codec
            .dekodieren(r#"{"event":"admin-login","data":{"password":"geheim"}}"#)
            .unwrap();
        assert_eq!(envelope.event, "admin-login");
        assert_eq!(envelope.data, json!({ "password": "geheim" }));
    }

    #[test]
    fn envelope_ohne_data() {
        let codec = TextCodec::new();
        let envelope = codec.dekodieren(r#"{"event":"request-sync"}"#).unwrap();
        assert_eq!(envelope.data, serde_json::Value::Null);
    }

    #[test]
    fn kein_json() {
        let codec = TextCodec::new();
        let fehler = codec.dekodieren("play please").unwrap_err();
        assert!(matches!(fehler, ProtocolError::UngueltigesJson(_)));
    }

    #[test]
    fn envelope_ohne_event_name() {
        let codec = TextCodec::new();
        let fehler = codec.dekodieren(r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(fehler, ProtocolError::UngueltigesJson(_)));
    }

    #[test]
    fn ablehnung_zu_grosser_eingang() {
        let codec = TextCodec::with_max_size(16);
        let fehler = codec
            .dekodieren(r#"{"event":"request-sync","data":{}}"#)
            .unwrap_err();
        assert!(matches!(
            fehler,
            ProtocolError::NachrichtZuGross { maximum: 16, .. }
        ));
    }

    #[test]
    fn aufgeblaehter_track_bleibt_kodierbar() {
        // `1e9` wird beim Kodieren zu `1000000000.0`
        let werte = vec!["1e9"; 8000].join(",");
        let eingang = format!(
            r#"{{"event":"play-track","data":{{"track":{{"id":"t1","title":"T","werte":[{werte}]}},"timestamp":1}}}}"#
        );

        let codec = TextCodec::new();
        assert!(eingang.len() <= codec.max_groesse());
        let envelope = codec.dekodieren(&eingang).unwrap();
        let daten = match InboundEvent::try_from(envelope).unwrap() {
            InboundEvent::PlayTrack(daten) => daten,
            anders => panic!("Erwartet PlayTrack, erhalten: {anders:?}"),
        };

        let ausgang = codec
            .kodieren(&OutboundEvent::track_changed(Some(daten.track)))
            .unwrap();
        assert!(ausgang.len() > codec.max_groesse());
        let wert: serde_json::Value = serde_json::from_str(&ausgang).unwrap();
        assert_eq!(wert["event"], "track-changed");
        assert_eq!(wert["data"]["track"]["werte"][7999], json!(1e9));
    }

    #[test]
    fn kodieren_ergibt_envelope() {
        let codec = TextCodec::new();
        let text = codec.kodieren(&OutboundEvent::listener_count(2)).unwrap();
        let envelope = codec.dekodieren(&text).unwrap();
        assert_eq!(envelope.event, "listener-count");
        assert_eq!(envelope.data, json!({ "count": 2 }));
    }

    #[test]
    fn default_max_groesse() {
        assert_eq!(TextCodec::default().max_groesse(), DEFAULT_MAX_NACHRICHT_GROESSE);
    }
}
