//! State Store – haelt den einzigen Wiedergabezustand
//!
//! Der Store validiert nichts ueber die Typen hinaus und broadcastet
//! nichts. Jede Mutation ersetzt die Felder die sie besitzt vollstaendig.

use syncmusic_core::{PlaybackState, Track, Volume};

/// Zustandsuebergaenge des Wiedergabezustands
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// track := track, isPlaying := true
    Abspielen(Track),
    /// isPlaying := false
    Pausieren,
    /// isPlaying := true
    Fortsetzen,
    /// track := absent, isPlaying := false
    Stoppen,
    /// volume := volume
    LautstaerkeSetzen(Volume),
    /// Ueberschreibt alle drei Felder auf einmal
    Ueberschreiben {
        track: Option<Track>,
        is_playing: bool,
        volume: Volume,
    },
}

/// Besitzt den `PlaybackState`
#[derive(Debug, Default)]
pub struct StateStore {
    zustand: PlaybackState,
}

impl StateStore {
    /// Erstellt einen Store im Startzustand (kein Track, pausiert, Lautstaerke 70)
    pub fn neu() -> Self {
        Self::default()
    }

    /// Aktueller Zustand (nur lesend)
    pub fn get(&self) -> &PlaybackState {
        &self.zustand
    }

    /// Wendet eine Mutation an und gibt den resultierenden Zustand zurueck
    pub fn anwenden(&mut self, mutation: Mutation) -> &PlaybackState {
        let z = &mut self.zustand;
        match mutation {
            Mutation::Abspielen(track) => {
                z.track = Some(track);
                z.is_playing = true;
            }
            Mutation::Pausieren => z.is_playing = false,
            Mutation::Fortsetzen => z.is_playing = true,
            Mutation::Stoppen => {
                z.track = None;
                z.is_playing = false;
            }
            Mutation::LautstaerkeSetzen(volume) => z.volume = volume,
            Mutation::Ueberschreiben {
                track,
                is_playing,
                volume,
            } => {
                *z = PlaybackState {
                    track,
                    is_playing,
                    volume,
                };
            }
        }
        &self.zustand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(wert: u8) -> Volume {
        Volume::neu(wert).unwrap()
    }

    #[test]
    fn startzustand() {
        let store = StateStore::neu();
        assert_eq!(store.get(), &PlaybackState::default());
        assert_eq!(store.get().volume.wert(), 70);
    }

    #[test]
    fn abspielen_setzt_track_und_flag() {
        let mut store = StateStore::neu();
        let zustand = store.anwenden(Mutation::Abspielen(Track::neu("t1", "Song")));
        assert_eq!(zustand.track.as_ref().map(|t| t.id.as_str()), Some("t1"));
        assert!(zustand.is_playing);
        assert_eq!(zustand.volume.wert(), 70);
    }

    #[test]
    fn neuer_track_ersetzt_alten_vollstaendig() {
        let mut store = StateStore::neu();
        let mut alt = Track::neu("t1", "Alt");
        alt.metadaten
            .insert("artist".into(), serde_json::json!("Band"));
        store.anwenden(Mutation::Abspielen(alt));
        store.anwenden(Mutation::Abspielen(Track::neu("t2", "Neu")));

        let track = store.get().track.clone().unwrap();
        assert_eq!(track.id, "t2");
        assert!(track.metadaten.is_empty(), "Metadaten duerfen nicht gemerged werden");
    }

    #[test]
    fn pausieren_und_fortsetzen_behalten_track() {
        let mut store = StateStore::neu();
        store.anwenden(Mutation::Abspielen(Track::neu("t1", "Song")));

        assert!(!store.anwenden(Mutation::Pausieren).is_playing);
        assert!(store.get().track.is_some());

        assert!(store.anwenden(Mutation::Fortsetzen).is_playing);
        assert!(store.get().track.is_some());
    }

    #[test]
    fn stoppen_entfernt_track() {
        let mut store = StateStore::neu();
        store.anwenden(Mutation::Abspielen(Track::neu("t1", "Song")));
        let zustand = store.anwenden(Mutation::Stoppen);
        assert!(zustand.track.is_none());
        assert!(!zustand.is_playing);
    }

    #[test]
    fn lautstaerke_setzen() {
        let mut store = StateStore::neu();
        assert_eq!(
            store
                .anwenden(Mutation::LautstaerkeSetzen(volume(15)))
                .volume
                .wert(),
            15
        );
    }

    #[test]
    fn ueberschreiben_ersetzt_alle_felder() {
        let mut store = StateStore::neu();
        store.anwenden(Mutation::Abspielen(Track::neu("t1", "Song")));

        let zustand = store
            .anwenden(Mutation::Ueberschreiben {
                track: None,
                is_playing: false,
                volume: volume(30),
            })
            .clone();
        assert_eq!(
            zustand,
            PlaybackState {
                track: None,
                is_playing: false,
                volume: volume(30),
            }
        );
    }

    #[test]
    fn pausieren_ohne_track_ist_erlaubt() {
        let mut store = StateStore::neu();
        let zustand = store.anwenden(Mutation::Fortsetzen);
        assert!(zustand.is_playing);
        assert!(zustand.track.is_none());
    }
}
