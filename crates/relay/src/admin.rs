//! Admin-Registry und Authorization Gate
//!
//! Admin-Rechte haengen an der Verbindung, nicht an einer Person.
//! Eine Verbindung wird nur durch einen erfolgreichen Passwortvergleich
//! Admin und verliert das Recht erst beim Trennen.

use std::collections::HashSet;
use syncmusic_core::{ConnectionId, Result, SyncMusicError};

// ---------------------------------------------------------------------------
// AdminRegistry
// ---------------------------------------------------------------------------

/// Menge der Verbindungen mit Admin-Rechten
#[derive(Debug, Default)]
pub struct AdminRegistry {
    admins: HashSet<ConnectionId>,
}

impl AdminRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Nur ueber `AuthorizationGate::authentifizieren` erreichbar
    fn hinzufuegen(&mut self, id: ConnectionId) -> bool {
        self.admins.insert(id)
    }

    /// Entfernt eine Verbindung (idempotent)
    pub fn entfernen(&mut self, id: &ConnectionId) -> bool {
        self.admins.remove(id)
    }

    pub fn enthaelt(&self, id: &ConnectionId) -> bool {
        self.admins.contains(id)
    }

    pub fn anzahl(&self) -> usize {
        self.admins.len()
    }
}

// ---------------------------------------------------------------------------
// AuthorizationGate
// ---------------------------------------------------------------------------

/// Prueft Admin-Logins gegen das konfigurierte Passwort und
/// entscheidet ueber mutierende Befehle
#[derive(Debug)]
pub struct AuthorizationGate {
    passwort: String,
    registry: AdminRegistry,
}

impl AuthorizationGate {
    pub fn neu(passwort: impl Into<String>) -> Self {
        Self {
            passwort: passwort.into(),
            registry: AdminRegistry::neu(),
        }
    }

    /// Vergleicht das gelieferte Passwort exakt mit dem konfigurierten
    ///
    /// Bei Erfolg wird die Verbindung Admin (erneutes Login ist idempotent).
    /// Ein Fehlversuch entzieht bestehende Rechte nicht.
    pub fn authentifizieren(&mut self, id: ConnectionId, geliefert: &str) -> Result<()> {
        if geliefert != self.passwort {
            return Err(SyncMusicError::Authentifizierung);
        }
        self.registry.hinzufuegen(id);
        Ok(())
    }

    pub fn ist_admin(&self, id: &ConnectionId) -> bool {
        self.registry.enthaelt(id)
    }

    /// Erlaubt einen mutierenden Befehl nur fuer Admin-Verbindungen
    pub fn autorisieren(&self, id: &ConnectionId, event: &str) -> Result<()> {
        if self.ist_admin(id) {
            Ok(())
        } else {
            Err(SyncMusicError::ZugriffVerweigert(event.to_string()))
        }
    }

    /// Entzieht die Admin-Rechte einer Verbindung (beim Trennen)
    pub fn entziehen(&mut self, id: &ConnectionId) -> bool {
        self.registry.entfernen(id)
    }

    pub fn registry(&self) -> &AdminRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korrektes_passwort_macht_admin() {
        let mut gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        assert!(!gate.ist_admin(&id));
        gate.authentifizieren(id, "geheim").unwrap();
        assert!(gate.ist_admin(&id));
        assert!(gate.autorisieren(&id, "play-track").is_ok());
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let mut gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        let err = gate.authentifizieren(id, "falsch").unwrap_err();
        assert_eq!(err, SyncMusicError::Authentifizierung);
        assert!(!gate.ist_admin(&id));
        assert_eq!(gate.registry().anzahl(), 0);
    }

    #[test]
    fn vergleich_ist_exakt() {
        let mut gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        assert!(gate.authentifizieren(id, "Geheim").is_err());
        assert!(gate.authentifizieren(id, "geheim ").is_err());
        assert!(gate.authentifizieren(id, "").is_err());
    }

    #[test]
    fn fehlversuch_entzieht_keine_rechte() {
        let mut gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        gate.authentifizieren(id, "geheim").unwrap();
        assert!(gate.authentifizieren(id, "falsch").is_err());
        assert!(gate.ist_admin(&id));
    }

    #[test]
    fn erneutes_login_ist_idempotent() {
        let mut gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        gate.authentifizieren(id, "geheim").unwrap();
        gate.authentifizieren(id, "geheim").unwrap();
        assert_eq!(gate.registry().anzahl(), 1);
    }

    #[test]
    fn nicht_admin_wird_verweigert() {
        let gate = AuthorizationGate::neu("geheim");
        let id = ConnectionId::new();

        let err = gate.autorisieren(&id, "stop-track").unwrap_err();
        assert_eq!(err, SyncMusicError::ZugriffVerweigert("stop-track".into()));
    }

    #[test]
    fn entziehen_beim_trennen() {
        let mut gate = AuthorizationGate::neu("geheim");
        let admin = ConnectionId::new();
        let andere = ConnectionId::new();

        gate.authentifizieren(admin, "geheim").unwrap();
        gate.authentifizieren(andere, "geheim").unwrap();

        assert!(gate.entziehen(&admin));
        assert!(!gate.ist_admin(&admin));
        assert!(gate.ist_admin(&andere));
        // Zweites Entziehen ist ein No-op
        assert!(!gate.entziehen(&admin));
    }
}
