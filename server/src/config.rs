//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Der Port kann ueber die Umgebungsvariable `PORT`
//! ueberschrieben werden.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use syncmusic_protocol::codec::DEFAULT_MAX_NACHRICHT_GROESSE;
use syncmusic_relay::broadcast::STANDARD_SEND_QUEUE_GROESSE;
use syncmusic_relay::state::{RelayConfig, STANDARD_ADMIN_PASSWORT, STANDARD_MAX_VERBINDUNGEN};

/// Umgebungsvariable fuer den Pfad der Konfigurationsdatei
pub const CONFIG_ENV: &str = "SYNCMUSIC_CONFIG";

/// Umgebungsvariable die `netzwerk.port` ueberschreibt
pub const PORT_ENV: &str = "PORT";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Admin-Zugang
    pub admin: AdminEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers (nur fuer Logs)
    pub name: String,
    /// Maximale Anzahl gleichzeitiger WebSocket-Verbindungen
    pub max_verbindungen: usize,
    /// Groesse der Send-Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Maximale Groesse einer eingehenden Nachricht in Bytes
    pub max_nachricht_groesse: usize,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "syncmusic".into(),
            max_verbindungen: STANDARD_MAX_VERBINDUNGEN,
            send_queue_groesse: STANDARD_SEND_QUEUE_GROESSE,
            max_nachricht_groesse: DEFAULT_MAX_NACHRICHT_GROESSE,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP und WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Admin-Zugang
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminEinstellungen {
    /// Geteiltes Admin-Passwort
    pub passwort: String,
}

impl Default for AdminEinstellungen {
    fn default() -> Self {
        Self {
            passwort: STANDARD_ADMIN_PASSWORT.into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Stellt `/metrics` bereit
    pub metriken_aktiviert: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            metriken_aktiviert: true,
        }
    }
}

/// Woher die geladene Konfiguration stammt
///
/// Beim Laden ist das Logging noch nicht initialisiert; eine fehlende
/// Datei meldet der Aufrufer erst danach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigHerkunft {
    Datei,
    /// Datei nicht gefunden
    Standardwerte,
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, ConfigHerkunft)> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok((config, ConfigHerkunft::Datei))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), ConfigHerkunft::Standardwerte))
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Laedt die Datei und wendet danach die Umgebung an
    pub fn aus_umgebung_laden(pfad: &str) -> anyhow::Result<(Self, ConfigHerkunft)> {
        let (mut config, herkunft) = Self::laden(pfad)?;
        config.port_ueberschreiben(std::env::var(PORT_ENV).ok().as_deref())?;
        Ok((config, herkunft))
    }

    /// Ueberschreibt `netzwerk.port` mit dem Wert aus `PORT`
    pub fn port_ueberschreiben(&mut self, wert: Option<&str>) -> anyhow::Result<()> {
        if let Some(wert) = wert {
            self.netzwerk.port = wert
                .trim()
                .parse()
                .with_context(|| format!("Ungueltiger Wert fuer {PORT_ENV}: '{wert}'"))?;
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Laufzeit-Konfiguration fuer das Relay
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            admin_passwort: self.admin.passwort.clone(),
            max_verbindungen: self.server.max_verbindungen,
            send_queue_groesse: self.server.send_queue_groesse,
        }
    }
}
