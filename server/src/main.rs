//! syncmusic Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use syncmusic_observability::logging_initialisieren;
use syncmusic_server::{
    config::{ConfigHerkunft, ServerConfig, CONFIG_ENV},
    Server,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt, PORT ueberschreibt)
    let config = match ServerConfig::aus_umgebung_laden(&config_pfad) {
        Ok((config, herkunft)) => {
            logging_initialisieren(&config.logging.level, &config.logging.format);
            if herkunft == ConfigHerkunft::Standardwerte {
                tracing::warn!(
                    pfad = %config_pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
            }
            config
        }
        Err(e) => {
            logging_initialisieren("info", "text");
            tracing::error!(fehler = %e, config = %config_pfad, "Konfiguration ungueltig");
            return Err(e);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "syncmusic wird initialisiert"
    );

    // Server starten
    if let Err(e) = Server::neu(config).starten().await {
        tracing::error!(fehler = %e, "Server beendet mit Fehler");
        return Err(e);
    }

    Ok(())
}
