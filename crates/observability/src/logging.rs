//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `SYNCMUSIC_LOG_LEVEL`: Filter (z.B. `info` oder `syncmusic_relay=debug`)
//! - `SYNCMUSIC_LOG_FORMAT`: Format (text/json)
//!
//! Die Umgebung hat Vorrang vor den Werten aus der Konfigurationsdatei.

use tracing_subscriber::{fmt, EnvFilter};

/// Name der Umgebungsvariable fuer den Log-Filter
pub const LOG_LEVEL_ENV: &str = "SYNCMUSIC_LOG_LEVEL";

/// Name der Umgebungsvariable fuer das Log-Format
pub const LOG_FORMAT_ENV: &str = "SYNCMUSIC_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Faellt auf `info` / `text` zurueck falls weder Umgebung noch
/// Konfiguration einen gueltigen Wert liefern.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_env = std::env::var(LOG_FORMAT_ENV).ok();
    let format = format_waehlen(format_env.as_deref(), format);

    match format {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Waehlt das Log-Format: Umgebung vor Konfiguration, ungueltige Werte
/// fallen auf `text` zurueck.
pub fn format_waehlen<'a>(aus_env: Option<&'a str>, aus_config: &'a str) -> &'a str {
    match aus_env {
        Some(f) if log_format_gueltig(f) => f,
        _ if log_format_gueltig(aus_config) => aus_config,
        _ => "text",
    }
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_gueltige_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }

    #[test]
    fn format_umgebung_hat_vorrang() {
        assert_eq!(format_waehlen(Some("json"), "text"), "json");
        assert_eq!(format_waehlen(None, "json"), "json");
    }

    #[test]
    fn format_ungueltig_faellt_zurueck() {
        assert_eq!(format_waehlen(Some("xml"), "json"), "json");
        assert_eq!(format_waehlen(Some("xml"), "yaml"), "text");
        assert_eq!(format_waehlen(None, ""), "text");
    }
}
