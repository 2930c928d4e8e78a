//! syncmusic-server – Bibliotheks-Root
//!
//! Setzt Relay-Worker, WebSocket-Endpunkt, Status- und Metrik-Endpunkt zu
//! einem axum-Server zusammen und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use axum::Router;
use config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use syncmusic_observability::{metrics_router, status_router, timing_middleware, RelayMetrics};
use syncmusic_protocol::TextCodec;
use syncmusic_relay::{relay_starten, ws_router, RelayState, VerbindungsKontext};
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Haelt die Server-Konfiguration bis zum Binden
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bindet den TCP-Listener
    ///
    /// Ein Bind-Fehler ist der einzige Fehler der den Start abbricht.
    pub async fn binden(self) -> Result<GebundenerServer> {
        let adresse = self.config.bind_adresse();
        let listener = TcpListener::bind(&adresse)
            .await
            .with_context(|| format!("Bind auf {adresse} fehlgeschlagen"))?;
        Ok(GebundenerServer {
            config: self.config,
            listener,
        })
    }

    /// Bindet, startet und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let server = self.binden().await?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
                Err(e) => tracing::error!(fehler = %e, "Ctrl-C-Handler fehlgeschlagen"),
            }
            let _ = shutdown_tx.send(true);
        });

        server.laufen(shutdown_rx).await
    }
}

/// Server mit gebundenem Listener, bereit zum Laufen
pub struct GebundenerServer {
    config: ServerConfig,
    listener: TcpListener,
}

impl GebundenerServer {
    /// Tatsaechlich gebundene Adresse (relevant bei Port 0)
    pub fn lokale_adresse(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Startet den Relay-Worker und bedient HTTP und WebSocket bis zum Shutdown
    ///
    /// Reihenfolge:
    /// 1. Metriken-Registry anlegen
    /// 2. Relay-Worker starten
    /// 3. Router zusammensetzen (`/ws`, `/`, `/status`, optional `/metrics`)
    /// 4. Bedienen bis `shutdown_rx` auf `true` wechselt
    pub async fn laufen(self, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let config = self.config;
        let adresse = self.listener.local_addr()?;

        let metriken = RelayMetrics::neu()?;
        let (handle, _worker) = relay_starten(RelayState::neu(config.relay_config(), metriken.clone()));

        let kontext = VerbindungsKontext {
            handle: handle.clone(),
            codec: TextCodec::with_max_size(config.server.max_nachricht_groesse),
            metrics: metriken.clone(),
            shutdown_rx: shutdown_rx.clone(),
        };

        let mut app = Router::new()
            .merge(ws_router(kontext))
            .merge(status_router(Arc::new(handle)));
        if config.observability.metriken_aktiviert {
            app = app.merge(metrics_router(metriken));
        }
        let app = app.layer(axum::middleware::from_fn(timing_middleware));

        tracing::info!(
            server_name = %config.server.name,
            adresse = %adresse,
            max_verbindungen = config.server.max_verbindungen,
            metriken = config.observability.metriken_aktiviert,
            "Server laeuft"
        );

        axum::serve(self.listener, app)
            .with_graceful_shutdown(auf_shutdown_warten(shutdown_rx))
            .await
            .context("HTTP-Server fehlgeschlagen")?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Wartet bis das Shutdown-Signal gesetzt oder der Sender gedroppt wird
async fn auf_shutdown_warten(mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}
