//! Relay-Worker – serialisiert alle Ereignisse in einem einzigen Task
//!
//! Verbindungs-Tasks sprechen den Worker ausschliesslich ueber einen
//! `RelayHandle` an. Der Worker verarbeitet die Befehle in Ankunftsreihenfolge
//! und jeweils vollstaendig, bevor der naechste beginnt.

use crate::dispatcher::CommandDispatcher;
use crate::error::{RelayError, RelayResult};
use crate::state::RelayState;
use async_trait::async_trait;
use syncmusic_core::ConnectionId;
use syncmusic_observability::{RelayStatus, StatusQuelle};
use syncmusic_protocol::{Envelope, OutboundEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Groesse der Befehls-Queue des Workers
const BEFEHL_QUEUE_GROESSE: usize = 1024;

/// Befehle an den Relay-Worker
#[derive(Debug)]
pub enum RelayBefehl {
    /// Verbindung registrieren; `None` wenn das Limit erreicht ist
    Verbinden {
        id: ConnectionId,
        antwort: oneshot::Sender<Option<mpsc::Receiver<OutboundEvent>>>,
    },
    /// Verbindung entfernen
    Trennen { id: ConnectionId },
    /// Dekodierte Nachricht einer Verbindung
    Nachricht { id: ConnectionId, envelope: Envelope },
    /// Momentaufnahme fuer den Status-Endpunkt
    Status { antwort: oneshot::Sender<RelayStatus> },
}

/// Klonbares Handle auf den Relay-Worker
#[derive(Clone, Debug)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayBefehl>,
}

impl RelayHandle {
    /// Registriert eine Verbindung und liefert ihre Send-Queue
    pub async fn verbinden(
        &self,
        id: ConnectionId,
    ) -> RelayResult<Option<mpsc::Receiver<OutboundEvent>>> {
        let (antwort, rx) = oneshot::channel();
        self.senden(RelayBefehl::Verbinden { id, antwort }).await?;
        rx.await.map_err(|_| RelayError::WorkerBeendet)
    }

    pub async fn trennen(&self, id: ConnectionId) -> RelayResult<()> {
        self.senden(RelayBefehl::Trennen { id }).await
    }

    pub async fn nachricht(&self, id: ConnectionId, envelope: Envelope) -> RelayResult<()> {
        self.senden(RelayBefehl::Nachricht { id, envelope }).await
    }

    pub async fn status(&self) -> RelayResult<RelayStatus> {
        let (antwort, rx) = oneshot::channel();
        self.senden(RelayBefehl::Status { antwort }).await?;
        rx.await.map_err(|_| RelayError::WorkerBeendet)
    }

    async fn senden(&self, befehl: RelayBefehl) -> RelayResult<()> {
        self.tx
            .send(befehl)
            .await
            .map_err(|_| RelayError::WorkerBeendet)
    }
}

#[async_trait]
impl StatusQuelle for RelayHandle {
    async fn status_abfragen(&self) -> Option<RelayStatus> {
        match self.status().await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(fehler = %e, "Status nicht verfuegbar");
                None
            }
        }
    }
}

/// Startet den Relay-Worker als Tokio-Task
///
/// Der Worker endet sobald alle `RelayHandle`s gedroppt wurden.
pub fn relay_starten(state: RelayState) -> (RelayHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(BEFEHL_QUEUE_GROESSE);
    let worker = RelayWorker {
        dispatcher: CommandDispatcher::neu(state),
        rx,
    };
    let task = tokio::spawn(worker.laufen());
    (RelayHandle { tx }, task)
}

struct RelayWorker {
    dispatcher: CommandDispatcher,
    rx: mpsc::Receiver<RelayBefehl>,
}

impl RelayWorker {
    async fn laufen(mut self) {
        tracing::info!("Relay-Worker gestartet");
        while let Some(befehl) = self.rx.recv().await {
            self.verarbeiten(befehl);
        }
        tracing::info!("Relay-Worker beendet");
    }

    fn verarbeiten(&mut self, befehl: RelayBefehl) {
        match befehl {
            RelayBefehl::Verbinden { id, antwort } => {
                let rx = self.dispatcher.verbinden(id);
                let registriert = rx.is_some();
                if antwort.send(rx).is_err() && registriert {
                    // Aufrufer ist schon weg, niemand liest die Queue
                    tracing::debug!(connection = %id, "Verbindungs-Task vor Registrierung beendet");
                    self.dispatcher.trennen(id);
                }
            }
            RelayBefehl::Trennen { id } => self.dispatcher.trennen(id),
            RelayBefehl::Nachricht { id, envelope } => self.dispatcher.dispatch(id, envelope),
            RelayBefehl::Status { antwort } => {
                let _ = antwort.send(self.dispatcher.status());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RelayConfig;
    use serde_json::json;
    use syncmusic_observability::RelayMetrics;

    fn starten() -> (RelayHandle, JoinHandle<()>) {
        relay_starten(RelayState::neu(
            RelayConfig::default(),
            RelayMetrics::neu().unwrap(),
        ))
    }

    #[tokio::test]
    async fn verbinden_liefert_sync_und_anzahl() {
        let (handle, _task) = starten();
        let mut rx = handle.verbinden(ConnectionId::new()).await.unwrap().unwrap();

        assert!(matches!(rx.recv().await.unwrap(), OutboundEvent::Sync(_)));
        assert_eq!(rx.recv().await.unwrap(), OutboundEvent::listener_count(1));
    }

    #[tokio::test]
    async fn befehle_werden_in_reihenfolge_verarbeitet() {
        let (handle, _task) = starten();
        let id = ConnectionId::new();
        let mut rx = handle.verbinden(id).await.unwrap().unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        handle
            .nachricht(id, Envelope::neu("admin-login", json!({"password": "admin123"})))
            .await
            .unwrap();
        handle
            .nachricht(id, Envelope::neu("set-volume", json!({"volume": 42})))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), OutboundEvent::admin_authenticated(true));
        assert!(matches!(
            rx.recv().await.unwrap(),
            OutboundEvent::VolumeChanged(v) if v.volume.wert() == 42
        ));
    }

    #[tokio::test]
    async fn status_ueber_handle() {
        let (handle, _task) = starten();
        let _rx = handle.verbinden(ConnectionId::new()).await.unwrap();

        let status = handle.status_abfragen().await.unwrap();
        assert_eq!(status.listener_count, 1);
        assert_eq!(status.current_track_title, None);
    }

    #[tokio::test]
    async fn trennen_aktualisiert_anzahl() {
        let (handle, _task) = starten();
        let a = ConnectionId::new();
        let mut rx_a = handle.verbinden(a).await.unwrap().unwrap();
        let b = ConnectionId::new();
        let _rx_b = handle.verbinden(b).await.unwrap().unwrap();

        handle.trennen(b).await.unwrap();
        assert_eq!(handle.status().await.unwrap().listener_count, 1);

        let mut letzte = None;
        while let Ok(event) = rx_a.try_recv() {
            letzte = Some(event);
        }
        assert_eq!(letzte, Some(OutboundEvent::listener_count(1)));
    }

    #[tokio::test]
    async fn worker_endet_wenn_handles_weg_sind() {
        let (handle, task) = starten();
        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn beendeter_worker_meldet_fehler() {
        let (handle, task) = starten();
        task.abort();
        let _ = task.await;

        assert!(matches!(
            handle.status().await,
            Err(RelayError::WorkerBeendet)
        ));
        assert!(handle.status_abfragen().await.is_none());
    }
}
