//! syncmusic-relay – Autorisierung und Broadcast des Wiedergabezustands
//!
//! Dieser Crate haelt den gemeinsamen "Now Playing"-Zustand, entscheidet
//! welche Verbindungen ihn veraendern duerfen und verteilt jede Aenderung
//! in fester Reihenfolge an alle verbundenen Clients.
//!
//! ## Architektur
//!
//! ```text
//! WebSocket (/ws, pro Verbindung ein Task)
//!     |
//!     v
//! RelayHandle  --- Befehls-Queue --->  RelayWorker (genau ein Task)
//!                                          |
//!                                          v
//!                                    CommandDispatcher
//!                                          |
//!                                          +-- Session-Manager (Connect, Disconnect, Sync)
//!                                          +-- AuthorizationGate (Admin-Login, Admin-Pruefung)
//!                                          +-- StateStore (Wiedergabezustand)
//!                                          +-- Broadcaster (Send-Queues aller Verbindungen)
//! ```
//!
//! Der Worker verarbeitet ein Ereignis nach dem anderen vollstaendig.
//! Zustandsaenderung und Broadcast sind dadurch atomar gegenueber allen
//! anderen Ereignissen, ohne dass ein Lock noetig ist.

pub mod admin;
pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
pub mod worker;

// Bequeme Re-Exporte
pub use admin::{AdminRegistry, AuthorizationGate};
pub use broadcast::Broadcaster;
pub use connection::{ws_router, VerbindungsKontext};
pub use dispatcher::CommandDispatcher;
pub use error::{RelayError, RelayResult};
pub use state::{RelayConfig, RelayState};
pub use store::{Mutation, StateStore};
pub use worker::{relay_starten, RelayHandle};
