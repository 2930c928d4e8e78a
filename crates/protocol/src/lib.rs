//! syncmusic-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Events die zwischen Client und Server
//! ausgetauscht werden, sowie den Text-Codec fuer WebSocket-Frames.
//!
//! Jede Nachricht ist ein JSON-Envelope `{"event": <name>, "data": <payload>}`.

pub mod codec;
pub mod error;
pub mod events;

pub use codec::TextCodec;
pub use error::{ProtocolError, ProtocolResult};
pub use events::{Envelope, InboundEvent, OutboundEvent};
