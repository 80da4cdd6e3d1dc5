//! WebSocket layer: the real-time audit stream.
//!
//! The endpoint at `/ws` lets clients subscribe to pools (or `"*"`) and
//! receive every matching ledger event as it is published.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
