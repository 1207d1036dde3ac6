//! WebSocket Session Management
//!
//! Real-time coach sessions run over a WebSocket. Submodules:
//!
//! - `protocol`: the JSON message format between client and server.
//! - `session`: connection lifecycle, from handshake to termination.
//! - `cycle`: the agent's reason-act loop for processing one user turn.

mod cycle;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
