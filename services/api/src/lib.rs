//! Coach API Library Crate
//!
//! This library contains the hosting orchestrator for the learning coach:
//! application state, database access, REST handlers, the WebSocket agent
//! loop, and routing. The `api` binary is a thin wrapper around it.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
