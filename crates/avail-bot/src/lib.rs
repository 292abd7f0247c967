//! # avail-bot
//!
//! The bot service binary crate: HTTP surface for gateway events and the
//! command layer, the chat REST client, the confirmation broker, and
//! startup wiring for the engine.

pub mod chat;
pub mod confirm;
pub mod handlers;
pub mod response;
pub mod server;

pub use server::{create_app, create_router, create_state, run, AppState};
