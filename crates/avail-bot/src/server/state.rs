//! Application state shared across all handlers

use std::sync::Arc;

use avail_common::AvailConfig;
use avail_engine::{EngineContext, Flusher};

use crate::confirm::ConfirmationBroker;

/// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    ctx: EngineContext,
    flusher: Arc<Flusher>,
    broker: Arc<ConfirmationBroker>,
    config: Arc<AvailConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        ctx: EngineContext,
        flusher: Arc<Flusher>,
        broker: Arc<ConfirmationBroker>,
        config: AvailConfig,
    ) -> Self {
        Self {
            ctx,
            flusher,
            broker,
            config: Arc::new(config),
        }
    }

    /// Get the engine context
    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    /// Get the flusher
    pub fn flusher(&self) -> &Flusher {
        &self.flusher
    }

    /// Get the flusher as a shareable handle
    pub fn flusher_arc(&self) -> Arc<Flusher> {
        self.flusher.clone()
    }

    /// Get the confirmation broker
    pub fn broker(&self) -> &ConfirmationBroker {
        &self.broker
    }

    /// Get the application configuration
    pub fn config(&self) -> &AvailConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ctx", &"EngineContext")
            .field("config", &"AvailConfig")
            .finish()
    }
}
