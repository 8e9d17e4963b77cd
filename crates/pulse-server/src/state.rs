//! Shared application state.

use std::sync::Arc;

use pulse_core::{Clock, PulseConfig};
use pulse_runtime::Engine;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: PulseConfig,
    pub engine: Arc<Engine>,
    pub clock: Arc<dyn Clock>,
    pub started_at: i64,
}

impl AppState {
    pub fn new(config: PulseConfig, engine: Arc<Engine>, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now_ms();
        Self {
            config,
            engine,
            clock,
            started_at,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }
}
