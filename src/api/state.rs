//! Application state for the compensation engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use crate::engine::SalaryEngine;

/// Shared application state.
///
/// Axum clones this per request; the engine inside is reference
/// counted, so clones are cheap and every handler sees the same store.
#[derive(Clone)]
pub struct AppState {
    /// The configured engine facade.
    engine: SalaryEngine,
}

impl AppState {
    /// Creates a new application state around a configured engine.
    pub fn new(engine: SalaryEngine) -> Self {
        Self { engine }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &SalaryEngine {
        &self.engine
    }
}
