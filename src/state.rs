//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! store keeps nothing in memory between requests: every handler goes
//! straight to Postgres through the shared pool.

use sqlx::PgPool;

/// Canvas size applied to diagrams created without explicit dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramDefaults {
    pub width: i32,
    pub height: i32,
}

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub defaults: DiagramDefaults,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, defaults: DiagramDefaults) -> Self {
        Self { pool, defaults }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
