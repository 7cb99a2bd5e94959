//! eSIM Global Gateway library.
//!
//! This crate provides the gateway functionality as a library, allowing it
//! to be tested and reused. The binary in `main.rs` wires it to the
//! process lifecycle.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod provider;
pub mod refresh;
pub mod resolve;
pub mod routes;
pub mod snapshot;
pub mod state;
pub mod wordpress;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the gateway application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
