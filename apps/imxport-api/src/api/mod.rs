//! API routes module

pub mod catalog;
pub mod health;

use axum::{Router, routing::get};

use crate::state::AppState;

pub const BANNER: &str = "ImXport server is running";

/// All service routes. `create_router` mounts them at the root.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(banner_router())
        .merge(catalog::router(state))
        .merge(health::router(state.clone()))
}

fn banner_router() -> Router {
    Router::new().route("/", get(|| async { BANNER }))
}
