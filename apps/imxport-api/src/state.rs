//! Shared application state.

use mongodb::{Client, Database};

/// State built once in `main` and handed to the route constructors.
///
/// Cloning is cheap: the MongoDB handles share one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Kept for readiness probes and for shutdown
    pub mongo_client: Client,
    pub db: Database,
}
