//! Catalog API routes
//!
//! Wires the catalog domain to the shared MongoDB database.

use axum::Router;
use domain_catalog::{CatalogResult, CatalogService, MongoCatalogRepository, handlers};
use mongodb::Database;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoCatalogRepository::new(&state.db);
    handlers::router(CatalogService::new(repository))
}

pub async fn init_indexes(db: &Database) -> CatalogResult<()> {
    MongoCatalogRepository::new(db).init_indexes().await
}
