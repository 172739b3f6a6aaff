//! Catalog Domain
//!
//! Products, the exports users list them through, and the imports that take
//! stock from them, stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Required email, stock checks, export cascades
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, acknowledgments
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, MongoCatalogRepository, CatalogService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("imxportDB");
//!
//! let repository = MongoCatalogRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(CatalogService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateImport, CreateProduct, DeleteAck, EmailQuery, ExportRecord, ExportUpdateResult,
    ImportReceipt, ImportRecord, InsertAck, LATEST_PRODUCTS_LIMIT, Product, UpdateAck,
    UpdateProduct,
};
pub use mongodb::MongoCatalogRepository;
pub use repository::CatalogRepository;
pub use service::CatalogService;
