use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{
    DeleteAck, ExportRecord, ImportRecord, InsertAck, Product, UpdateAck, UpdateProduct,
};

/// Persistence for the three catalog collections.
///
/// Every method is a single document-store call; multi-step flows live in
/// [`CatalogService`](crate::service::CatalogService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_products(&self) -> CatalogResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Newest first by `createdAt`
    async fn latest_products(&self, limit: i64) -> CatalogResult<Vec<Product>>;

    async fn insert_product(&self, product: Product) -> CatalogResult<InsertAck>;

    /// Set the provided fields and `updatedAt`
    async fn update_product(&self, id: Uuid, changes: UpdateProduct) -> CatalogResult<UpdateAck>;

    async fn delete_product(&self, id: Uuid) -> CatalogResult<DeleteAck>;

    /// Atomically decrement stock by `quantity` if at least that much remains.
    ///
    /// Returns the product after the decrement, or `None` when no product
    /// with `id` has enough stock.
    async fn take_stock(&self, id: Uuid, quantity: i64) -> CatalogResult<Option<Product>>;

    async fn insert_export(&self, export: ExportRecord) -> CatalogResult<InsertAck>;

    async fn list_exports(&self, email: &str) -> CatalogResult<Vec<ExportRecord>>;

    async fn get_export(&self, id: Uuid) -> CatalogResult<Option<ExportRecord>>;

    async fn update_export(&self, id: Uuid, changes: UpdateProduct) -> CatalogResult<UpdateAck>;

    async fn delete_export(&self, id: Uuid) -> CatalogResult<DeleteAck>;

    async fn insert_import(&self, record: ImportRecord) -> CatalogResult<InsertAck>;

    async fn list_imports(&self, email: &str) -> CatalogResult<Vec<ImportRecord>>;

    async fn delete_import(&self, id: Uuid) -> CatalogResult<DeleteAck>;
}
