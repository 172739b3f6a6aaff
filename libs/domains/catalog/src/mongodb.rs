//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
    results::{DeleteResult, UpdateResult},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{
    DeleteAck, ExportRecord, ImportRecord, InsertAck, Product, UpdateAck, UpdateProduct, timestamp,
};
use crate::repository::CatalogRepository;

pub const PRODUCTS_COLLECTION: &str = "products";
pub const EXPORTS_COLLECTION: &str = "exports";
pub const IMPORTS_COLLECTION: &str = "importProducts";

/// MongoDB implementation of the CatalogRepository
#[derive(Clone)]
pub struct MongoCatalogRepository {
    products: Collection<Product>,
    exports: Collection<ExportRecord>,
    imports: Collection<ImportRecord>,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            products: db.collection(PRODUCTS_COLLECTION),
            exports: db.collection(EXPORTS_COLLECTION),
            imports: db.collection(IMPORTS_COLLECTION),
        }
    }

    /// Create the indexes behind the latest-products sort and the per-user
    /// listings. Safe to call on every startup.
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let named = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        self.products
            .create_index(named(doc! { "createdAt": -1 }, "idx_created_at"))
            .await?;
        self.exports
            .create_indexes(vec![
                named(doc! { "userEmail": 1 }, "idx_user_email"),
                named(doc! { "productId": 1 }, "idx_product_id"),
            ])
            .await?;
        self.imports
            .create_index(named(doc! { "userEmail": 1 }, "idx_user_email"))
            .await?;

        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    /// `$set` document for the fields present in `changes`, always stamping
    /// `updatedAt`.
    fn build_update(changes: &UpdateProduct, now: DateTime<Utc>) -> Document {
        let mut set = doc! {};

        if let Some(ref name) = changes.product_name {
            set.insert("productName", name.as_str());
        }
        if let Some(ref url) = changes.image_url {
            set.insert("imageUrl", url.as_str());
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(ref origin) = changes.origin {
            set.insert("origin", origin.as_str());
        }
        if let Some(rating) = changes.rating {
            set.insert("rating", rating);
        }
        if let Some(quantity) = changes.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(ref category) = changes.category {
            set.insert("category", category.as_str());
        }
        if let Some(ref description) = changes.description {
            set.insert("description", description.as_str());
        }
        set.insert("updatedAt", timestamp::format(&now));

        doc! { "$set": set }
    }
}

fn update_ack(result: UpdateResult) -> UpdateAck {
    UpdateAck {
        acknowledged: true,
        matched_count: result.matched_count,
        modified_count: result.modified_count,
    }
}

fn delete_ack(result: DeleteResult) -> DeleteAck {
    DeleteAck {
        acknowledged: true,
        deleted_count: result.deleted_count,
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self))]
    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        let cursor = self.products.find(doc! {}).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.products.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn latest_products(&self, limit: i64) -> CatalogResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();

        let cursor = self.products.find(doc! {}).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert_product(&self, product: Product) -> CatalogResult<InsertAck> {
        self.products.insert_one(&product).await?;

        tracing::info!("Product created");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: product.id,
        })
    }

    #[instrument(skip(self, changes))]
    async fn update_product(&self, id: Uuid, changes: UpdateProduct) -> CatalogResult<UpdateAck> {
        let update = Self::build_update(&changes, timestamp::now());
        let result = self.products.update_one(Self::id_filter(id), update).await?;

        tracing::info!(matched = result.matched_count, "Product updated");
        Ok(update_ack(result))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        let result = self.products.delete_one(Self::id_filter(id)).await?;

        tracing::info!(deleted = result.deleted_count, "Product deleted");
        Ok(delete_ack(result))
    }

    #[instrument(skip(self))]
    async fn take_stock(&self, id: Uuid, quantity: i64) -> CatalogResult<Option<Product>> {
        let filter = doc! {
            "_id": id.to_string(),
            "quantity": { "$gte": quantity },
        };
        let update = doc! {
            "$inc": { "quantity": -quantity },
            "$set": { "updatedAt": timestamp::format(&timestamp::now()) },
        };

        let product = self
            .products
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        match product {
            Some(ref p) => tracing::info!(remaining = p.quantity, "Stock decremented"),
            None => tracing::info!("Stock decrement matched no product"),
        }
        Ok(product)
    }

    #[instrument(skip(self, export), fields(export_id = %export.id, product_id = %export.product_id))]
    async fn insert_export(&self, export: ExportRecord) -> CatalogResult<InsertAck> {
        self.exports.insert_one(&export).await?;

        tracing::info!("Export created");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: export.id,
        })
    }

    #[instrument(skip(self))]
    async fn list_exports(&self, email: &str) -> CatalogResult<Vec<ExportRecord>> {
        let cursor = self.exports.find(doc! { "userEmail": email }).await?;
        let exports: Vec<ExportRecord> = cursor.try_collect().await?;
        Ok(exports)
    }

    #[instrument(skip(self))]
    async fn get_export(&self, id: Uuid) -> CatalogResult<Option<ExportRecord>> {
        Ok(self.exports.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_export(&self, id: Uuid, changes: UpdateProduct) -> CatalogResult<UpdateAck> {
        let update = Self::build_update(&changes, timestamp::now());
        let result = self.exports.update_one(Self::id_filter(id), update).await?;

        tracing::info!(matched = result.matched_count, "Export updated");
        Ok(update_ack(result))
    }

    #[instrument(skip(self))]
    async fn delete_export(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        let result = self.exports.delete_one(Self::id_filter(id)).await?;

        tracing::info!(deleted = result.deleted_count, "Export deleted");
        Ok(delete_ack(result))
    }

    #[instrument(skip(self, record), fields(import_id = %record.id, product_id = %record.product_id))]
    async fn insert_import(&self, record: ImportRecord) -> CatalogResult<InsertAck> {
        self.imports.insert_one(&record).await?;

        tracing::info!("Import recorded");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: record.id,
        })
    }

    #[instrument(skip(self))]
    async fn list_imports(&self, email: &str) -> CatalogResult<Vec<ImportRecord>> {
        let cursor = self.imports.find(doc! { "userEmail": email }).await?;
        let imports: Vec<ImportRecord> = cursor.try_collect().await?;
        Ok(imports)
    }

    #[instrument(skip(self))]
    async fn delete_import(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        let result = self.imports.delete_one(Self::id_filter(id)).await?;

        tracing::info!(deleted = result.deleted_count, "Import deleted");
        Ok(delete_ack(result))
    }
}
