//! Catalog Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateImport, CreateProduct, DeleteAck, ExportRecord, ExportUpdateResult, ImportReceipt,
    ImportRecord, InsertAck, LATEST_PRODUCTS_LIMIT, Product, UpdateAck, UpdateProduct,
};
use crate::repository::CatalogRepository;

/// Products, exports and imports over a [`CatalogRepository`].
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        self.repository.list_products().await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn latest_products(&self) -> CatalogResult<Vec<Product>> {
        self.repository.latest_products(LATEST_PRODUCTS_LIMIT).await
    }

    /// Insert a product and, when it names an owner, the owner's export.
    #[instrument(skip(self, input), fields(product_name = %input.product_name))]
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<InsertAck> {
        let product = Product::new(input);
        let export = product
            .user_email
            .clone()
            .map(|email| ExportRecord::from_product(&product, email));

        let ack = self.repository.insert_product(product).await?;

        if let Some(export) = export {
            self.repository.insert_export(export).await?;
        }

        Ok(ack)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_product(&self, id: Uuid, changes: UpdateProduct) -> CatalogResult<UpdateAck> {
        let ack = self.repository.update_product(id, changes).await?;
        if ack.matched_count == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        let ack = self.repository.delete_product(id).await?;
        if ack.deleted_count == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(ack)
    }

    #[instrument(skip(self))]
    pub async fn list_exports(&self, email: Option<String>) -> CatalogResult<Vec<ExportRecord>> {
        let email = require_email(email)?;
        self.repository.list_exports(&email).await
    }

    /// Apply `changes` to the export and to the product it references.
    ///
    /// `rating` is not part of an export edit and is ignored here.
    #[instrument(skip(self, changes))]
    pub async fn update_export(
        &self,
        id: Uuid,
        changes: UpdateProduct,
    ) -> CatalogResult<ExportUpdateResult> {
        let export = self
            .repository
            .get_export(id)
            .await?
            .ok_or(CatalogError::ExportNotFound(id))?;

        let changes = UpdateProduct {
            rating: None,
            ..changes
        };

        let export_result = self.repository.update_export(id, changes.clone()).await?;
        let product_result = self
            .repository
            .update_product(export.product_id, changes)
            .await?;

        Ok(ExportUpdateResult {
            export_result,
            product_result,
        })
    }

    /// Delete the referenced product, then the export. Returns the product
    /// deletion result.
    #[instrument(skip(self))]
    pub async fn delete_export(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        let export = self
            .repository
            .get_export(id)
            .await?
            .ok_or(CatalogError::ExportNotFound(id))?;

        let product_ack = self.repository.delete_product(export.product_id).await?;
        self.repository.delete_export(id).await?;

        Ok(product_ack)
    }

    #[instrument(skip(self))]
    pub async fn list_imports(&self, email: Option<String>) -> CatalogResult<Vec<ImportRecord>> {
        let email = require_email(email)?;
        self.repository.list_imports(&email).await
    }

    /// Take `input.quantity` units from the product's stock and record the
    /// import.
    ///
    /// The decrement is a single conditional update, so concurrent imports
    /// cannot drive stock negative. The import record is written after the
    /// decrement; if that write fails the stock stays decremented.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, quantity = input.quantity))]
    pub async fn create_import(&self, input: CreateImport) -> CatalogResult<ImportReceipt> {
        let product_id = input.product_id;
        let requested = input.quantity;

        let product = self
            .repository
            .get_product(product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound(product_id))?;

        if requested > product.quantity {
            return Err(CatalogError::InsufficientStock {
                available: product.quantity,
                requested,
            });
        }

        let Some(updated) = self.repository.take_stock(product_id, requested).await? else {
            // Lost a race with another import or a delete.
            return Err(match self.repository.get_product(product_id).await? {
                Some(current) => CatalogError::InsufficientStock {
                    available: current.quantity,
                    requested,
                },
                None => CatalogError::ProductNotFound(product_id),
            });
        };

        let record = ImportRecord::snapshot(&updated, requested, input.user_email);
        let ack = self.repository.insert_import(record).await.inspect_err(|e| {
            tracing::error!(
                error = %e,
                remaining = updated.quantity,
                "Stock decremented but import record was not written"
            );
        })?;

        tracing::info!(remaining = updated.quantity, "Import completed");
        Ok(ImportReceipt::new(ack, updated.quantity))
    }

    /// Remove an import record. Stock is not restored.
    #[instrument(skip(self))]
    pub async fn delete_import(&self, id: Uuid) -> CatalogResult<DeleteAck> {
        self.repository.delete_import(id).await
    }
}

fn require_email(email: Option<String>) -> CatalogResult<String> {
    match email {
        Some(email) if !email.trim().is_empty() => Ok(email.trim().to_string()),
        _ => Err(CatalogError::MissingEmail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use mockall::predicate::*;

    fn product(quantity: i64) -> Product {
        Product::new(CreateProduct {
            product_name: "Widget".to_string(),
            image_url: "https://img.example.com/widget.png".to_string(),
            price: 12.5,
            origin: "Bangladesh".to_string(),
            rating: 4.0,
            quantity,
            category: None,
            description: None,
            user_email: None,
        })
    }

    fn import(product_id: Uuid, quantity: i64) -> CreateImport {
        CreateImport {
            product_id,
            quantity,
            user_email: "buyer@example.com".to_string(),
        }
    }

    fn insert_ack(id: Uuid) -> InsertAck {
        InsertAck {
            acknowledged: true,
            inserted_id: id,
        }
    }

    fn new_product_input(user_email: Option<&str>) -> CreateProduct {
        CreateProduct {
            product_name: "Widget".to_string(),
            image_url: String::new(),
            price: 0.0,
            origin: String::new(),
            rating: 0.0,
            quantity: 10,
            category: None,
            description: None,
            user_email: user_email.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_get_product().returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.get_product(Uuid::now_v7()).await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_latest_products_asks_for_six() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_latest_products()
            .with(eq(6))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = CatalogService::new(mock_repo);
        assert!(service.latest_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_product_without_email_skips_export() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_insert_product()
            .times(1)
            .returning(|p| Ok(insert_ack(p.id)));
        mock_repo.expect_insert_export().never();

        let service = CatalogService::new(mock_repo);
        let ack = service.create_product(new_product_input(None)).await.unwrap();

        assert!(ack.acknowledged);
    }

    #[tokio::test]
    async fn test_create_product_with_email_writes_linked_export() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_insert_product()
            .times(1)
            .returning(|p| Ok(insert_ack(p.id)));
        mock_repo
            .expect_insert_export()
            .withf(|e| e.user_email == "seller@example.com" && e.product_name == "Widget")
            .times(1)
            .returning(|e| Ok(insert_ack(e.id)));

        let service = CatalogService::new(mock_repo);
        let ack = service
            .create_product(new_product_input(Some("seller@example.com")))
            .await
            .unwrap();

        assert!(ack.acknowledged);
    }

    #[tokio::test]
    async fn test_list_exports_without_email_never_touches_repository() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_list_exports().never();

        let service = CatalogService::new(mock_repo);

        assert!(matches!(
            service.list_exports(None).await,
            Err(CatalogError::MissingEmail)
        ));
        assert!(matches!(
            service.list_exports(Some("   ".to_string())).await,
            Err(CatalogError::MissingEmail)
        ));
    }

    #[tokio::test]
    async fn test_list_imports_without_email_never_touches_repository() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_list_imports().never();

        let service = CatalogService::new(mock_repo);
        let result = service.list_imports(None).await;

        assert!(matches!(result, Err(CatalogError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_list_imports_by_email() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_list_imports()
            .with(eq("buyer@example.com"))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = CatalogService::new(mock_repo);
        let result = service
            .list_imports(Some("buyer@example.com".to_string()))
            .await;

        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_product_not_matched_is_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_update_product().returning(|_, _| {
            Ok(UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            })
        });

        let service = CatalogService::new(mock_repo);
        let result = service
            .update_product(Uuid::now_v7(), UpdateProduct::default())
            .await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_product_nothing_deleted_is_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_delete_product().returning(|_| {
            Ok(DeleteAck {
                acknowledged: true,
                deleted_count: 0,
            })
        });

        let service = CatalogService::new(mock_repo);
        let result = service.delete_product(Uuid::now_v7()).await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_export_cascades_to_referenced_product() {
        let source = product(10);
        let export = ExportRecord::from_product(&source, "seller@example.com".to_string());
        let export_id = export.id;
        let product_id = source.id;

        let ack = UpdateAck {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
        };

        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_export()
            .with(eq(export_id))
            .returning(move |_| Ok(Some(export.clone())));
        let export_ack = ack.clone();
        mock_repo
            .expect_update_export()
            .withf(move |id, changes| *id == export_id && changes.rating.is_none())
            .times(1)
            .returning(move |_, _| Ok(export_ack.clone()));
        mock_repo
            .expect_update_product()
            .withf(move |id, changes| {
                *id == product_id && changes.product_name.as_deref() == Some("Gadget")
            })
            .times(1)
            .returning(move |_, _| Ok(ack.clone()));

        let service = CatalogService::new(mock_repo);
        let changes = UpdateProduct {
            product_name: Some("Gadget".to_string()),
            rating: Some(5.0),
            ..Default::default()
        };
        let result = service.update_export(export_id, changes).await.unwrap();

        assert_eq!(result.export_result.modified_count, 1);
        assert_eq!(result.product_result.modified_count, 1);
    }

    #[tokio::test]
    async fn test_update_missing_export_is_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_get_export().returning(|_| Ok(None));
        mock_repo.expect_update_export().never();
        mock_repo.expect_update_product().never();

        let service = CatalogService::new(mock_repo);
        let result = service
            .update_export(Uuid::now_v7(), UpdateProduct::default())
            .await;

        assert!(matches!(result, Err(CatalogError::ExportNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_export_removes_product_then_export() {
        let source = product(10);
        let export = ExportRecord::from_product(&source, "seller@example.com".to_string());
        let export_id = export.id;
        let product_id = source.id;

        let mut seq = mockall::Sequence::new();
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_export()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(export.clone())));
        mock_repo
            .expect_delete_product()
            .with(eq(product_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(DeleteAck {
                    acknowledged: true,
                    deleted_count: 1,
                })
            });
        mock_repo
            .expect_delete_export()
            .with(eq(export_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(DeleteAck {
                    acknowledged: true,
                    deleted_count: 1,
                })
            });

        let service = CatalogService::new(mock_repo);
        let ack = service.delete_export(export_id).await.unwrap();

        assert_eq!(ack.deleted_count, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_export_is_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_get_export().returning(|_| Ok(None));
        mock_repo.expect_delete_product().never();
        mock_repo.expect_delete_export().never();

        let service = CatalogService::new(mock_repo);
        let result = service.delete_export(Uuid::now_v7()).await;

        assert!(matches!(result, Err(CatalogError::ExportNotFound(_))));
    }

    #[tokio::test]
    async fn test_import_unknown_product_is_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_get_product().returning(|_| Ok(None));
        mock_repo.expect_take_stock().never();
        mock_repo.expect_insert_import().never();

        let service = CatalogService::new(mock_repo);
        let result = service.create_import(import(Uuid::now_v7(), 1)).await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_import_over_stock_changes_nothing() {
        let stocked = product(6);
        let id = stocked.id;

        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_product()
            .returning(move |_| Ok(Some(stocked.clone())));
        mock_repo.expect_take_stock().never();
        mock_repo.expect_insert_import().never();

        let service = CatalogService::new(mock_repo);
        let result = service.create_import(import(id, 10)).await;

        assert!(matches!(
            result,
            Err(CatalogError::InsufficientStock {
                available: 6,
                requested: 10
            })
        ));
    }

    #[tokio::test]
    async fn test_import_decrements_then_records_snapshot() {
        let stocked = product(10);
        let id = stocked.id;
        let mut after = stocked.clone();
        after.quantity = 6;

        let mut seq = mockall::Sequence::new();
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(stocked.clone())));
        mock_repo
            .expect_take_stock()
            .with(eq(id), eq(4))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(after.clone())));
        mock_repo
            .expect_insert_import()
            .withf(move |r| {
                r.product_id == id
                    && r.imported_quantity == 4
                    && r.user_email == "buyer@example.com"
                    && r.price == 12.5
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|r| Ok(insert_ack(r.id)));

        let service = CatalogService::new(mock_repo);
        let receipt = service.create_import(import(id, 4)).await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.message, "Product imported successfully");
        assert_eq!(receipt.remaining_quantity, 6);
    }

    #[tokio::test]
    async fn test_import_losing_race_is_rejected_without_record() {
        let stocked = product(5);
        let id = stocked.id;
        let mut drained = stocked.clone();
        drained.quantity = 1;

        let mut seq = mockall::Sequence::new();
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(stocked.clone())));
        mock_repo
            .expect_take_stock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        mock_repo
            .expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(drained.clone())));
        mock_repo.expect_insert_import().never();

        let service = CatalogService::new(mock_repo);
        let result = service.create_import(import(id, 5)).await;

        assert!(matches!(
            result,
            Err(CatalogError::InsufficientStock {
                available: 1,
                requested: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_import_product_deleted_mid_flight_is_not_found() {
        let stocked = product(5);
        let id = stocked.id;

        let mut seq = mockall::Sequence::new();
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(stocked.clone())));
        mock_repo
            .expect_take_stock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        mock_repo
            .expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.create_import(import(id, 2)).await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_import_passes_ack_through() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_delete_import().returning(|_| {
            Ok(DeleteAck {
                acknowledged: true,
                deleted_count: 0,
            })
        });

        let service = CatalogService::new(mock_repo);
        let ack = service.delete_import(Uuid::now_v7()).await.unwrap();

        assert_eq!(ack.deleted_count, 0);
    }
}
