//! MongoDB repository tests against a real server.
//!
//! Each test starts its own container through `TestMongo`, so they need
//! Docker and are ignored by default:
//!
//! ```sh
//! cargo test -p domain_catalog --test integration_test -- --ignored
//! ```

use domain_catalog::*;
use test_utils::{TestDataBuilder, TestMongo};
use uuid::Uuid;

async fn setup(test_name: &str) -> (TestMongo, CatalogService<MongoCatalogRepository>, MongoCatalogRepository) {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);
    let db = mongo.database(&builder.database_name());

    let repo = MongoCatalogRepository::new(&db);
    repo.init_indexes().await.unwrap();
    let service = CatalogService::new(repo.clone());

    (mongo, service, repo)
}

fn widget(quantity: i64, user_email: Option<String>) -> CreateProduct {
    CreateProduct {
        product_name: "Widget".to_string(),
        image_url: "https://img.example.com/widget.png".to_string(),
        price: 12.5,
        origin: "Bangladesh".to_string(),
        rating: 4.0,
        quantity,
        category: Some("tools".to_string()),
        description: None,
        user_email,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_fetch_by_id_returns_inserted_document() {
    let (_mongo, service, repo) = setup("it_fetch_by_id").await;

    let product = Product::new(widget(10, None));
    let id = product.id;
    repo.insert_product(product.clone()).await.unwrap();

    let fetched = service.get_product(id).await.unwrap();
    assert_eq!(fetched, product);

    let missing = service.get_product(Uuid::now_v7()).await;
    assert!(matches!(missing, Err(CatalogError::ProductNotFound(_))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_latest_products_newest_first() {
    let (_mongo, service, _repo) = setup("it_latest").await;

    for i in 0..8 {
        let mut input = widget(1, None);
        input.product_name = format!("Widget {i}");
        service.create_product(input).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let latest = service.latest_products().await.unwrap();
    assert_eq!(latest.len(), 6);
    assert_eq!(latest[0].product_name, "Widget 7");
    assert!(latest.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_widget_import_scenario() {
    let (_mongo, service, repo) = setup("it_widget_scenario").await;
    let builder = TestDataBuilder::from_test_name("it_widget_scenario");
    let buyer = builder.email("buyer");

    let ack = service.create_product(widget(10, None)).await.unwrap();
    let id = ack.inserted_id;

    let receipt = service
        .create_import(CreateImport {
            product_id: id,
            quantity: 4,
            user_email: buyer.clone(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.remaining_quantity, 6);

    let rejected = service
        .create_import(CreateImport {
            product_id: id,
            quantity: 10,
            user_email: buyer.clone(),
        })
        .await;
    assert!(matches!(rejected, Err(CatalogError::InsufficientStock { .. })));

    assert_eq!(repo.get_product(id).await.unwrap().unwrap().quantity, 6);

    let imports = service.list_imports(Some(buyer)).await.unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].imported_quantity, 4);
    assert_eq!(imports[0].price, 12.5);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_imports_never_oversell() {
    let (_mongo, service, repo) = setup("it_concurrent_imports").await;

    let id = service.create_product(widget(5, None)).await.unwrap().inserted_id;

    let service = std::sync::Arc::new(service);
    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_import(CreateImport {
                        product_id: id,
                        quantity: 1,
                        user_email: "buyer@example.com".to_string(),
                    })
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 5);
    assert_eq!(repo.get_product(id).await.unwrap().unwrap().quantity, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_export_cascade_uses_product_id() {
    let (_mongo, service, repo) = setup("it_export_cascade").await;
    let email = "seller@example.com".to_string();

    // Two products with the same name; only the exported one may change.
    let bystander = service.create_product(widget(1, None)).await.unwrap().inserted_id;
    let owned = service
        .create_product(widget(1, Some(email.clone())))
        .await
        .unwrap()
        .inserted_id;

    let exports = service.list_exports(Some(email.clone())).await.unwrap();
    assert_eq!(exports.len(), 1);
    let export_id = exports[0].id;
    assert_eq!(exports[0].product_id, owned);

    let result = service
        .update_export(
            export_id,
            UpdateProduct {
                product_name: Some("Gadget".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(result.export_result.modified_count, 1);
    assert_eq!(result.product_result.modified_count, 1);

    assert_eq!(
        repo.get_product(owned).await.unwrap().unwrap().product_name,
        "Gadget"
    );
    assert_eq!(
        repo.get_product(bystander).await.unwrap().unwrap().product_name,
        "Widget"
    );

    let ack = service.delete_export(export_id).await.unwrap();
    assert_eq!(ack.deleted_count, 1);
    assert!(repo.get_product(owned).await.unwrap().is_none());
    assert!(repo.get_product(bystander).await.unwrap().is_some());
    assert!(repo.get_export(export_id).await.unwrap().is_none());
}
