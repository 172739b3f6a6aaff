//! HTTP handlers for the catalog API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InsufficientStockResponse,
        InternalServerErrorResponse, MissingParameterResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    CreateImport, CreateProduct, DeleteAck, EmailQuery, ExportRecord, ExportUpdateResult,
    ImportReceipt, ImportRecord, InsertAck, Product, UpdateAck, UpdateProduct,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        latest_products,
        list_exports,
        update_export,
        delete_export,
        list_imports,
        create_import,
        delete_import,
    ),
    components(
        schemas(
            Product, ExportRecord, ImportRecord,
            CreateProduct, UpdateProduct, CreateImport,
            InsertAck, UpdateAck, DeleteAck, ExportUpdateResult, ImportReceipt
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            MissingParameterResponse,
            InsufficientStockResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog"),
        (name = "Exports", description = "Products listed by a user"),
        (name = "Imports", description = "Stock taken from products by a user")
    )
)]
pub struct ApiDoc;

/// Catalog routes, registered at their public paths.
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/latestProduct", get(latest_products))
        .route("/exports", get(list_exports))
        .route("/exports/{id}", put(update_export).delete(delete_export))
        .route("/import", get(list_imports).post(create_import))
        .route("/import/{id}", delete(delete_import))
        .with_state(shared_service)
}

/// List every product
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Create a product (and an export when `userEmail` is given)
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = InsertAck),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let ack = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update the provided fields of a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = UpdateAck),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(changes): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<UpdateAck>> {
    let ack = service.update_product(id, changes).await?;
    Ok(Json(ack))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeleteAck),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<DeleteAck>> {
    let ack = service.delete_product(id).await?;
    Ok(Json(ack))
}

/// The six most recently created products
#[utoipa::path(
    get,
    path = "/latestProduct",
    tag = "Products",
    responses(
        (status = 200, description = "Newest products first", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn latest_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.latest_products().await?;
    Ok(Json(products))
}

/// Exports owned by a user
#[utoipa::path(
    get,
    path = "/exports",
    tag = "Exports",
    params(EmailQuery),
    responses(
        (status = 200, description = "The user's exports", body = Vec<ExportRecord>),
        (status = 400, response = MissingParameterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_exports<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<EmailQuery>,
) -> CatalogResult<Json<Vec<ExportRecord>>> {
    let exports = service.list_exports(query.email).await?;
    Ok(Json(exports))
}

/// Edit an export and the product it references
#[utoipa::path(
    put,
    path = "/exports/{id}",
    tag = "Exports",
    params(
        ("id" = Uuid, Path, description = "Export ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Export and product updated", body = ExportUpdateResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_export<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(changes): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<ExportUpdateResult>> {
    let result = service.update_export(id, changes).await?;
    Ok(Json(result))
}

/// Delete an export and the product it references
#[utoipa::path(
    delete,
    path = "/exports/{id}",
    tag = "Exports",
    params(
        ("id" = Uuid, Path, description = "Export ID")
    ),
    responses(
        (status = 200, description = "Product deletion result", body = DeleteAck),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_export<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<DeleteAck>> {
    let ack = service.delete_export(id).await?;
    Ok(Json(ack))
}

/// Imports made by a user
#[utoipa::path(
    get,
    path = "/import",
    tag = "Imports",
    params(EmailQuery),
    responses(
        (status = 200, description = "The user's imports", body = Vec<ImportRecord>),
        (status = 400, response = MissingParameterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_imports<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<EmailQuery>,
) -> CatalogResult<Json<Vec<ImportRecord>>> {
    let imports = service.list_imports(query.email).await?;
    Ok(Json(imports))
}

/// Take stock from a product and record the import
#[utoipa::path(
    post,
    path = "/import",
    tag = "Imports",
    request_body = CreateImport,
    responses(
        (status = 201, description = "Import recorded", body = ImportReceipt),
        (status = 400, response = InsufficientStockResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_import<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateImport>,
) -> CatalogResult<impl IntoResponse> {
    let receipt = service.create_import(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Delete an import record (stock is not restored)
#[utoipa::path(
    delete,
    path = "/import/{id}",
    tag = "Imports",
    params(
        ("id" = Uuid, Path, description = "Import ID")
    ),
    responses(
        (status = 200, description = "Import deletion result", body = DeleteAck),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_import<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<DeleteAck>> {
    let ack = service.delete_import(id).await?;
    Ok(Json(ack))
}
