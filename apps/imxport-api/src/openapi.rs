//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ImXport API",
        version = "0.1.0",
        description = "Product import/export catalog backed by MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    )
)]
struct ServiceInfo;

/// Service metadata plus every catalog path and schema
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        ServiceInfo::openapi().merge_from(domain_catalog::ApiDoc::openapi())
    }
}
