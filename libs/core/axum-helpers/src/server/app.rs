use super::shutdown::shutdown_signal;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::cors_from_origins;
use axum::Router;
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable as RedocServable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

/// Wrap `apis` with documentation UIs, JSON 404/405 fallbacks and the common
/// layers (tracing, CORS, compression).
///
/// Routes are merged at the root, so a domain router's `/products` is served
/// as `/products`. The OpenAPI document is served at
/// `/api-docs/openapi.json` with Swagger UI, ReDoc, RapiDoc and Scalar on
/// `/swagger-ui`, `/redoc`, `/rapidoc` and `/scalar`.
///
/// `cors_origins` is a comma-separated allow-list; `None` allows any origin.
///
/// ```ignore
/// let router = create_router::<ApiDoc>(api_routes, config.cors_origins.as_deref());
/// ```
pub fn create_router<T>(apis: Router, cors_origins: Option<&str>) -> Router
where
    T: OpenApi + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_from_origins(cors_origins))
        .layer(CompressionLayer::new())
}

/// Serve `router`, drain in-flight requests on SIGINT/SIGTERM, then run
/// `cleanup` bounded by `server_config.shutdown_timeout`.
///
/// ```ignore
/// let client = state.mongo_client.clone();
/// create_production_app(router, &config.server, async move {
///     database::mongodb::shutdown(client).await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    let timeout = server_config.shutdown_timeout;
    info!("Starting cleanup tasks (timeout: {:?})", timeout);
    match tokio::time::timeout(timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!("Cleanup exceeded timeout of {:?}, forcing shutdown", timeout),
    }

    serve_result
}
