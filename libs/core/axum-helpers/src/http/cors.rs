use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS restricted to the listed origins.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Any origin, any method, any header.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Pick the CORS policy from an optional comma-separated origin list.
///
/// Unset or blank values fall back to the permissive layer, as does a list
/// containing a value that is not a valid header.
pub fn cors_from_origins(origins: Option<&str>) -> CorsLayer {
    let Some(raw) = origins.map(str::trim).filter(|o| !o.is_empty()) else {
        return create_permissive_cors_layer();
    };

    let parsed: Result<Vec<HeaderValue>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(HeaderValue::from_str)
        .collect();

    match parsed {
        Ok(values) if !values.is_empty() => {
            tracing::info!("CORS configured with allowed origins: {}", raw);
            create_cors_layer(values)
        }
        Ok(_) => create_permissive_cors_layer(),
        Err(e) => {
            tracing::warn!(origins = raw, error = %e, "Invalid CORS_ALLOWED_ORIGIN, allowing any origin");
            create_permissive_cors_layer()
        }
    }
}
