use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Export not found: {0}")]
    ExportNotFound(Uuid),

    #[error("Email is required")]
    MissingEmail,

    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Database error: {0}")]
    Database(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(_) => AppError::NotFound("Product not found".to_string()),
            CatalogError::ExportNotFound(_) => AppError::NotFound("Export not found".to_string()),
            CatalogError::MissingEmail => AppError::MissingParameter("Email is required".to_string()),
            CatalogError::InsufficientStock { available, requested } => {
                tracing::debug!(available, requested, "Import rejected");
                AppError::InsufficientStock("Not enough stock available".to_string())
            }
            CatalogError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CatalogError::ProductNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (CatalogError::ExportNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (CatalogError::MissingEmail, StatusCode::BAD_REQUEST),
            (
                CatalogError::InsufficientStock {
                    available: 6,
                    requested: 10,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::Database("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages_match_public_contract() {
        match AppError::from(CatalogError::MissingEmail) {
            AppError::MissingParameter(msg) => assert_eq!(msg, "Email is required"),
            other => panic!("unexpected {other:?}"),
        }
        match AppError::from(CatalogError::ProductNotFound(Uuid::nil())) {
            AppError::NotFound(msg) => assert_eq!(msg, "Product not found"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
