//! HTTP layers shared by the services.

pub mod cors;

pub use cors::{cors_from_origins, create_cors_layer, create_permissive_cors_layer};
