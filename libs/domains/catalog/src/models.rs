use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Number of products returned by the latest-products listing
pub const LATEST_PRODUCTS_LIMIT: i64 = 6;

/// Product entity stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id", with = "uuid_string")]
    pub id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub origin: String,
    /// 0 to 5
    #[serde(default)]
    pub rating: f64,
    /// Units in stock
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner; set when the product was created through an export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            product_name: input.product_name,
            image_url: input.image_url,
            price: input.price,
            origin: input.origin,
            rating: input.rating,
            quantity: input.quantity,
            category: input.category,
            description: input.description,
            user_email: input.user_email,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user's listing of a product, stored in the `exports` collection.
///
/// Mirrors the product's fields and points back at it through `productId`;
/// edits and deletes cascade to that product only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    #[serde(rename = "_id", alias = "id", with = "uuid_string")]
    pub id: Uuid,
    #[serde(with = "uuid_string")]
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_email: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ExportRecord {
    pub fn from_product(product: &Product, user_email: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_id: product.id,
            product_name: product.product_name.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            origin: product.origin.clone(),
            rating: product.rating,
            quantity: product.quantity,
            category: product.category.clone(),
            description: product.description.clone(),
            user_email,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Snapshot of a product taken when a user imports part of its stock.
///
/// Stored in the `importProducts` collection. Later edits to the product do
/// not touch existing snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    #[serde(rename = "_id", alias = "id", with = "uuid_string")]
    pub id: Uuid,
    #[serde(with = "uuid_string")]
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub origin: String,
    pub imported_quantity: i64,
    pub user_email: String,
    #[serde(with = "timestamp")]
    pub import_date: DateTime<Utc>,
}

impl ImportRecord {
    pub fn snapshot(product: &Product, imported_quantity: i64, user_email: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_id: product.id,
            product_name: product.product_name.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            rating: product.rating,
            origin: product.origin.clone(),
            imported_quantity,
            user_email,
            import_date: timestamp::now(),
        }
    }
}

/// DTO for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image_url: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub origin: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// When present an export record is created for this user
    #[serde(default)]
    #[validate(email)]
    pub user_email: Option<String>,
}

/// Partial update applied to a product, or to an export and its product.
///
/// Only fields that are present are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub product_name: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(max = 100))]
    pub origin: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// DTO for importing stock from a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateImport {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(email)]
    pub user_email: String,
}

/// `?email=` filter for the per-user listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Owner email (required)
    pub email: Option<String>,
}

/// Result of a single-document insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

/// Result of a single-document update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a single-document delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Outcome of editing an export: the export itself and its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportUpdateResult {
    pub export_result: UpdateAck,
    pub product_result: UpdateAck,
}

/// Success envelope returned by a completed import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReceipt {
    pub success: bool,
    pub message: String,
    pub data: InsertAck,
    /// Product stock after the decrement
    pub remaining_quantity: i64,
}

impl ImportReceipt {
    pub const MESSAGE: &'static str = "Product imported successfully";

    pub fn new(data: InsertAck, remaining_quantity: i64) -> Self {
        Self {
            success: true,
            message: Self::MESSAGE.to_string(),
            data,
            remaining_quantity,
        }
    }
}

/// Ids are stored as hyphenated strings so that every bson serializer, and
/// every query filter, sees the same representation.
pub(crate) mod uuid_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(D::Error::custom)
    }
}

/// Fixed-width RFC 3339 timestamps (millisecond precision, `Z` suffix), so
/// stored values sort chronologically as strings.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}
