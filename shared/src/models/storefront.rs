//! Storefront (destination catalog) payloads
//!
//! Shapes follow the storefront's v3 REST API. Create rows are correlated
//! back to source ids through an echoed field: `slug` for categories,
//! `sku` for products. The batch endpoints do not guarantee response order.

use serde::{Deserialize, Serialize};

/// Image reference attached to a category or product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Category create/update payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Carries the source category id; echoed back in create responses
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<StoreImage>,
}

/// Reference to an existing storefront category by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCategoryRef {
    pub id: i64,
}

/// Product dimensions, kept as strings as the storefront expects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl StoreDimensions {
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Product create/update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProduct {
    #[serde(rename = "type")]
    pub product_type: String,
    /// Set for updates only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Carries the source item id; echoed back in create responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<StoreDimensions>,
    #[serde(default)]
    pub categories: Vec<StoreCategoryRef>,
    #[serde(default)]
    pub images: Vec<StoreImage>,
}

impl Default for StoreProduct {
    fn default() -> Self {
        Self {
            product_type: "simple".to_string(),
            id: None,
            slug: None,
            sku: None,
            name: None,
            regular_price: None,
            stock_quantity: None,
            description: None,
            dimensions: None,
            categories: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// Body of a `.../batch` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest<T> {
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<T>,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<i64>,
}

impl<T> Default for BatchRequest<T> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }
}

impl<T> BatchRequest<T> {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Per-item error reported inside a successful batch response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRowError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One row of a batch response
///
/// Error rows usually carry `id: 0` and none of the echoed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchRowError>,
}

impl BatchRow {
    /// Destination id of a successfully processed row
    pub fn created_id(&self) -> Option<i64> {
        if self.error.is_some() {
            return None;
        }
        self.id.filter(|id| *id > 0)
    }
}

/// Response of a `.../batch` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub create: Vec<BatchRow>,
    #[serde(default)]
    pub update: Vec<BatchRow>,
    #[serde(default)]
    pub delete: Vec<BatchRow>,
}
