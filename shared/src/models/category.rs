//! Category Model

use serde::{Deserialize, Serialize};

use crate::serde_helpers;

/// Parent id value meaning "no parent"
pub const ROOT_SENTINEL: &str = "-1";

/// Category as delivered by the inventory category list
///
/// Snapshot fetched once per run. The full list forms a forest; parent
/// links are not validated, so dangling parents and cycles can occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCategory {
    #[serde(rename = "category_id", deserialize_with = "serde_helpers::string_or_number")]
    pub id: String,
    #[serde(default = "root_sentinel", deserialize_with = "serde_helpers::parent_id")]
    pub parent_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "img", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

fn root_sentinel() -> String {
    ROOT_SENTINEL.to_string()
}

impl SourceCategory {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            title: title.into(),
            image_ref: None,
        }
    }

    /// Whether this category sits at the top of its tree
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_SENTINEL
    }
}
