//! Source → destination id mappings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog entity a mapping belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Product,
}

impl EntityKind {
    /// Logical table holding mappings of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Category => "category-id-map",
            EntityKind::Product => "item-id-map",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "category"),
            EntityKind::Product => write!(f, "product"),
        }
    }
}

/// One persisted correspondence between a source id and a destination id
///
/// Only ever built from a successful destination create response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    pub kind: EntityKind,
    pub source_id: String,
    pub destination_id: i64,
}

impl IdMapping {
    pub fn new(kind: EntityKind, source_id: impl Into<String>, destination_id: i64) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            destination_id,
        }
    }
}
