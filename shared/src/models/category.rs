//! Category Model

use serde::{Deserialize, Serialize};

/// Category identifier as issued by the catalog service
pub type CategoryId = i64;

/// Category entity
///
/// Flat parent-referencing record. The full list forms a forest; a
/// `parent_id` pointing at an unknown id is tolerated and the node is
/// treated as a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "crate::serde_helpers::flexible_id")]
    pub id: CategoryId,
    pub label: String,
    #[serde(default, deserialize_with = "crate::serde_helpers::option_flexible_id")]
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn root(id: CategoryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id: None,
        }
    }

    pub fn child(id: CategoryId, label: impl Into<String>, parent_id: CategoryId) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id: Some(parent_id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
