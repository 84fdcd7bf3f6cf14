//! Request types spoken with the catalog service

use serde::{Deserialize, Serialize};

use crate::models::CategoryId;

/// Listing sort order
///
/// Serialized with the short keys the storefront URLs and the catalog
/// service already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Keep source order
    #[default]
    #[serde(rename = "relevancia")]
    Relevance,
    #[serde(rename = "precio_asc")]
    PriceAsc,
    #[serde(rename = "precio_desc")]
    PriceDesc,
    #[serde(rename = "nombre_asc")]
    NameAsc,
    #[serde(rename = "nombre_desc")]
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Relevance,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevancia",
            SortKey::PriceAsc => "precio_asc",
            SortKey::PriceDesc => "precio_desc",
            SortKey::NameAsc => "nombre_asc",
            SortKey::NameDesc => "nombre_desc",
        }
    }

    /// Parse a wire key; unknown keys yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }

    /// Human-readable label shown in the sort dropdown
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Relevance => "Relevancia",
            SortKey::PriceAsc => "Precio: menor a mayor",
            SortKey::PriceDesc => "Precio: mayor a menor",
            SortKey::NameAsc => "Nombre: A-Z",
            SortKey::NameDesc => "Nombre: Z-A",
        }
    }
}

/// Product list query sent to the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListRequest {
    /// Free-text query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    pub sort: SortKey,
    /// Resolved category id, preferred when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Category slug, only sent when no id could be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductListRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            q: None,
            page,
            limit,
            sort: SortKey::Relevance,
            category_id: None,
            category: None,
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        let trimmed = q.trim();
        self.q = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Filter by category id; clears any slug filter
    pub fn with_category_id(mut self, id: CategoryId) -> Self {
        self.category_id = Some(id);
        self.category = None;
        self
    }

    /// Filter by category slug; ignored when an id is already set
    pub fn with_category_slug(mut self, slug: impl Into<String>) -> Self {
        if self.category_id.is_none() {
            self.category = Some(slug.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_round_trip_through_wire_key() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("popular"), None);
    }

    #[test]
    fn test_sort_key_serializes_as_wire_key() {
        let json = serde_json::to_string(&SortKey::PriceDesc).unwrap();
        assert_eq!(json, "\"precio_desc\"");
    }

    #[test]
    fn test_blank_query_is_dropped() {
        let req = ProductListRequest::new(1, 12).with_query("   ");
        assert_eq!(req.q, None);
        let req = ProductListRequest::new(1, 12).with_query("  globo ");
        assert_eq!(req.q.as_deref(), Some("globo"));
    }

    #[test]
    fn test_category_id_wins_over_slug() {
        let req = ProductListRequest::new(1, 12)
            .with_category_id(4)
            .with_category_slug("globos");
        assert_eq!(req.category_id, Some(4));
        assert_eq!(req.category, None);
    }
}
