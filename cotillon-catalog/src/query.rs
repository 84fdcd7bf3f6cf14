//! Filter URL state
//!
//! The query string is the only persisted form of the filter state:
//! `search`, `sort`, `cat`, `subcat`, `per`, `page`. Defaults are omitted
//! when writing and anything unreadable falls back to a default on reading.

use shared::request::SortKey;
use url::form_urlencoded;

use crate::config::CatalogConfig;
use crate::filter::FilterState;

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_CATEGORY: &str = "cat";
pub const PARAM_SUBCATEGORY: &str = "subcat";
pub const PARAM_PAGE_SIZE: &str = "per";
pub const PARAM_PAGE: &str = "page";

impl FilterState {
    /// Serialize into a query string (without the leading `?`)
    pub fn to_query(&self, config: &CatalogConfig) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        let search = self.query.trim();
        if !search.is_empty() {
            out.append_pair(PARAM_SEARCH, search);
        }
        if self.sort != SortKey::Relevance {
            out.append_pair(PARAM_SORT, self.sort.as_str());
        }
        if !self.category.trim().is_empty() {
            out.append_pair(PARAM_CATEGORY, self.category.trim());
        }
        if !self.subcategory.trim().is_empty() {
            out.append_pair(PARAM_SUBCATEGORY, self.subcategory.trim());
        }
        if self.page_size != config.default_page_size {
            out.append_pair(PARAM_PAGE_SIZE, &self.page_size.to_string());
        }
        if self.page != 1 {
            out.append_pair(PARAM_PAGE, &self.page.to_string());
        }
        out.finish()
    }

    /// Parse a query string (leading `?` allowed), leniently
    pub fn from_query(query: &str, config: &CatalogConfig) -> Self {
        let mut state = FilterState::new(config.default_page_size);
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                PARAM_SEARCH => state.query = value.trim().to_string(),
                PARAM_SORT => state.sort = SortKey::parse(value.trim()).unwrap_or_default(),
                PARAM_CATEGORY => state.category = value.trim().to_string(),
                PARAM_SUBCATEGORY => state.subcategory = value.trim().to_string(),
                PARAM_PAGE_SIZE => {
                    state.page_size = value
                        .trim()
                        .parse()
                        .map(|size| config.page_size_or_default(size))
                        .unwrap_or(config.default_page_size);
                }
                PARAM_PAGE => {
                    state.page = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p > 0)
                        .unwrap_or(1);
                }
                _ => {}
            }
        }
        state
    }
}
