//! Facet Filter & Sort
//!
//! Pure function of the working product list and the filter state. Facets
//! (free text, category, price presence) combine conjunctively; sorting is
//! stable so relevance keeps source order.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::models::{CategoryId, Product};
use shared::request::SortKey;

use crate::index::CategoryIndex;
use crate::merchandising::{MerchandisingConfig, SizeGroup};
use crate::text::{compare_labels, fold};

/// Listing filter state, mirrored in the URL query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub category: String,
    pub subcategory: String,
    pub sort: SortKey,
    pub page_size: u32,
    /// Requested page (1-based); clamped by the pagination reconciler
    pub page: u32,
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            category: String::new(),
            subcategory: String::new(),
            sort: SortKey::Relevance,
            page_size: page_size.max(1),
            page: 1,
        }
    }

    /// Whether a category or subcategory is selected
    pub fn has_category(&self) -> bool {
        !self.category.trim().is_empty() || !self.subcategory.trim().is_empty()
    }

    /// Apply one change. Anything but a page navigation resets the page to 1.
    ///
    /// Returns `true` when the state actually changed.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        let before = self.clone();
        match change {
            FilterChange::Query(query) => self.query = query,
            FilterChange::Category(category) => {
                self.category = category;
                self.subcategory.clear();
            }
            FilterChange::Subcategory {
                category,
                subcategory,
            } => {
                self.category = category;
                self.subcategory = subcategory;
            }
            FilterChange::Sort(sort) => self.sort = sort,
            FilterChange::PageSize(size) => self.page_size = size.max(1),
            FilterChange::Page(page) => self.page = page.max(1),
            FilterChange::ClearFacets => {
                self.query.clear();
                self.category.clear();
                self.subcategory.clear();
            }
        }
        if !change_is_navigation(&before, self) {
            self.page = 1;
        }
        *self != before
    }
}

fn change_is_navigation(before: &FilterState, after: &FilterState) -> bool {
    before.query == after.query
        && before.category == after.category
        && before.subcategory == after.subcategory
        && before.sort == after.sort
        && before.page_size == after.page_size
}

/// One user-driven edit of the filter state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Query(String),
    /// Select a category, clearing the subcategory
    Category(String),
    Subcategory {
        category: String,
        subcategory: String,
    },
    Sort(SortKey),
    PageSize(u32),
    /// Page navigation, the only change that keeps the page number
    Page(u32),
    /// Clear text, category and subcategory
    ClearFacets,
}

impl FilterChange {
    pub fn is_page_navigation(&self) -> bool {
        matches!(self, FilterChange::Page(_))
    }
}

/// Filtered and sorted working set
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub items: Vec<Product>,
    pub total: usize,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Facet filter bound to one catalog load
#[derive(Debug, Clone, Copy)]
pub struct FacetFilter<'a> {
    index: &'a CategoryIndex,
    merch: &'a MerchandisingConfig,
}

impl<'a> FacetFilter<'a> {
    pub fn new(index: &'a CategoryIndex, merch: &'a MerchandisingConfig) -> Self {
        Self { index, merch }
    }

    /// Apply every facet
    pub fn apply(&self, products: &[Product], state: &FilterState) -> FilterOutcome {
        self.apply_with(products, state, false)
    }

    /// Apply the facets, optionally trusting an upstream category filter
    ///
    /// With `skip_category` set the category facet is not re-checked, except
    /// for size-group selections whose products the service cannot find by
    /// category link alone. Price presence always consults the category
    /// selection.
    pub fn apply_with(
        &self,
        products: &[Product],
        state: &FilterState,
        skip_category: bool,
    ) -> FilterOutcome {
        let query = fold(&state.query);
        let matcher = CategoryMatcher::new(self.index, self.merch, state);
        let check_category = !skip_category || matcher.size_group.is_some();

        let mut items: Vec<Product> = products
            .iter()
            .filter(|p| query.is_empty() || fold(&p.name).contains(&query))
            .filter(|p| p.has_price() || (matcher.is_active() && matcher.matches(p)))
            .filter(|p| !check_category || matcher.matches(p))
            .cloned()
            .collect();

        sort_products(&mut items, state.sort);
        let total = items.len();
        FilterOutcome { items, total }
    }
}

/// Stable sort by the chosen key; relevance keeps input order
pub fn sort_products(products: &mut [Product], sort: SortKey) {
    let cmp: fn(&Product, &Product) -> Ordering = match sort {
        SortKey::Relevance => return,
        SortKey::PriceAsc => |a, b| a.price.cmp(&b.price),
        SortKey::PriceDesc => |a, b| b.price.cmp(&a.price),
        SortKey::NameAsc => |a, b| compare_labels(&a.name, &b.name),
        SortKey::NameDesc => |a, b| compare_labels(&b.name, &a.name),
    };
    products.sort_by(cmp);
}

/// Category facet resolved once per filter pass
struct CategoryMatcher<'a> {
    category: Option<Selection>,
    subcategory: Option<Selection>,
    size_group: Option<&'a SizeGroup>,
}

struct Selection {
    key: String,
    ids: HashSet<CategoryId>,
}

impl Selection {
    fn matches(&self, product: &Product) -> bool {
        if product.category_id.is_some_and(|id| self.ids.contains(&id)) {
            return true;
        }
        product.category_path.iter().any(|label| fold(label) == self.key)
    }
}

impl<'a> CategoryMatcher<'a> {
    fn new(index: &CategoryIndex, merch: &'a MerchandisingConfig, state: &FilterState) -> Self {
        let category_label = state.category.trim();
        let subcategory_label = state.subcategory.trim();

        let selection = |label: &str, id: Option<CategoryId>| -> Option<Selection> {
            if label.is_empty() {
                return None;
            }
            Some(Selection {
                key: fold(label),
                ids: id.map(|id| index.descendants(id)).unwrap_or_default(),
            })
        };

        let category = selection(category_label, index.resolve_selection(category_label, ""));
        let subcategory = selection(
            subcategory_label,
            index.resolve_selection(category_label, subcategory_label),
        );

        let innermost = if subcategory_label.is_empty() {
            category_label
        } else {
            subcategory_label
        };

        Self {
            category,
            subcategory,
            size_group: merch.size_group(innermost),
        }
    }

    fn is_active(&self) -> bool {
        self.category.is_some() || self.subcategory.is_some()
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(group) = self.size_group
            && self.size_group_matches(group, product)
        {
            return true;
        }
        let category_ok = self.category.as_ref().is_none_or(|s| s.matches(product));
        let subcategory_ok = self.subcategory.as_ref().is_none_or(|s| s.matches(product));
        category_ok && subcategory_ok
    }

    /// Size-group selections also match by label fragments and name tokens
    fn size_group_matches(&self, group: &SizeGroup, product: &Product) -> bool {
        // the enclosing category still has to hold when the group is a subcategory
        if let (Some(category), Some(_)) = (&self.category, &self.subcategory)
            && !category.matches(product)
        {
            return false;
        }
        let key = fold(&group.label);
        product.category_path.iter().any(|label| fold(label).contains(&key))
            || group.matches_name(&product.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::Category;

    fn product(id: &str, name: &str, price: i64, category_id: Option<CategoryId>, path: &[&str]) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: Decimal::from(price),
            original_price: Decimal::from(price),
            discount: None,
            image_url: String::new(),
            category_id,
            category_path: path.iter().map(|s| s.to_string()).collect(),
            attributes: Default::default(),
            attribute_stock: Default::default(),
            stock: 1,
            active: true,
        }
    }

    fn ids(outcome: &FilterOutcome) -> Vec<&str> {
        outcome.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_page_resets_on_any_change_but_navigation() {
        let mut state = FilterState::new(12);
        state.apply(FilterChange::Page(4));
        assert_eq!(state.page, 4);
        state.apply(FilterChange::Sort(SortKey::PriceAsc));
        assert_eq!(state.page, 1);
        state.apply(FilterChange::Page(3));
        state.apply(FilterChange::Query("globo".into()));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_page_kept_when_change_is_a_no_op() {
        let mut state = FilterState::new(12);
        state.apply(FilterChange::Page(2));
        let changed = state.apply(FilterChange::Sort(SortKey::Relevance));
        assert!(!changed);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_category_change_clears_subcategory() {
        let mut state = FilterState::new(12);
        state.apply(FilterChange::Subcategory {
            category: "Cotillon".into(),
            subcategory: "Velas".into(),
        });
        state.apply(FilterChange::Category("Disfraces".into()));
        assert_eq!(state.category, "Disfraces");
        assert!(state.subcategory.is_empty());
    }

    #[test]
    fn test_free_text_is_diacritic_insensitive() {
        let index = CategoryIndex::default();
        let merch = MerchandisingConfig::default();
        let products = vec![
            product("1", "Piñata gigante", 100, None, &[]),
            product("2", "Vela número", 50, None, &[]),
        ];
        let mut state = FilterState::new(12);
        state.query = "PINATA".into();
        let outcome = FacetFilter::new(&index, &merch).apply(&products, &state);
        assert_eq!(ids(&outcome), vec!["1"]);
        assert_eq!(outcome.total, 1);
    }

    #[test]
    fn test_category_filter_uses_descendants() {
        let categories = vec![
            Category::root(1, "Cotillon"),
            Category::child(2, "Velas", 1),
            Category::child(3, "Bengalas", 2),
            Category::root(4, "Disfraces"),
        ];
        let index = CategoryIndex::new(&categories);
        let merch = MerchandisingConfig::default();
        let products = vec![
            product("a", "Bengala", 10, Some(3), &["Cotillon", "Velas", "Bengalas"]),
            product("b", "Careta", 10, Some(4), &["Disfraces"]),
            product("c", "Vela", 10, Some(2), &["Cotillon", "Velas"]),
        ];
        let mut state = FilterState::new(12);
        state.category = "Cotillon".into();
        let outcome = FacetFilter::new(&index, &merch).apply(&products, &state);
        assert_eq!(ids(&outcome), vec!["a", "c"]);

        state.subcategory = "Bengalas".into();
        let outcome = FacetFilter::new(&index, &merch).apply(&products, &state);
        assert_eq!(ids(&outcome), vec!["a"]);
    }

    #[test]
    fn test_category_filter_falls_back_to_path_labels() {
        let index = CategoryIndex::default();
        let merch = MerchandisingConfig::default();
        let products = vec![
            product("a", "Gorro", 10, None, &["Cotillón", "Gorros y Sombreros"]),
            product("b", "Plato", 10, None, &["Descartables"]),
        ];
        let mut state = FilterState::new(12);
        state.category = "cotillon".into();
        let outcome = FacetFilter::new(&index, &merch).apply(&products, &state);
        assert_eq!(ids(&outcome), vec!["a"]);
    }

    #[test]
    fn test_zero_price_only_inside_matching_category() {
        let categories = vec![Category::root(1, "Disfraces"), Category::root(2, "Juguetes")];
        let index = CategoryIndex::new(&categories);
        let merch = MerchandisingConfig::default();
        let products = vec![
            product("quote", "Disfraz a pedido", 0, Some(1), &["Disfraces"]),
            product("priced", "Careta", 30, Some(1), &["Disfraces"]),
        ];
        let filter = FacetFilter::new(&index, &merch);

        let unfiltered = filter.apply(&products, &FilterState::new(12));
        assert_eq!(ids(&unfiltered), vec!["priced"]);

        let mut state = FilterState::new(12);
        state.category = "Disfraces".into();
        assert_eq!(ids(&filter.apply(&products, &state)), vec!["quote", "priced"]);

        state.category = "Juguetes".into();
        assert!(filter.apply(&products, &state).is_empty());
    }

    #[test]
    fn test_zero_price_checks_category_even_when_skipped() {
        let categories = vec![Category::root(1, "Disfraces"), Category::root(2, "Juguetes")];
        let index = CategoryIndex::new(&categories);
        let merch = MerchandisingConfig::default();
        let products = vec![product("quote", "Disfraz", 0, Some(1), &["Disfraces"])];
        let mut state = FilterState::new(12);
        state.category = "Juguetes".into();
        let outcome = FacetFilter::new(&index, &merch).apply_with(&products, &state, true);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_size_group_matches_by_name_token() {
        let categories = vec![
            Category::root(1, "Globos y Piñatas"),
            Category::child(2, "9 Pulgadas", 1),
            Category::child(3, "Set de Globos", 1),
        ];
        let index = CategoryIndex::new(&categories);
        let merch = MerchandisingConfig::default();
        let products = vec![
            product("tagged", "Globo liso", 10, Some(2), &["Globos y Piñatas", "9 Pulgadas"]),
            product("untagged", "Globo 9\" perlado", 10, Some(3), &["Globos y Piñatas", "Set de Globos"]),
            product("other", "Globo 12\" perlado", 10, Some(3), &["Globos y Piñatas", "Set de Globos"]),
        ];
        let mut state = FilterState::new(12);
        state.category = "Globos y Piñatas".into();
        state.subcategory = "9 Pulgadas".into();

        let filter = FacetFilter::new(&index, &merch);
        assert_eq!(ids(&filter.apply(&products, &state)), vec!["tagged", "untagged"]);
        // size groups are re-checked even when the service filtered by category
        assert_eq!(
            ids(&filter.apply_with(&products, &state, true)),
            vec!["tagged", "untagged"]
        );
    }

    #[test]
    fn test_skip_category_trusts_upstream() {
        let index = CategoryIndex::new(&[Category::root(1, "Cotillon"), Category::root(2, "Juguetes")]);
        let merch = MerchandisingConfig::default();
        let products = vec![product("a", "Pelota", 10, Some(2), &["Juguetes"])];
        let mut state = FilterState::new(12);
        state.category = "Cotillon".into();
        let filter = FacetFilter::new(&index, &merch);
        assert!(filter.apply(&products, &state).is_empty());
        assert_eq!(ids(&filter.apply_with(&products, &state, true)), vec!["a"]);
    }

    #[test]
    fn test_sorting() {
        let mut products = vec![
            product("x", "Bengala", 100, None, &[]),
            product("y", "antifaz", 10, None, &[]),
            product("z", "Árbol", 50, None, &[]),
        ];
        let prices = |ps: &[Product]| ps.iter().map(|p| p.price).collect::<Vec<_>>();

        sort_products(&mut products, SortKey::Relevance);
        assert_eq!(prices(&products), vec![Decimal::from(100), Decimal::from(10), Decimal::from(50)]);

        sort_products(&mut products, SortKey::PriceAsc);
        assert_eq!(prices(&products), vec![Decimal::from(10), Decimal::from(50), Decimal::from(100)]);

        sort_products(&mut products, SortKey::PriceDesc);
        assert_eq!(prices(&products), vec![Decimal::from(100), Decimal::from(50), Decimal::from(10)]);

        sort_products(&mut products, SortKey::NameAsc);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["antifaz", "Árbol", "Bengala"]);

        sort_products(&mut products, SortKey::NameDesc);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bengala", "Árbol", "antifaz"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_prices() {
        let mut products = vec![
            product("first", "B", 10, None, &[]),
            product("second", "A", 10, None, &[]),
        ];
        sort_products(&mut products, SortKey::PriceAsc);
        assert_eq!(products[0].id, "first");
    }
}
