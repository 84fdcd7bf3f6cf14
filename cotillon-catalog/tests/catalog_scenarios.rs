// cotillon-catalog/tests/catalog_scenarios.rs
// End-to-end listing behaviour over raw payloads

use cotillon_catalog::normalize::{NormalizeContext, normalize_categories, normalize_products};
use cotillon_catalog::pagination::page_slice;
use cotillon_catalog::tree::walk;
use cotillon_catalog::{
    CategoryIndex, FacetFilter, FilterChange, FilterState, MerchandisingConfig, PaginationReconciler,
    build_forest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared::request::SortKey;

fn ids(items: &[shared::Product]) -> Vec<&str> {
    items.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn test_parent_selection_reaches_grandchild_product() {
    let categories = normalize_categories(&[
        json!({"id": 1, "label": "Globos", "parent": null}),
        json!({"id": 2, "label": "9 Pulgadas", "parent": 1}),
    ]);
    let index = CategoryIndex::new(&categories);
    let ctx = NormalizeContext {
        index: &index,
        offers: &[],
        api_base: "",
        now_millis: 0,
    };
    let products = normalize_products(
        &[json!({"id": "a", "name": "Globo 9 pulgadas rojo", "categoryId": 2, "price": 50})],
        &ctx,
    );
    let merch = MerchandisingConfig::default();
    let filter = FacetFilter::new(&index, &merch);

    let mut state = FilterState::new(12);
    state.apply(FilterChange::Category("Globos".into()));
    let outcome = filter.apply(&products, &state);
    assert_eq!(ids(&outcome.items), vec!["a"]);
}

#[test]
fn test_forest_keeps_every_node_once_with_dangling_parents() {
    let categories = normalize_categories(&[
        json!({"id": 1, "nombre": "Globos y Piñatas"}),
        json!({"id": 2, "nombre": "Piñatas", "parent": 1}),
        json!({"id": 3, "nombre": "Número Metalizados", "parent": 1}),
        json!({"id": 4, "nombre": "Huérfana", "parent": 99}),
        json!({"id": 5, "nombre": "Cotillon"}),
    ]);
    let forest = build_forest(&categories, &MerchandisingConfig::default());

    let mut seen: Vec<i64> = walk(&forest).filter_map(|n| n.id).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);

    let roots: Vec<&str> = forest.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(roots, vec!["Cotillon", "Globos y Piñatas", "Huérfana"]);
    let children: Vec<&str> = forest[1].children.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(children, vec!["Número Metalizados", "Piñatas"]);
}

#[test]
fn test_quote_only_products_and_price_sort() {
    let categories = normalize_categories(&[json!({"id": 7, "nombre": "Piñatas"})]);
    let index = CategoryIndex::new(&categories);
    let ctx = NormalizeContext {
        index: &index,
        offers: &[],
        api_base: "",
        now_millis: 0,
    };
    let products = normalize_products(
        &[
            json!({"id": "p100", "nombre": "Piñata grande", "precio": 100, "categoria": 7}),
            json!({"id": "p10", "nombre": "Piñata mini", "precio": 10, "categoria": 7}),
            json!({"id": "p0", "nombre": "Piñata a pedido", "precio": 0, "categoria": 7}),
            json!({"id": "p50", "nombre": "Piñata mediana", "precio": "50", "categoria": 7}),
        ],
        &ctx,
    );
    let merch = MerchandisingConfig::default();
    let filter = FacetFilter::new(&index, &merch);

    let mut state = FilterState::new(12);
    state.apply(FilterChange::Query("pinata".into()));
    assert_eq!(ids(&filter.apply(&products, &state).items), vec!["p100", "p10", "p50"]);

    state.apply(FilterChange::Sort(SortKey::PriceAsc));
    assert_eq!(ids(&filter.apply(&products, &state).items), vec!["p10", "p50", "p100"]);

    state.apply(FilterChange::Category("Piñatas".into()));
    state.apply(FilterChange::Sort(SortKey::Relevance));
    assert_eq!(
        ids(&filter.apply(&products, &state).items),
        vec!["p100", "p10", "p0", "p50"]
    );
}

#[test]
fn test_shrinking_result_set_clamps_displayed_page() {
    let mut state = FilterState::new(12);
    let mut pagination = PaginationReconciler::new(12);

    pagination.begin(1, 12, false);
    pagination.on_remote_success(100, None);
    state.apply(FilterChange::Page(pagination.go_to(9)));
    assert_eq!(pagination.displayed_page(), 9);

    // a narrower query leaves a single page; the stale page 9 must not survive
    pagination.begin(state.page, state.page_size, true);
    let displayed = pagination.on_remote_success(5, None);
    assert_eq!(displayed, 1);
    assert_eq!(pagination.displayed_page(), 1);
    assert_eq!(pagination.total_pages(), 1);

    let items: Vec<u32> = (1..=5).collect();
    assert_eq!(page_slice(&items, displayed, 12).to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(pagination.visible_range(5), Some((1, 5)));
}
