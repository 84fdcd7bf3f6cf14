//! Category Tree Builder
//!
//! Turns the flat category list into an ordered forest. Orphans (dangling
//! parent reference) and members of parent cycles are promoted to roots, so
//! every record appears exactly once.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use shared::models::{Category, CategoryId, Product};
use tracing::{debug, warn};

use crate::merchandising::{MerchandisingConfig, Ranking};
use crate::text::{compare_labels, fold, slugify};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTreeNode {
    /// Source record id; `None` for nodes derived from product data
    pub id: Option<CategoryId>,
    pub label: String,
    pub slug: String,
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    pub fn new(id: Option<CategoryId>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id,
            slug: slugify(&label),
            label,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order walk over this node and everything below it
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter { stack: vec![self] }
    }

    /// Slugs of the leaves under this node (the node itself when it is a leaf)
    pub fn leaf_slugs(&self) -> Vec<&str> {
        self.iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.slug.as_str())
            .collect()
    }
}

pub struct TreeIter<'a> {
    stack: Vec<&'a CategoryTreeNode>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a CategoryTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Pre-order walk over a whole forest
pub fn walk(forest: &[CategoryTreeNode]) -> impl Iterator<Item = &CategoryTreeNode> {
    forest.iter().flat_map(CategoryTreeNode::iter)
}

/// First node (pre-order) carrying `slug`
pub fn find_by_slug<'a>(forest: &'a [CategoryTreeNode], slug: &str) -> Option<&'a CategoryTreeNode> {
    walk(forest).find(|n| n.slug == slug)
}

/// Build the ordered category forest
pub fn build_forest(categories: &[Category], merch: &MerchandisingConfig) -> Vec<CategoryTreeNode> {
    // Pass 1: id -> record
    let mut by_id: HashMap<CategoryId, &Category> = HashMap::with_capacity(categories.len());
    let mut order: Vec<CategoryId> = Vec::with_capacity(categories.len());
    for category in categories {
        if let Entry::Vacant(slot) = by_id.entry(category.id) {
            slot.insert(category);
            order.push(category.id);
        }
    }

    // Pass 2: attach to parent or promote to root
    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    let mut roots: Vec<CategoryId> = Vec::new();
    for id in &order {
        match by_id[id].parent_id {
            Some(parent) if parent != *id && by_id.contains_key(&parent) => {
                children.entry(parent).or_default().push(*id);
            }
            Some(parent) => {
                debug!(id, parent, "Category parent missing, promoted to root");
                roots.push(*id);
            }
            None => roots.push(*id),
        }
    }

    // Nodes caught in a parent cycle are unreachable from any root
    let mut reached = reachable(&roots, &children);
    for id in &order {
        if reached.contains(id) {
            continue;
        }
        warn!(id, "Category parent cycle broken, promoted to root");
        if let Some(parent) = by_id[id].parent_id
            && let Some(siblings) = children.get_mut(&parent)
        {
            siblings.retain(|c| c != id);
        }
        roots.push(*id);
        reached.extend(reachable(&[*id], &children));
    }

    // Post-order assembly with an explicit stack
    let mut built: HashMap<CategoryId, CategoryTreeNode> = HashMap::with_capacity(order.len());
    let mut stack: Vec<(CategoryId, bool)> = roots.iter().rev().map(|id| (*id, false)).collect();
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            let mut node = CategoryTreeNode::new(Some(id), by_id[&id].label.clone());
            node.children = children
                .get(&id)
                .into_iter()
                .flatten()
                .filter_map(|child| built.remove(child))
                .collect();
            sort_children(&mut node, merch);
            built.insert(id, node);
        } else {
            stack.push((id, true));
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().map(|k| (*k, false)));
            }
        }
    }

    let mut forest: Vec<CategoryTreeNode> = roots.iter().filter_map(|id| built.remove(id)).collect();
    sort_roots(&mut forest, merch);
    forest
}

/// Two-level forest derived from product paths, for when no category list loaded
///
/// Products without a path land under "Sin categoría"; products without a
/// second level under "General".
pub fn forest_from_products(products: &[Product], merch: &MerchandisingConfig) -> Vec<CategoryTreeNode> {
    let mut forest: Vec<CategoryTreeNode> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for product in products {
        let top = product
            .category_path
            .first()
            .cloned()
            .unwrap_or_else(|| "Sin categoría".to_string());
        let sub = product
            .category_path
            .get(1)
            .cloned()
            .unwrap_or_else(|| "General".to_string());

        let root_pos = match forest.iter().position(|n| fold(&n.label) == fold(&top)) {
            Some(pos) => pos,
            None => {
                forest.push(CategoryTreeNode::new(None, top.clone()));
                forest.len() - 1
            }
        };
        if seen.insert((fold(&top), fold(&sub))) {
            forest[root_pos].children.push(CategoryTreeNode::new(None, sub));
        }
    }

    for root in &mut forest {
        root.children.sort_by(|a, b| compare_labels(&a.label, &b.label));
    }
    sort_roots(&mut forest, merch);
    forest
}

fn reachable(roots: &[CategoryId], children: &HashMap<CategoryId, Vec<CategoryId>>) -> HashSet<CategoryId> {
    let mut out = HashSet::new();
    let mut stack: Vec<CategoryId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        if out.insert(id)
            && let Some(kids) = children.get(&id)
        {
            stack.extend(kids.iter().copied());
        }
    }
    out
}

fn sort_children(node: &mut CategoryTreeNode, merch: &MerchandisingConfig) {
    match merch.child_ranking(&node.slug) {
        Some(ranking) => sort_ranked(&mut node.children, &ranking),
        None => node
            .children
            .sort_by(|a, b| compare_labels(&a.label, &b.label)),
    }
}

fn sort_roots(forest: &mut [CategoryTreeNode], merch: &MerchandisingConfig) {
    sort_ranked(forest, &merch.root_ranking());
}

fn sort_ranked(nodes: &mut [CategoryTreeNode], ranking: &Ranking) {
    nodes.sort_by(|a, b| ranking.compare(&a.slug, &a.label, &b.slug, &b.label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(nodes: &[CategoryTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(build_forest(&[], &MerchandisingConfig::default()).is_empty());
    }

    #[test]
    fn test_roots_follow_top_level_order_then_alphabetical() {
        let categories = vec![
            Category::root(1, "Zapatillas"),
            Category::root(2, "Disfraces"),
            Category::root(3, "Accesorios Varios"),
            Category::root(4, "Cotillon"),
        ];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        assert_eq!(
            labels(&forest),
            vec!["Cotillon", "Disfraces", "Accesorios Varios", "Zapatillas"]
        );
    }

    #[test]
    fn test_children_use_manual_order_when_configured() {
        let categories = vec![
            Category::root(1, "Globos y Piñatas"),
            Category::child(2, "Accesorios", 1),
            Category::child(3, "12 Pulgadas", 1),
            Category::child(4, "9 Pulgadas", 1),
            Category::child(5, "Aaa Sin Rango", 1),
            Category::child(6, "Liso", 4),
            Category::child(7, "Perlado", 4),
            Category::child(8, "Cromado", 4),
        ];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        let globos = &forest[0];
        assert_eq!(
            labels(&globos.children),
            vec!["9 Pulgadas", "12 Pulgadas", "Accesorios", "Aaa Sin Rango"]
        );
        assert_eq!(
            labels(&globos.children[0].children),
            vec!["Perlado", "Liso", "Cromado"]
        );
    }

    #[test]
    fn test_children_default_to_alphabetical() {
        let categories = vec![
            Category::root(1, "Juguetes"),
            Category::child(2, "Pelotas", 1),
            Category::child(3, "Autitos", 1),
            Category::child(4, "Muñecas", 1),
        ];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        assert_eq!(labels(&forest[0].children), vec!["Autitos", "Muñecas", "Pelotas"]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let categories = vec![Category::root(1, "Cotillon"), Category::child(2, "Huerfana", 99)];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        assert_eq!(labels(&forest), vec!["Cotillon", "Huerfana"]);
    }

    #[test]
    fn test_cycle_members_are_kept_once() {
        let categories = vec![
            Category::root(1, "Raiz"),
            Category::child(2, "A", 3),
            Category::child(3, "B", 2),
            Category::child(4, "C", 3),
        ];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        let mut ids: Vec<_> = walk(&forest).filter_map(|n| n.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_self_parent_is_root() {
        let categories = vec![Category::child(1, "Solo", 1)];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        assert_eq!(forest.len(), 1);
        assert!(forest[0].is_leaf());
    }

    #[test]
    fn test_find_by_slug_and_leaf_slugs() {
        let categories = vec![
            Category::root(1, "Cotillon"),
            Category::child(2, "Velas", 1),
            Category::child(3, "Bengalas", 2),
            Category::child(4, "Antifaces", 1),
        ];
        let forest = build_forest(&categories, &MerchandisingConfig::default());
        let cotillon = find_by_slug(&forest, "cotillon").unwrap();
        assert_eq!(cotillon.leaf_slugs(), vec!["bengalas", "antifaces"]);
        assert_eq!(find_by_slug(&forest, "bengalas").and_then(|n| n.id), Some(3));
        assert!(find_by_slug(&forest, "nada").is_none());
    }

    #[test]
    fn test_forest_from_products() {
        let product = |path: &[&str]| Product {
            id: "x".into(),
            name: "x".into(),
            price: Default::default(),
            original_price: Default::default(),
            discount: None,
            image_url: String::new(),
            category_id: None,
            category_path: path.iter().map(|s| s.to_string()).collect(),
            attributes: Default::default(),
            attribute_stock: Default::default(),
            stock: 0,
            active: true,
        };
        let products = vec![
            product(&["Juguetes", "Pelotas"]),
            product(&["Cotillon", "Velas"]),
            product(&["Juguetes", "Autitos"]),
            product(&["Juguetes", "Pelotas"]),
            product(&[]),
        ];
        let forest = forest_from_products(&products, &MerchandisingConfig::default());
        assert_eq!(labels(&forest), vec!["Cotillon", "Juguetes", "Sin categoría"]);
        assert_eq!(labels(&forest[1].children), vec!["Autitos", "Pelotas"]);
        assert_eq!(labels(&forest[2].children), vec!["General"]);
    }
}
