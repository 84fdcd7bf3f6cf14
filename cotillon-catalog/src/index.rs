//! Category Index
//!
//! Lookup structure built once per catalog load from the flat category list:
//! id -> record, parent -> children adjacency, memoized ancestor paths and a
//! folded-label index used to resolve the filter selection to an id.

use std::collections::{HashMap, HashSet};

use shared::models::{Category, CategoryId};
use tracing::warn;

use crate::text::fold;

#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    /// Records in input order, first occurrence of each id
    categories: Vec<Category>,
    /// id -> position in `categories`
    by_id: HashMap<CategoryId, usize>,
    /// parent id -> child ids (input order)
    children: HashMap<CategoryId, Vec<CategoryId>>,
    /// folded label -> ids (input order)
    by_label: HashMap<String, Vec<CategoryId>>,
    /// id -> ancestor labels, root first
    paths: HashMap<CategoryId, Vec<String>>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let mut index = Self::default();

        for category in categories {
            if index.by_id.contains_key(&category.id) {
                warn!(id = category.id, label = %category.label, "Duplicate category id ignored");
                continue;
            }
            index.by_id.insert(category.id, index.categories.len());
            index.categories.push(category.clone());
        }

        for category in &index.categories {
            if let Some(parent) = category.parent_id
                && parent != category.id
                && index.by_id.contains_key(&parent)
            {
                index.children.entry(parent).or_default().push(category.id);
            }
            index
                .by_label
                .entry(fold(&category.label))
                .or_default()
                .push(category.id);
        }

        let paths: HashMap<_, _> = index
            .categories
            .iter()
            .map(|c| (c.id, index.compute_path(c.id)))
            .collect();
        index.paths = paths;
        index
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id).map(|&i| &self.categories[i])
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Parent id, only when the parent exists in the index
    pub fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.get(id)
            .and_then(|c| c.parent_id)
            .filter(|p| *p != id && self.contains(*p))
    }

    pub fn children_of(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ancestor labels from the root down to `id` itself; empty when unknown
    pub fn path(&self, id: CategoryId) -> &[String] {
        self.paths.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every id reachable from `id` through child links, `id` included
    pub fn descendants(&self, id: CategoryId) -> HashSet<CategoryId> {
        collect_reachable(id, &self.children)
    }

    /// Ids carrying a label that folds to the same key as `label`
    pub fn ids_labeled(&self, label: &str) -> &[CategoryId] {
        self.by_label
            .get(&fold(label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether some strict ancestor of `id` is labeled `ancestor_label`
    pub fn has_ancestor_labeled(&self, id: CategoryId, ancestor_label: &str) -> bool {
        let key = fold(ancestor_label);
        let mut seen = HashSet::from([id]);
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            if self.get(parent).is_some_and(|c| fold(&c.label) == key) {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Resolve a category / subcategory label selection to one id
    ///
    /// A subcategory wins; among same-named subcategories the one under
    /// `category_label` is preferred. A bare category prefers a root node.
    pub fn resolve_selection(
        &self,
        category_label: &str,
        subcategory_label: &str,
    ) -> Option<CategoryId> {
        let category_label = category_label.trim();
        let subcategory_label = subcategory_label.trim();

        if !subcategory_label.is_empty() {
            let candidates = self.ids_labeled(subcategory_label);
            if !category_label.is_empty()
                && let Some(id) = candidates
                    .iter()
                    .find(|id| self.has_ancestor_labeled(**id, category_label))
            {
                return Some(*id);
            }
            return candidates.first().copied();
        }

        if !category_label.is_empty() {
            let candidates = self.ids_labeled(category_label);
            return candidates
                .iter()
                .find(|id| self.parent_of(**id).is_none())
                .or_else(|| candidates.first())
                .copied();
        }

        None
    }

    fn compute_path(&self, id: CategoryId) -> Vec<String> {
        let mut labels = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if !seen.insert(cid) {
                warn!(id, "Category parent chain loops, path truncated");
                break;
            }
            match self.get(cid) {
                Some(category) => labels.push(category.label.clone()),
                None => break,
            }
            current = self.parent_of(cid);
        }
        labels.reverse();
        labels
    }
}

/// Descendant set of `selected` computed straight from the flat list
pub fn descendant_ids(selected: CategoryId, categories: &[Category]) -> HashSet<CategoryId> {
    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for category in categories {
        if let Some(parent) = category.parent_id
            && parent != category.id
        {
            children.entry(parent).or_default().push(category.id);
        }
    }
    collect_reachable(selected, &children)
}

/// Iterative depth-first walk; revisits are skipped so cycles terminate
fn collect_reachable(
    start: CategoryId,
    children: &HashMap<CategoryId, Vec<CategoryId>>,
) -> HashSet<CategoryId> {
    let mut out = HashSet::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if !out.insert(current) {
            continue;
        }
        if let Some(kids) = children.get(&current) {
            stack.extend(kids.iter().copied().filter(|k| !out.contains(k)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Category> {
        vec![
            Category::root(1, "Globos y Piñatas"),
            Category::child(2, "9 Pulgadas", 1),
            Category::child(3, "Perlado", 2),
            Category::root(4, "Cotillon"),
            Category::child(5, "Velas", 4),
            Category::child(6, "Accesorios", 1),
            Category::child(7, "Accesorios", 4),
        ]
    }

    #[test]
    fn test_descendants_reflexive_and_transitive() {
        let index = CategoryIndex::new(&sample());
        let set = index.descendants(1);
        assert_eq!(set, HashSet::from([1, 2, 3, 6]));
        assert_eq!(index.descendants(3), HashSet::from([3]));
    }

    #[test]
    fn test_descendants_of_unknown_id_is_itself() {
        let index = CategoryIndex::new(&sample());
        assert_eq!(index.descendants(99), HashSet::from([99]));
    }

    #[test]
    fn test_descendant_ids_terminates_on_cycles() {
        let categories = vec![
            Category::child(1, "A", 2),
            Category::child(2, "B", 1),
            Category::child(3, "C", 2),
        ];
        assert_eq!(descendant_ids(1, &categories), HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_path_root_first() {
        let index = CategoryIndex::new(&sample());
        assert_eq!(index.path(3), ["Globos y Piñatas", "9 Pulgadas", "Perlado"]);
        assert_eq!(index.path(4), ["Cotillon"]);
        assert!(index.path(42).is_empty());
    }

    #[test]
    fn test_path_with_dangling_parent_starts_at_orphan() {
        let index = CategoryIndex::new(&[Category::child(8, "Huerfana", 404)]);
        assert_eq!(index.path(8), ["Huerfana"]);
        assert_eq!(index.parent_of(8), None);
    }

    #[test]
    fn test_path_with_cycle_is_truncated() {
        let index = CategoryIndex::new(&[Category::child(1, "A", 2), Category::child(2, "B", 1)]);
        assert_eq!(index.path(1), ["B", "A"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let index = CategoryIndex::new(&[Category::root(1, "Primero"), Category::root(1, "Segundo")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1).map(|c| c.label.as_str()), Some("Primero"));
    }

    #[test]
    fn test_resolve_selection() {
        let index = CategoryIndex::new(&sample());
        assert_eq!(index.resolve_selection("Cotillon", ""), Some(4));
        assert_eq!(index.resolve_selection("globos y pinatas", ""), Some(1));
        assert_eq!(index.resolve_selection("Cotillon", "Accesorios"), Some(7));
        assert_eq!(index.resolve_selection("Globos y Piñatas", "Accesorios"), Some(6));
        assert_eq!(index.resolve_selection("", "Accesorios"), Some(6));
        assert_eq!(index.resolve_selection("", ""), None);
        assert_eq!(index.resolve_selection("Inexistente", ""), None);
    }

    #[test]
    fn test_resolve_selection_prefers_root_for_category() {
        let index = CategoryIndex::new(&[
            Category::child(10, "Velas", 4),
            Category::root(4, "Cotillon"),
            Category::root(11, "Velas"),
        ]);
        assert_eq!(index.resolve_selection("Velas", ""), Some(11));
    }
}
