//! Merchandising configuration
//!
//! Manual ordering and label heuristics live here as data, apart from the
//! tree traversal that consumes them. The built-in table mirrors the store's
//! shelf layout; [`MerchandisingConfig::from_json`] replaces it wholesale.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;
use crate::text::{compare_labels, fold, slugify};

/// Manual order for the children of one named parent category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOrder {
    /// Parent label (matched by slug, at any depth)
    pub parent: String,
    /// Child labels in display order
    pub order: Vec<String>,
}

/// A "size group" label and the numeric token its products carry in their names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGroup {
    pub label: String,
    /// Leading size number, e.g. "9" for "9 Pulgadas"
    pub token: String,
}

/// Two listings that collapse into one selectable variant product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMergeRule {
    /// Every word must appear in the first product's folded name
    pub primary_terms: Vec<String>,
    /// Every word must appear in the second product's folded name
    pub secondary_terms: Vec<String>,
    /// Name of the merged listing
    pub merged_name: String,
    /// Values appended to the merged colour attribute
    pub extra_colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchandisingConfig {
    /// Root categories in display order; unlisted roots follow alphabetically
    pub top_level_order: Vec<String>,
    #[serde(default)]
    pub child_orders: Vec<ChildOrder>,
    #[serde(default)]
    pub size_groups: Vec<SizeGroup>,
    #[serde(default)]
    pub variant_merges: Vec<VariantMergeRule>,
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for MerchandisingConfig {
    fn default() -> Self {
        let pulgadas = labels(&["Perlado", "Liso"]);
        Self {
            top_level_order: labels(&[
                "Cotillon",
                "Globos y Piñatas",
                "Guirnaldas y Decoración",
                "Decoracion para Tortas",
                "Decoración Led",
                "Luminoso",
                "Librería",
                "Disfraces",
                "Descartables",
                "Reposteria",
                "Juguetes",
                "Miniaturas-Juguetitos",
                "Fechas Especiales",
                "Lanzapapelitos",
                "Papelera",
                "Articulos con Sonido",
                "Articulos en telgopor",
                "Artículos Para Manualidades",
                "Artículos Para Comunión",
            ]),
            child_orders: vec![
                ChildOrder {
                    parent: "Cotillon".into(),
                    order: labels(&[
                        "Velas",
                        "Vinchas y Coronas",
                        "Gorros y Sombreros",
                        "Antifaces",
                        "Carioca",
                    ]),
                },
                ChildOrder {
                    parent: "Velas".into(),
                    order: labels(&[
                        "Velas con Palito",
                        "Velas Importadas",
                        "Bengalas",
                        "Velas con Luz",
                        "Vela Escudo de Fútbol",
                        "Velas Estrellita",
                    ]),
                },
                ChildOrder {
                    parent: "Globos y Piñatas".into(),
                    order: labels(&[
                        "Número Metalizados",
                        "Globos con Forma",
                        "Set de Globos",
                        "9 Pulgadas",
                        "10 Pulgadas",
                        "12 Pulgadas",
                        "Globologia",
                        "Piñatas",
                        "Accesorios",
                    ]),
                },
                ChildOrder {
                    parent: "9 Pulgadas".into(),
                    order: pulgadas.clone(),
                },
                ChildOrder {
                    parent: "10 Pulgadas".into(),
                    order: pulgadas.clone(),
                },
                ChildOrder {
                    parent: "12 Pulgadas".into(),
                    order: pulgadas,
                },
                ChildOrder {
                    parent: "Disfraces".into(),
                    order: labels(&[
                        "Extensiones Pelucas y Pintura",
                        "Maquillaje",
                        "Caretas",
                        "Tutús",
                        "Alas",
                    ]),
                },
                ChildOrder {
                    parent: "Descartables".into(),
                    order: labels(&[
                        "Bandejas Cartón",
                        "Bandejas Plasticas",
                        "Manteles",
                        "Cubiertos",
                        "Platos",
                        "Potes",
                        "Servilletas",
                        "Vasos y Copas",
                        "Blondas",
                    ]),
                },
                ChildOrder {
                    parent: "Reposteria".into(),
                    order: labels(&[
                        "Parpen",
                        "Lodiser",
                        "Ballina",
                        "Dewey",
                        "Comestibles",
                        "Placas Plásticas",
                        "Decoracion Tortas-Topper",
                        "Moldes",
                    ]),
                },
            ],
            size_groups: vec![
                SizeGroup {
                    label: "9 Pulgadas".into(),
                    token: "9".into(),
                },
                SizeGroup {
                    label: "10 Pulgadas".into(),
                    token: "10".into(),
                },
                SizeGroup {
                    label: "12 Pulgadas".into(),
                    token: "12".into(),
                },
            ],
            variant_merges: vec![VariantMergeRule {
                primary_terms: labels(&["hilo", "oro", "x50mts"]),
                secondary_terms: labels(&["hilo", "plata", "x50mts"]),
                merged_name: "Hilo Oro/Plata x50mts (Elegir Color)".into(),
                extra_colors: labels(&["Dorado", "Plateado"]),
            }],
        }
    }
}

impl MerchandisingConfig {
    /// Load a replacement table from JSON
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Comparator for root categories
    pub fn root_ranking(&self) -> Ranking {
        Ranking::new(&self.top_level_order)
    }

    /// Comparator for the children of `parent_slug`, if it has a manual order
    pub fn child_ranking(&self, parent_slug: &str) -> Option<Ranking> {
        self.child_orders
            .iter()
            .find(|rule| slugify(&rule.parent) == parent_slug)
            .map(|rule| Ranking::new(&rule.order))
    }

    /// Size group whose label matches `label` (folded comparison)
    pub fn size_group(&self, label: &str) -> Option<&SizeGroup> {
        let key = fold(label);
        if key.is_empty() {
            return None;
        }
        self.size_groups.iter().find(|g| fold(&g.label) == key)
    }

    pub fn is_size_group(&self, label: &str) -> bool {
        self.size_group(label).is_some()
    }
}

/// Slug -> rank lookup; unranked labels sort after ranked ones, alphabetically
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    ranks: HashMap<String, usize>,
}

impl Ranking {
    pub fn new(order: &[String]) -> Self {
        let mut ranks = HashMap::with_capacity(order.len());
        for (i, label) in order.iter().enumerate() {
            ranks.entry(slugify(label)).or_insert(i);
        }
        Self { ranks }
    }

    pub fn rank(&self, slug: &str) -> Option<usize> {
        self.ranks.get(slug).copied()
    }

    pub fn compare(&self, a_slug: &str, a_label: &str, b_slug: &str, b_label: &str) -> Ordering {
        match (self.rank(a_slug), self.rank(b_slug)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| compare_labels(a_label, b_label)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_labels(a_label, b_label),
        }
    }
}

impl SizeGroup {
    /// Whether a product name carries this size, e.g. `9"`, `9''` or `9 pulgadas`
    ///
    /// The token must not be preceded by another digit, so "19 pulgadas"
    /// does not count as a 9-inch balloon.
    pub fn matches_name(&self, name: &str) -> bool {
        let folded = fold(name);
        let markers = [
            format!("{}\"", self.token),
            format!("{}''", self.token),
            format!("{} pulgadas", self.token),
        ];
        markers
            .iter()
            .any(|marker| self.token_at_boundary(&folded, marker))
    }

    fn token_at_boundary(&self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        haystack.match_indices(needle).any(|(idx, _)| {
            !haystack[..idx]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit())
        })
    }
}
