//! Attribute variants
//!
//! Option lists, default selections and per-variant stock for products
//! with selectable attributes, plus the listing merges configured in
//! [`VariantMergeRule`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use shared::models::Product;
use shared::serde_helpers::as_string;

use crate::merchandising::VariantMergeRule;
use crate::text::{fold, fold_eq};

const NUMBER_ATTRIBUTE: &str = "numero";
const PLACEHOLDER_WORDS: &[&str] = &["elegir", "numero"];

/// Selected value per attribute name
pub type Selection = BTreeMap<String, String>;

/// Clean a raw attribute map
///
/// Values may be a list or a single scalar. Values are trimmed, empty ones
/// removed, and attributes left without values dropped.
pub fn clean_attributes(raw: &Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    raw.iter()
        .filter(|(name, _)| !name.trim().is_empty())
        .filter_map(|(name, values)| {
            let cleaned: Vec<String> = match values {
                Value::Array(items) => items.iter().filter_map(as_string).collect(),
                other => as_string(other).into_iter().collect(),
            };
            (!cleaned.is_empty()).then(|| (name.clone(), cleaned))
        })
        .collect()
}

/// Options offered for one attribute
///
/// A "número" attribute with no real options (nothing, or a lone
/// "Elegir número" style placeholder) offers the digits 0 to 9.
pub fn attribute_options(name: &str, values: &[String]) -> Vec<String> {
    let cleaned: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if fold(name).contains(NUMBER_ATTRIBUTE) {
        let placeholder = cleaned.len() <= 1
            && cleaned.iter().any(|v| {
                let folded = fold(v);
                PLACEHOLDER_WORDS.iter().any(|w| folded.contains(w))
            });
        if cleaned.is_empty() || placeholder {
            return (0..=9).map(|d| d.to_string()).collect();
        }
    }
    cleaned
}

/// Complete a partial selection with the first option of every attribute
pub fn default_selection(product: &Product, chosen: &Selection) -> Selection {
    product
        .attributes
        .iter()
        .filter_map(|(name, values)| {
            let options = attribute_options(name, values);
            let value = chosen
                .get(name)
                .cloned()
                .or_else(|| options.into_iter().next())?;
            Some((name.clone(), value))
        })
        .collect()
}

/// Lowest stock among the selected values that have a stock entry
///
/// `None` when no selected value is tracked.
pub fn variant_stock(product: &Product, selection: &Selection) -> Option<i64> {
    selection
        .iter()
        .filter_map(|(name, value)| product.attribute_stock.get(name)?.get(value).copied())
        .min()
}

/// Apply every merge rule in order; merged listings end up first
pub fn merge_variants(products: Vec<Product>, rules: &[VariantMergeRule]) -> Vec<Product> {
    rules
        .iter()
        .fold(products, |products, rule| merge_pair(products, rule))
}

fn name_has_terms(name: &str, terms: &[String]) -> bool {
    let folded = fold(name);
    terms.iter().all(|t| folded.contains(&fold(t)))
}

fn color_attribute(product: &Product) -> Option<&String> {
    product.attributes.keys().find(|k| fold(k).contains("color"))
}

/// Collapse the first primary/secondary pair into one listing
///
/// The merged product keeps the primary's price and image, unions both
/// attribute maps and gets the de-duplicated union of colours plus the
/// rule's extras. Nothing changes unless both products are present.
fn merge_pair(products: Vec<Product>, rule: &VariantMergeRule) -> Vec<Product> {
    let primary = products
        .iter()
        .position(|p| name_has_terms(&p.name, &rule.primary_terms));
    let secondary = products
        .iter()
        .position(|p| name_has_terms(&p.name, &rule.secondary_terms));
    let (Some(primary), Some(secondary)) = (primary, secondary) else {
        return products;
    };
    if primary == secondary {
        return products;
    }

    let mut rest = Vec::with_capacity(products.len());
    let mut pair = (None, None);
    for (i, product) in products.into_iter().enumerate() {
        if i == primary {
            pair.0 = Some(product);
        } else if i == secondary {
            pair.1 = Some(product);
        } else {
            rest.push(product);
        }
    }
    let (Some(primary), Some(secondary)) = pair else {
        return rest;
    };

    let color_name = color_attribute(&primary)
        .or_else(|| color_attribute(&secondary))
        .cloned()
        .unwrap_or_else(|| "Color".to_string());

    let mut colors: Vec<String> = Vec::new();
    let candidates = primary
        .attributes
        .get(&color_name)
        .into_iter()
        .flatten()
        .chain(secondary.attributes.get(&color_name).into_iter().flatten())
        .chain(rule.extra_colors.iter());
    for color in candidates {
        let color = color.trim();
        if !color.is_empty() && !colors.iter().any(|c| fold_eq(c, color)) {
            colors.push(color.to_string());
        }
    }

    let mut attributes = primary.attributes.clone();
    attributes.extend(secondary.attributes.clone());
    attributes.insert(color_name, colors);

    tracing::debug!(
        primary = %primary.id,
        secondary = %secondary.id,
        "Merged variant listings"
    );

    let merged = Product {
        id: format!("merged-{}", primary.id),
        name: rule.merged_name.clone(),
        attributes,
        ..primary
    };

    let mut out = Vec::with_capacity(rest.len() + 1);
    out.push(merged);
    out.extend(rest);
    out
}
