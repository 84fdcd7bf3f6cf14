use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use shared::models::{CategoryId, Offer, Product};
use shared::serde_helpers::{as_bool, as_decimal, as_id, as_string, first, first_decimal, first_id, first_string};
use url::form_urlencoded;

use crate::index::CategoryIndex;
use crate::pricing::{find_offer, resolve_price};
use crate::variants::clean_attributes;

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=";
const DEFAULT_NAME: &str = "Producto";

/// Everything product normalization needs besides the record itself
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub index: &'a CategoryIndex,
    pub offers: &'a [Offer],
    /// Prefix for root-relative image paths
    pub api_base: &'a str,
    pub now_millis: i64,
}

/// Map one raw product record
///
/// Returns `None` for non-objects and records without any identifier.
/// Inactive products are returned with `active == false`;
/// [`normalize_products`] drops them.
pub fn normalize_product(value: &Value, ctx: &NormalizeContext<'_>) -> Option<Product> {
    let map = value.as_object()?;
    let Some(id) = first_string(map, &["_id", "id", "slug"]) else {
        tracing::warn!(record = %value, "Skipping product without id");
        return None;
    };
    let name = first_string(map, &["name", "nombre"]).unwrap_or_else(|| DEFAULT_NAME.to_string());

    let category = first(map, &["categoria", "category"]);
    let category_id = category
        .and_then(|c| match c {
            Value::Object(obj) => first_id(obj, &["id", "_id"]),
            other => as_id(other),
        })
        .or_else(|| first_id(map, &["categoria_id", "category_id", "categoryId"]));
    let category_path = category_path(map, category, category_id, ctx.index);

    let original = first_decimal(map, &["priceOriginal", "precioOriginal", "price", "precio"])
        .unwrap_or(Decimal::ZERO);
    let base = first_decimal(map, &["price", "precio"]).unwrap_or(original);
    let own_percent = first(map, &["discount", "descuento"])
        .and_then(Value::as_object)
        .and_then(|d| first_decimal(d, &["percent", "porcentaje"]));
    let offer = find_offer(ctx.offers, &id, category_id, ctx.now_millis);
    let pricing = resolve_price(base, original, own_percent, offer);

    let image_url = resolve_image_url(image_candidate(map), &name, ctx.api_base);

    Some(Product {
        attributes: first(map, &["attributes", "atributos"])
            .and_then(Value::as_object)
            .map(clean_attributes)
            .unwrap_or_default(),
        attribute_stock: first(map, &["attributes_stock", "atributos_stock"])
            .and_then(Value::as_object)
            .map(attribute_stock)
            .unwrap_or_default(),
        stock: first_decimal(map, &["stock"])
            .and_then(|d| d.trunc().to_i64())
            .unwrap_or(0),
        active: first(map, &["active", "activo"])
            .and_then(as_bool)
            .unwrap_or(true),
        id,
        name,
        price: pricing.price,
        original_price: pricing.original_price,
        discount: pricing.discount,
        image_url,
        category_id,
        category_path,
    })
}

/// Normalize a list of raw products, dropping unusable and inactive ones
pub fn normalize_products(items: &[Value], ctx: &NormalizeContext<'_>) -> Vec<Product> {
    let products: Vec<Product> = items
        .iter()
        .filter_map(|item| normalize_product(item, ctx))
        .filter(|p| p.active)
        .collect();
    if products.len() < items.len() {
        tracing::debug!(
            received = items.len(),
            kept = products.len(),
            "Dropped inactive or malformed products"
        );
    }
    products
}

/// Known category paths come from the index; otherwise the record's own
/// category and subcategory labels are used
fn category_path(
    map: &Map<String, Value>,
    category: Option<&Value>,
    category_id: Option<CategoryId>,
    index: &CategoryIndex,
) -> Vec<String> {
    if let Some(id) = category_id {
        let path = index.path(id);
        if !path.is_empty() {
            return path.to_vec();
        }
    }

    let category_label = category.and_then(|c| match c {
        Value::Object(obj) => first_string(obj, &["nombre", "name", "label"]),
        Value::String(s) if s.trim().parse::<CategoryId>().is_err() => as_string(c),
        _ => None,
    });
    let subcategory_label = first(map, &["subcategoria", "subcategory"]).and_then(|s| match s {
        Value::Object(obj) => first_string(obj, &["nombre", "name", "label"]),
        other => as_string(other),
    });

    category_label.into_iter().chain(subcategory_label).collect()
}

fn image_candidate(map: &Map<String, Value>) -> Option<&Value> {
    first(map, &["imageUrl", "image_url", "imagen"]).or_else(|| {
        map.get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
    })
}

/// Absolutize or discard an image reference
///
/// Root-relative paths get the API base, absolute http(s) URLs pass
/// through, anything else becomes empty. A missing image gets a
/// placeholder carrying the product name.
pub fn resolve_image_url(candidate: Option<&Value>, name: &str, api_base: &str) -> String {
    let Some(candidate) = candidate else {
        let text: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
        return format!("{PLACEHOLDER_IMAGE}{text}");
    };
    let Some(url) = candidate.as_str().map(str::trim) else {
        return String::new();
    };
    if url.starts_with('/') {
        format!("{}{}", api_base.trim_end_matches('/'), url)
    } else if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        String::new()
    }
}

fn attribute_stock(raw: &Map<String, Value>) -> BTreeMap<String, BTreeMap<String, i64>> {
    raw.iter()
        .filter_map(|(attr, by_value)| {
            let by_value = by_value.as_object()?;
            let counts: BTreeMap<String, i64> = by_value
                .iter()
                .filter_map(|(option, count)| {
                    let count = as_decimal(count)?.trunc().to_i64()?;
                    Some((option.trim().to_string(), count))
                })
                .collect();
            (!counts.is_empty()).then(|| (attr.trim().to_string(), counts))
        })
        .collect()
}
