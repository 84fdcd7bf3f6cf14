use serde_json::Value;
use shared::models::Offer;
use shared::serde_helpers::{as_bool, as_id, as_string, first, first_decimal, first_id, first_string};
use shared::util::parse_timestamp_millis;

/// Map one raw offer record; offers without a percentage are skipped
pub fn normalize_offer(value: &Value) -> Option<Offer> {
    let map = value.as_object()?;
    let percent = first_decimal(map, &["porcentaje", "percent", "percentage", "descuento"])?;

    let product_id = first(map, &["producto", "product", "product_id"]).and_then(|p| match p {
        Value::Object(obj) => first_string(obj, &["_id", "id"]),
        other => as_string(other),
    });
    let category_id = first(map, &["categoria", "category", "category_id"]).and_then(|c| match c {
        Value::Object(obj) => first_id(obj, &["id", "_id"]),
        other => as_id(other),
    });

    Some(Offer {
        id: first_string(map, &["_id", "id"]),
        product_id,
        category_id,
        percent,
        starts_at: first(map, &["empieza", "starts_at", "start", "valid_from"]).and_then(timestamp),
        ends_at: first(map, &["termina", "ends_at", "end", "valid_until"]).and_then(timestamp),
        active: first(map, &["activo", "active"])
            .and_then(as_bool)
            .unwrap_or(true),
    })
}

pub fn normalize_offers(items: &[Value]) -> Vec<Offer> {
    items.iter().filter_map(normalize_offer).collect()
}

/// Epoch millis or a date string
fn timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_timestamp_millis(s),
        other => as_id(other),
    }
}
