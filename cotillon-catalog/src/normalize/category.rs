use serde_json::Value;
use shared::models::Category;
use shared::serde_helpers::{as_id, first, first_id, first_string};

const ID_KEYS: &[&str] = &["id", "_id"];
const LABEL_KEYS: &[&str] = &["nombre", "name", "label"];
const PARENT_KEYS: &[&str] = &["parent", "parent_id", "parentId"];

/// Map one raw category record; records without a usable id are skipped
pub fn normalize_category(value: &Value) -> Option<Category> {
    let map = value.as_object()?;
    let Some(id) = first_id(map, ID_KEYS) else {
        tracing::warn!(record = %value, "Skipping category without id");
        return None;
    };

    let label = first_string(map, LABEL_KEYS).unwrap_or_else(|| format!("Categoría {id}"));

    // parent may be an id or an embedded `{id, ...}` object
    let parent_id = first(map, PARENT_KEYS).and_then(|parent| match parent {
        Value::Object(obj) => first_id(obj, ID_KEYS),
        other => as_id(other),
    });

    Some(Category {
        id,
        label,
        parent_id,
    })
}

pub fn normalize_categories(items: &[Value]) -> Vec<Category> {
    items.iter().filter_map(normalize_category).collect()
}
