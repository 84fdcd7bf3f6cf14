//! Serde helpers for loosely-typed catalog payloads
//!
//! The catalog service is not consistent about scalar types: ids arrive as
//! numbers or numeric strings, prices as numbers or strings, flags as bools
//! or null. These helpers read such values without failing the whole record.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::models::CategoryId;

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Internal helper: accepts both numeric and string ids
#[derive(Debug, Clone, Copy)]
struct FlexibleId(CategoryId);

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct FlexibleVisitor;

        impl Visitor<'_> for FlexibleVisitor {
            type Value = FlexibleId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer id or a numeric string")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                CategoryId::try_from(value)
                    .map(FlexibleId)
                    .map_err(|_| de::Error::custom(format!("id out of range: {}", value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .trim()
                    .parse::<CategoryId>()
                    .map(FlexibleId)
                    .map_err(|_| de::Error::custom(format!("invalid id: {}", value)))
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// Deserialize an id given as number or numeric string
pub fn flexible_id<'de, D>(deserializer: D) -> Result<CategoryId, D::Error>
where
    D: Deserializer<'de>,
{
    FlexibleId::deserialize(deserializer).map(|id| id.0)
}

/// Deserialize an optional id given as number, numeric string or null
pub fn option_flexible_id<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<FlexibleId>::deserialize(deserializer).map(|opt| opt.map(|id| id.0))
}

// =============================================================================
// serde_json::Value readers
// =============================================================================

/// First non-null value among `keys`
pub fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// Read a value as a non-empty trimmed string (numbers are stringified)
pub fn as_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// First of `keys` readable as a non-empty string
pub fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(as_string)
}

/// Read a value as an id (integer or numeric string)
pub fn as_id(value: &Value) -> Option<CategoryId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First of `keys` readable as an id
pub fn first_id(map: &Map<String, Value>, keys: &[&str]) -> Option<CategoryId> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(as_id)
}

/// Read a value as a decimal amount (number or numeric string)
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First of `keys` readable as a decimal
pub fn first_decimal(map: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(as_decimal)
}

/// Read a value as a bool; strings "true"/"false" and 0/1 are accepted
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
