// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Recipe records relayed from the upstream provider.
//!
//! Records mirror the upstream JSON shape. Decoding is loose: field names
//! are matched without regard to case, and absent or `null` fields fall back
//! to their defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single recipe as published by the upstream provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: i64,
    pub cook_time_minutes: i64,
    pub servings: i64,
    pub difficulty: String,
    pub cuisine: String,
    pub calories_per_serving: i64,
    pub tags: Vec<String>,
    pub user_id: i64,
    pub image: String,
    pub rating: f64,
    pub review_count: i64,
    pub meal_type: Vec<String>,
}

/// A page of recipes plus the upstream pagination metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeCollection {
    pub recipes: Vec<Recipe>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Canonical (serialized) names of every field on the records above.
const KNOWN_FIELDS: &[&str] = &[
    "id",
    "name",
    "ingredients",
    "instructions",
    "prepTimeMinutes",
    "cookTimeMinutes",
    "servings",
    "difficulty",
    "cuisine",
    "caloriesPerServing",
    "tags",
    "userId",
    "image",
    "rating",
    "reviewCount",
    "mealType",
    "recipes",
    "total",
    "skip",
    "limit",
];

/// Decode an upstream body, matching field names case-insensitively.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let raw: Value = serde_json::from_slice(body)?;
    let normalized = match raw {
        Value::Null => Value::Object(Map::new()),
        other => normalize_keys(other),
    };
    serde_json::from_value(normalized)
}

fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                if inner.is_null() {
                    continue;
                }
                let key = canonical_field(&key).map_or(key, str::to_string);
                out.insert(key, normalize_keys(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(normalize_keys)
                .collect(),
        ),
        other => other,
    }
}

fn canonical_field(key: &str) -> Option<&'static str> {
    KNOWN_FIELDS
        .iter()
        .copied()
        .find(|field| field.eq_ignore_ascii_case(key))
}
