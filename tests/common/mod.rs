// Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use recipe_relay::config::UpstreamConfig;
use recipe_relay::UpstreamClient;
use reqwest::Url;
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn recipe_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "ingredients": ["Flour", "Water", "Salt"],
        "instructions": ["Mix", "Knead", "Bake"],
        "prepTimeMinutes": 20,
        "cookTimeMinutes": 30,
        "servings": 4,
        "difficulty": "Easy",
        "cuisine": "Italian",
        "caloriesPerServing": 250,
        "tags": ["Bread"],
        "userId": 11,
        "image": format!("https://cdn.dummyjson.com/recipe-images/{id}.webp"),
        "rating": 4.5,
        "reviewCount": 12,
        "mealType": ["Dinner"]
    })
}

pub fn page_json(ids: std::ops::RangeInclusive<i64>, total: i64, skip: i64, limit: i64) -> Value {
    let recipes: Vec<Value> = ids.map(|id| recipe_json(id, "Focaccia")).collect();
    json!({ "recipes": recipes, "total": total, "skip": skip, "limit": limit })
}

pub fn client_for(server: &MockServer) -> UpstreamClient {
    client_with_timeout(&format!("{}/recipes", server.uri()), Duration::from_secs(2))
}

pub fn client_with_timeout(base: &str, timeout: Duration) -> UpstreamClient {
    UpstreamClient::try_new(UpstreamConfig {
        base_url: Url::parse(base).unwrap(),
        timeout,
    })
    .unwrap()
}
