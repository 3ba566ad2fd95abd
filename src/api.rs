// Copyright 2025 Memophor Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP API handlers for Recipe Relay.
//!
//! This module implements all REST API endpoints of the relay:
//!
//! - `GET /healthz` - Service health check
//! - `GET /metrics` - Prometheus metrics export
//! - `GET /api/recipes` - Paginated recipe listing
//! - `GET /api/recipes/:id` - Single recipe lookup
//! - `GET /api/recipes/search` - Free-text recipe search
//! - `GET /api/recipes/tag/:tag` - Recipes carrying a tag
//! - `GET /api/recipes/meal-type/:meal_type` - Recipes for a meal type
//!
//! Every recipe endpoint makes at most one upstream call and relays the result.

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::time::Instant;

use crate::error::AppError;
use crate::metrics::Metrics;
use crate::model::{Recipe, RecipeCollection};
use crate::upstream::{FailureKind, RecipeSource, UpstreamError};

#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<dyn RecipeSource>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(recipes: impl RecipeSource + 'static, metrics: Metrics) -> Self {
        Self {
            recipes: Arc::new(recipes),
            metrics,
        }
    }

    /// Run one upstream call, recording volume, latency, and outcome.
    async fn observe<T, F>(&self, call: F) -> Result<T, UpstreamError>
    where
        F: Future<Output = Result<T, UpstreamError>>,
    {
        self.metrics.record_upstream_request();
        let start = Instant::now();

        let result = call.await;

        self.metrics
            .record_upstream_latency(start.elapsed().as_secs_f64());
        match &result {
            Err(err) if err.kind() == FailureKind::NotFound => {
                self.metrics.record_upstream_not_found()
            }
            Err(_) => self.metrics.record_upstream_failure(),
            Ok(_) => {}
        }

        result
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub skip: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Build the application router with every route mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route("/api/recipes", get(list_recipes))
        .route("/api/recipes/search", get(search_recipes))
        .route("/api/recipes/tag/:tag", get(recipes_by_tag))
        .route("/api/recipes/meal-type/:meal_type", get(recipes_by_meal_type))
        .route("/api/recipes/:id", get(get_recipe))
        .with_state(state)
}

/// Health check endpoint
pub async fn health() -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state.metrics.export()
}

/// List recipes, forwarding pagination only when supplied
pub async fn list_recipes(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<RecipeCollection>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request(format!("Invalid query parameters: {}", e.body_text()))
    })?;

    let page = state
        .observe(state.recipes.list_recipes(query.limit, query.skip))
        .await
        .map_err(|err| {
            tracing::error!(
                error = ?err,
                limit = ?query.limit,
                skip = ?query.skip,
                "Failed to retrieve recipes"
            );
            AppError::upstream("Failed to retrieve recipes", err)
        })?;

    Ok(Json(page))
}

/// Look up a single recipe by its upstream id
pub async fn get_recipe(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Recipe>, AppError> {
    let Path(raw_id) = raw_id
        .map_err(|e| AppError::bad_request(format!("Invalid recipe ID: {}", e.body_text())))?;
    let id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request(format!("Invalid recipe ID: {raw_id}")))?;

    let recipe = state
        .observe(state.recipes.get_recipe(id))
        .await
        .map_err(|err| {
            if err.kind() != FailureKind::NotFound {
                tracing::error!(error = ?err, id, "Failed to retrieve recipe");
            }
            AppError::upstream("Failed to retrieve recipe", err)
        })?;

    Ok(Json(recipe))
}

/// Search recipes; a blank query is rejected before reaching upstream
pub async fn search_recipes(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request(format!("Invalid query parameters: {}", e.body_text()))
    })?;
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return Err(AppError::bad_request("Search query is required"));
    };

    let recipes = state
        .observe(state.recipes.search_recipes(&q))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, query = %q, "Failed to search recipes");
            AppError::upstream("Failed to search recipes", err)
        })?;

    Ok(Json(recipes))
}

pub async fn recipes_by_tag(
    State(state): State<AppState>,
    tag: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let Path(tag) =
        tag.map_err(|e| AppError::bad_request(format!("Invalid tag: {}", e.body_text())))?;

    let recipes = state
        .observe(state.recipes.recipes_by_tag(&tag))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, tag = %tag, "Failed to retrieve recipes by tag");
            AppError::upstream("Failed to retrieve recipes by tag", err)
        })?;

    Ok(Json(recipes))
}

pub async fn recipes_by_meal_type(
    State(state): State<AppState>,
    meal_type: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let Path(meal_type) = meal_type
        .map_err(|e| AppError::bad_request(format!("Invalid meal type: {}", e.body_text())))?;

    let recipes = state
        .observe(state.recipes.recipes_by_meal_type(&meal_type))
        .await
        .map_err(|err| {
            tracing::error!(
                error = ?err,
                meal_type = %meal_type,
                "Failed to retrieve recipes by meal type"
            );
            AppError::upstream("Failed to retrieve recipes by meal type", err)
        })?;

    Ok(Json(recipes))
}
