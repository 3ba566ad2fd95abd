// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Upstream client for Recipe Relay.
//!
//! Issues a single GET per operation against the configured recipe provider
//! and decodes the JSON body into the local record types. Nothing is retried
//! or cached here.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::error::AppError;
use crate::model::{self, Recipe, RecipeCollection};

/// Category of an upstream failure, used for status-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    NotFound,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, timeout, or non-success status.
    #[error("{context}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid response format")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl UpstreamError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UpstreamError::Transport { .. } => FailureKind::Transport,
            UpstreamError::Parse { .. } => FailureKind::Parse,
            UpstreamError::NotFound { .. } => FailureKind::NotFound,
        }
    }

    fn transport(context: &str, source: reqwest::Error) -> Self {
        UpstreamError::Transport {
            context: context.to_string(),
            source,
        }
    }
}

/// Read-only recipe operations the HTTP layer depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn list_recipes(
        &self,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<RecipeCollection, UpstreamError>;

    /// Returns [`UpstreamError::NotFound`] when the provider answers 404.
    async fn get_recipe(&self, id: i64) -> Result<Recipe, UpstreamError>;

    async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, UpstreamError>;

    async fn recipes_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, UpstreamError>;

    async fn recipes_by_meal_type(&self, meal_type: &str) -> Result<Vec<Recipe>, UpstreamError>;
}

/// HTTP client wrapper for talking to the upstream recipe provider.
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: Url,
    client: Client,
}

impl UpstreamClient {
    /// Construct a new upstream client using the provided configuration.
    pub fn try_new(config: UpstreamConfig) -> Result<Self, AppError> {
        if config.base_url.cannot_be_a_base() {
            return Err(AppError::Internal(anyhow!(
                "Upstream URL {} cannot carry path segments",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(anyhow!("Failed to build upstream client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // try_new rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Response, UpstreamError> {
        request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(context, e))
    }

    async fn read<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, UpstreamError> {
        let response = response
            .error_for_status()
            .map_err(|e| UpstreamError::transport(context, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::transport(context, e))?;

        model::decode(&body).map_err(|source| UpstreamError::Parse { source })
    }

    async fn fetch_list(
        &self,
        url: Url,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<Vec<Recipe>, UpstreamError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.send(request, context).await?;
        let page: RecipeCollection = Self::read(response, context).await?;
        Ok(page.recipes)
    }
}

#[async_trait]
impl RecipeSource for UpstreamClient {
    async fn list_recipes(
        &self,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<RecipeCollection, UpstreamError> {
        const CONTEXT: &str = "Failed to fetch recipes";

        let mut request = self.client.get(self.endpoint(&[]));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        if let Some(skip) = skip {
            request = request.query(&[("skip", skip)]);
        }

        let response = self.send(request, CONTEXT).await?;
        Self::read(response, CONTEXT).await
    }

    async fn get_recipe(&self, id: i64) -> Result<Recipe, UpstreamError> {
        let context = format!("Failed to fetch recipe with ID {id}");
        let url = self.endpoint(&[&id.to_string()]);

        let response = self.send(self.client.get(url), &context).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "Recipe not found upstream");
            return Err(UpstreamError::NotFound {
                resource: format!("Recipe with ID {id}"),
            });
        }

        Self::read(response, &context).await
    }

    async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, UpstreamError> {
        self.fetch_list(self.endpoint(&["search"]), &[("q", query)], "Failed to search recipes")
            .await
    }

    async fn recipes_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, UpstreamError> {
        self.fetch_list(self.endpoint(&["tag", tag]), &[], "Failed to fetch recipes by tag")
            .await
    }

    async fn recipes_by_meal_type(&self, meal_type: &str) -> Result<Vec<Recipe>, UpstreamError> {
        self.fetch_list(
            self.endpoint(&["meal-type", meal_type]),
            &[],
            "Failed to fetch recipes by meal type",
        )
        .await
    }
}
