// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Recipe Relay: a pass-through HTTP API in front of a single upstream
//! recipe provider.

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod model;
pub mod upstream;

pub use api::{router, AppState};
pub use error::AppError;
pub use model::{Recipe, RecipeCollection};
pub use upstream::{FailureKind, RecipeSource, UpstreamClient, UpstreamError};
