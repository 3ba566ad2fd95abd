// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Cross-origin policy for the public recipe routes.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::CorsSettings;

fn is_wildcard(values: &[String]) -> bool {
    values.is_empty() || values.iter().any(|v| v == "*")
}

/// Build the CORS layer from settings.
///
/// Credentials are only honoured with an explicit origin list. With
/// credentials on, wildcard methods and headers mirror the preflight request
/// instead of answering `*`, which browsers reject alongside credentials.
pub fn build_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let any_origin = is_wildcard(&settings.allowed_origins);
    let credentials = settings.allow_credentials && !any_origin;

    if settings.allow_credentials && any_origin {
        tracing::warn!("CORS credentials requested with a wildcard origin; credentials disabled");
    }

    let allow_origin = if any_origin {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = settings
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    let allow_methods = if is_wildcard(&settings.allowed_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        let methods: Vec<Method> = settings
            .allowed_methods
            .iter()
            .filter_map(|method| Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok())
            .collect();
        AllowMethods::list(methods)
    };

    let allow_headers = if is_wildcard(&settings.allowed_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        let headers: Vec<HeaderName> = settings
            .allowed_headers
            .iter()
            .filter_map(|header| HeaderName::from_bytes(header.as_bytes()).ok())
            .collect();
        AllowHeaders::list(headers)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(allow_headers)
        .allow_credentials(credentials)
        .max_age(settings.preflight_max_age)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    fn app(settings: &CorsSettings) -> Router {
        Router::new()
            .route("/api/recipes", get(|| async { "[]" }))
            .layer(build_cors_layer(settings))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/recipes")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-client-trace")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn default_policy_allows_any_origin() {
        let response = app(&CorsSettings::default())
            .oneshot(preflight("https://cookbook.example"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[tokio::test]
    async fn explicit_origins_with_credentials() {
        let settings = CorsSettings {
            allowed_origins: vec!["https://cookbook.example".into()],
            allow_credentials: true,
            preflight_max_age: Duration::from_secs(600),
            ..CorsSettings::default()
        };

        let response = app(&settings)
            .oneshot(preflight("https://cookbook.example"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://cookbook.example"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "x-client-trace");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_allow_header() {
        let settings = CorsSettings {
            allowed_origins: vec!["https://cookbook.example".into()],
            ..CorsSettings::default()
        };

        let response = app(&settings)
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn credentials_with_wildcard_origin_are_dropped() {
        let settings = CorsSettings {
            allow_credentials: true,
            ..CorsSettings::default()
        };

        let response = app(&settings)
            .oneshot(preflight("https://cookbook.example"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
