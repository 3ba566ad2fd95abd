use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

const DEFAULT_UPSTREAM_URL: &str = "https://dummyjson.com/recipes";

pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub log_format: LogFormat,
    pub upstream: UpstreamConfig,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Cross-origin policy applied to every route.
///
/// A single `*` entry in any of the lists means "any".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub preflight_max_age: Duration,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["*".to_string()],
            allow_credentials: false,
            preflight_max_age: Duration::from_secs(86_400),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let listen_addr: SocketAddr = env::var("RECIPE_RELAY_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("invalid RECIPE_RELAY_ADDR")?;

        let log_format = match env::var("RECIPE_LOG_FORMAT") {
            Ok(raw) => parse_log_format(&raw)?,
            Err(_) => LogFormat::Text,
        };

        let base_url = env::var("RECIPE_UPSTREAM_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());
        let base_url = Url::parse(&base_url).context("invalid RECIPE_UPSTREAM_URL")?;

        let upstream = UpstreamConfig {
            base_url,
            timeout: parse_duration("RECIPE_UPSTREAM_TIMEOUT_SECONDS", 10)?,
        };

        let defaults = CorsSettings::default();
        let cors = CorsSettings {
            allowed_origins: parse_list("RECIPE_CORS_ALLOWED_ORIGINS", defaults.allowed_origins),
            allowed_methods: parse_list("RECIPE_CORS_ALLOWED_METHODS", defaults.allowed_methods),
            allowed_headers: parse_list("RECIPE_CORS_ALLOWED_HEADERS", defaults.allowed_headers),
            allow_credentials: parse_bool("RECIPE_CORS_ALLOW_CREDENTIALS", false)?,
            preflight_max_age: parse_duration("RECIPE_CORS_PREFLIGHT_MAX_AGE", 86_400)?,
        };

        Ok(Self {
            listen_addr,
            log_format,
            upstream,
            cors,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

fn parse_duration(env_key: &str, default_secs: u64) -> Result<Duration> {
    let raw = env::var(env_key).unwrap_or_else(|_| default_secs.to_string());
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{env_key} must be an integer number of seconds"))?;

    Ok(Duration::from_secs(secs))
}

fn parse_bool(env_key: &str, default: bool) -> Result<bool> {
    match env::var(env_key) {
        Ok(raw) => raw
            .trim()
            .to_ascii_lowercase()
            .parse()
            .with_context(|| format!("{env_key} must be true or false")),
        Err(_) => Ok(default),
    }
}

fn parse_list(env_key: &str, default: Vec<String>) -> Vec<String> {
    match env::var(env_key) {
        Ok(raw) => split_list(&raw),
        Err(_) => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "text" | "pretty" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => anyhow::bail!("RECIPE_LOG_FORMAT must be text or json, got {other:?}"),
    }
}
