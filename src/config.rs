/*
 * Responsibility
 * - load settings from the environment (backend addresses, Redis, timeouts, CORS)
 * - validate them up front (startup fails when something is missing or inconsistent)
 */
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Upper bounds for every outbound call the gateway makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub cache: Duration,
    pub auth_rpc: Duration,
    pub profile_rpc: Duration,
    pub request: Duration,
    pub shutdown_grace: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_service_addr: String,
    pub user_service_addr: String,

    pub redis_url: String,
    pub token_cache_prefix: String,

    pub timeouts: Timeouts,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_service_addr = grpc_endpoint(
            lookup("AUTH_SERVICE_ADDR").ok_or(ConfigError::Missing("AUTH_SERVICE_ADDR"))?,
        )
        .ok_or(ConfigError::Invalid("AUTH_SERVICE_ADDR"))?;

        let user_service_addr = grpc_endpoint(
            lookup("USER_SERVICE_ADDR").ok_or(ConfigError::Missing("USER_SERVICE_ADDR"))?,
        )
        .ok_or(ConfigError::Invalid("USER_SERVICE_ADDR"))?;

        let redis_address = lookup("REDIS_ADDRESS")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("REDIS_ADDRESS"))?;
        let redis_password = lookup("REDIS_PASSWORD").unwrap_or_default();
        let redis_url = redis_url(redis_address.trim(), &redis_password)
            .ok_or(ConfigError::Invalid("REDIS_ADDRESS"))?;

        // Unset means `token`; set to empty means bare token keys.
        let token_cache_prefix = lookup("TOKEN_CACHE_PREFIX")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "token".to_string());

        let timeouts = Timeouts {
            cache: millis(&lookup, "CACHE_TIMEOUT_MS", 250)?,
            auth_rpc: millis(&lookup, "AUTH_RPC_TIMEOUT_MS", 1_000)?,
            profile_rpc: millis(&lookup, "PROFILE_RPC_TIMEOUT_MS", 10_000)?,
            request: secs(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_grace: secs(&lookup, "SHUTDOWN_GRACE_SECS", 30)?,
        };

        // The pipeline's own suspension points must expire before the request does.
        if timeouts.cache >= timeouts.request {
            return Err(ConfigError::Invalid("CACHE_TIMEOUT_MS"));
        }
        if timeouts.auth_rpc >= timeouts.request {
            return Err(ConfigError::Invalid("AUTH_RPC_TIMEOUT_MS"));
        }

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            auth_service_addr,
            user_service_addr,
            redis_url,
            token_cache_prefix,
            timeouts,
        })
    }
}

/// Accepts `host:port` as well as full `http(s)://host:port` URLs.
fn grpc_endpoint(raw: String) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    Some(candidate)
}

fn redis_url(address: &str, password: &str) -> Option<String> {
    let mut url = Url::parse(&format!("redis://{address}/0")).ok()?;
    url.host_str()?;

    if !password.is_empty() {
        url.set_password(Some(password)).ok()?;
    }

    Some(url.to_string())
}

fn millis<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    positive(lookup, key, default).map(Duration::from_millis)
}

fn secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    positive(lookup, key, default).map(Duration::from_secs)
}

fn positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}
