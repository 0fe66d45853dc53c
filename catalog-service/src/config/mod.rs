use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Full configuration of the catalog service, resolved once at startup.
///
/// The original deployment shipped two near-identical variants differing
/// only in these constants; they collapse into this one object.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client IP per window.
    pub max_requests: u32,
    pub window_seconds: u64,
    /// Body of every rejected response.
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// `["*"]` allows any origin; anything else is an explicit allow-list.
    pub allowed_origins: Vec<String>,
    /// Only honored with an explicit origin list; a wildcard origin forces
    /// credentials off.
    pub allow_credentials: bool,
    /// Key rate limiting on `X-Forwarded-For` before the socket peer.
    pub trust_proxy: bool,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::Config(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = CatalogConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("catalog-service"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", Some("sqlite://data.db"), is_prod)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: get_env("RATE_LIMIT_MAX_REQUESTS", Some("200"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::Config(anyhow::anyhow!(e.to_string()))
                    })?,
                window_seconds: get_env("RATE_LIMIT_WINDOW_SECONDS", Some("86400"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::Config(anyhow::anyhow!(e.to_string()))
                    })?,
                message: get_env("RATE_LIMIT_MESSAGE", Some("Rate limit exceeded"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: get_env("CORS_ALLOW_CREDENTIALS", Some("false"), is_prod)?
                    .parse()
                    .unwrap_or(false),
                trust_proxy: get_env("TRUST_PROXY", Some("true"), is_prod)?
                    .parse()
                    .unwrap_or(true),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::Config(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.rate_limit.max_requests == 0 {
            return Err(AppError::Config(anyhow::anyhow!(
                "RATE_LIMIT_MAX_REQUESTS must be greater than 0"
            )));
        }

        if self.rate_limit.window_seconds == 0 {
            return Err(AppError::Config(anyhow::anyhow!(
                "RATE_LIMIT_WINDOW_SECONDS must be greater than 0"
            )));
        }

        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::Config(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Config(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
