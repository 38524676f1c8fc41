//! Configuration module for the Bluespace backend.
//!
//! All configuration is loaded from environment variables with localhost defaults.

use std::env;
use std::net::SocketAddr;

use crate::auth::jwt::JwtConfig;

/// Fallback signing secret used only when `BLUESPACE_JWT_SECRET` is unset.
pub const DEV_JWT_SECRET: &str = "bluespace-development-secret-do-not-use-in-production";

/// Deployment environment, controls how much error detail leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    pub database_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Deployment environment
    pub environment: Environment,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// Whether the signing secret is the built-in development fallback
    pub jwt_secret_is_default: bool,
    /// Reject requests without a bearer token on protected routes
    pub require_auth: bool,
    /// Load demo users, projects and notifications into an empty database
    pub seed_demo: bool,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/bluespace.sqlite".to_string());

        let host = env::var("BLUESPACE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
        let bind_addr = format!("{}:{}", host, port)
            .parse()
            .expect("Invalid BLUESPACE_HOST/PORT format");

        let environment = env::var("BLUESPACE_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);

        let log_level = env::var("BLUESPACE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("BLUESPACE_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let secret = env::var("BLUESPACE_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let jwt_secret_is_default = secret.is_none();
        let token_ttl_mins = env::var("BLUESPACE_TOKEN_TTL_MINS")
            .ok()
            .map(|v| v.parse().expect("BLUESPACE_TOKEN_TTL_MINS must be a whole number"))
            .unwrap_or(JwtConfig::DEFAULT_TTL_MINS);
        let jwt = JwtConfig {
            secret: secret.unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            token_ttl_mins,
        };

        let require_auth = env::var("BLUESPACE_REQUIRE_AUTH")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(environment.is_production());

        let seed_demo = env::var("BLUESPACE_SEED_DEMO")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(true);

        let cors_origins = env::var("BLUESPACE_CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url,
            bind_addr,
            environment,
            log_level,
            log_format,
            jwt,
            jwt_secret_is_default,
            require_auth,
            seed_demo,
            cors_origins,
        }
    }

    /// Whether internal error details may be sent to clients.
    pub fn expose_error_details(&self) -> bool {
        !self.environment.is_production()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
