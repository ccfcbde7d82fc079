use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid URL in {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub slow_query_threshold_ms: u64,
}

/// Identity provider settings for the OpenID Connect login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub base_url: String,
    pub client_id: String,
    pub issuer_base_url: String,
    pub provider_logout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub session_ttl_hours: u64,
    pub expose_store_errors: bool,
    pub script_sources: Vec<String>,
}

/// First set variable among `names`, so deployments can keep provider-specific names
fn env_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.server.static_dir = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }
        if let Ok(v) = env::var("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms = v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // Identity provider
        if let Some(v) = env_any(&["OIDC_SECRET", "AUTH0_SECRET"]) {
            self.auth.secret = v;
        }
        if let Some(v) = env_any(&["OIDC_BASE_URL", "AUTH0_BASE_URL"]) {
            self.auth.base_url = v;
        }
        if let Some(v) = env_any(&["OIDC_CLIENT_ID", "AUTH0_CLIENT_ID"]) {
            self.auth.client_id = v;
        }
        if let Some(v) = env_any(&["OIDC_ISSUER_BASE_URL", "AUTH0_ISSUER_BASE_URL"]) {
            self.auth.issuer_base_url = v;
        }
        if let Ok(v) = env::var("OIDC_PROVIDER_LOGOUT") {
            self.auth.provider_logout = v.parse().unwrap_or(self.auth.provider_logout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_EXPOSE_STORE_ERRORS") {
            self.security.expose_store_errors = v.parse().unwrap_or(self.security.expose_store_errors);
        }

        self
    }

    /// Check the settings that have no usable default
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.trim().is_empty() {
            return Err(ConfigError::Missing("OIDC_SECRET"));
        }
        if self.auth.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("OIDC_CLIENT_ID"));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        for (name, value) in [
            ("OIDC_BASE_URL", &self.auth.base_url),
            ("OIDC_ISSUER_BASE_URL", &self.auth.issuer_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
            url::Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
                name,
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    /// Session cookies are marked `Secure` whenever the public URL is https
    pub fn secure_cookies(&self) -> bool {
        self.auth.base_url.starts_with("https://")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                static_dir: "public".to_string(),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
                slow_query_threshold_ms: 100,
            },
            auth: AuthConfig {
                secret: String::new(),
                base_url: String::new(),
                client_id: String::new(),
                issuer_base_url: String::new(),
                provider_logout: true,
            },
            security: SecurityConfig {
                session_ttl_hours: 24,
                expose_store_errors: true,
                script_sources: vec!["'self'".to_string(), "cdnjs.cloudflare.com".to_string()],
            },
        }
    }

    /// Development preset without environment overrides
    pub fn development() -> Self {
        let mut config = Self::base(Environment::Development);
        config.auth.base_url = "http://localhost:8080".to_string();
        config
    }

    fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.database.slow_query_threshold_ms = 500;
        config.security.expose_store_errors = false;
        config
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.enable_query_logging = false;
        config.database.slow_query_threshold_ms = 1000;
        config.security.session_ttl_hours = 8;
        config.security.expose_store_errors = false;
        config
    }
}
