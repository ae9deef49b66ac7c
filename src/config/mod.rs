use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub app_name: String,
    pub max_pool_size: u32,
    pub connect_timeout_ms: u64,
    /// Upper bound for every single driver call
    pub call_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    pub default_find_limit: i64,
    pub max_find_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_hours: i64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Created at startup when set and the user store has no such user
    pub bootstrap_admin: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub bootstrap_admin_branch: String,
}

impl DatabaseConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("MONGODB_URI") {
            self.database.uri = v;
        }
        if let Ok(v) = env::var("MONGODB_DATABASE") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_POOL_SIZE") {
            self.database.max_pool_size = v.parse().unwrap_or(self.database.max_pool_size);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_MS") {
            self.database.connect_timeout_ms = v.parse().unwrap_or(self.database.connect_timeout_ms);
        }
        if let Ok(v) = env::var("DATABASE_TIMEOUT_MS") {
            self.database.call_timeout_ms = v.parse().unwrap_or(self.database.call_timeout_ms);
        }

        // API overrides
        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_DEFAULT_FIND_LIMIT") {
            self.api.default_find_limit = v.parse().unwrap_or(self.api.default_find_limit);
        }
        if let Ok(v) = env::var("API_MAX_FIND_LIMIT") {
            self.api.max_find_limit = v.parse().unwrap_or(self.api.max_find_limit);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_MINUTES") {
            self.security.access_token_minutes = v.parse().unwrap_or(self.security.access_token_minutes);
        }
        if let Ok(v) = env::var("JWT_REFRESH_HOURS") {
            self.security.refresh_token_hours = v.parse().unwrap_or(self.security.refresh_token_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN") {
            self.security.bootstrap_admin = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_PASSWORD") {
            self.security.bootstrap_admin_password = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_BRANCH") {
            self.security.bootstrap_admin_branch = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017".to_string(),
                name: "branch_assets".to_string(),
                app_name: "branch-asset-api".to_string(),
                max_pool_size: 10,
                connect_timeout_ms: 5_000,
                call_timeout_ms: 3_000,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_find_limit: 100,
                max_find_limit: 1000,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                access_token_minutes: 60 * 12,
                refresh_token_hours: 24 * 7,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                bootstrap_admin: Some("admin".to_string()),
                bootstrap_admin_password: Some("admin123".to_string()),
                bootstrap_admin_branch: "HEAD OFFICE".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017".to_string(),
                name: "branch_assets_staging".to_string(),
                app_name: "branch-asset-api".to_string(),
                max_pool_size: 20,
                connect_timeout_ms: 5_000,
                call_timeout_ms: 3_000,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                default_find_limit: 100,
                max_find_limit: 500,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 60,
                refresh_token_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                bootstrap_admin: None,
                bootstrap_admin_password: None,
                bootstrap_admin_branch: "HEAD OFFICE".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017".to_string(),
                name: "branch_assets".to_string(),
                app_name: "branch-asset-api".to_string(),
                max_pool_size: 50,
                connect_timeout_ms: 3_000,
                call_timeout_ms: 3_000,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                default_find_limit: 50,
                max_find_limit: 200,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 30,
                refresh_token_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                bootstrap_admin: None,
                bootstrap_admin_password: None,
                bootstrap_admin_branch: "HEAD OFFICE".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
