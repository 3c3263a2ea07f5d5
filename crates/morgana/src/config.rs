use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // HTTP configuration
    #[serde(default = "default_http_host")]
    pub http_host: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Comma-separated origins allowed by CORS, "*" for any
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,

    /// Comma-separated paths left out of request logs
    #[serde(default = "default_http_ignored_paths")]
    pub http_ignored_paths: String,

    /// Mark the session cookie `Secure` (HTTPS deployments)
    #[serde(default)]
    pub secure_cookies: bool,

    // PostgreSQL configuration
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    #[serde(default = "default_postgres_migrations_dir")]
    pub postgres_migrations_dir: String,

    #[serde(default = "default_postgres_goose_binary_path")]
    pub postgres_goose_binary_path: String,

    // Authentication
    /// HMAC secret for session tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    /// Base URL of the public site, used in password reset links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_reset_token_ttl_minutes")]
    pub reset_token_ttl_minutes: u64,

    /// JSON object mapping association codes to department keywords,
    /// replacing the built-in table when set
    #[serde(default)]
    pub department_keywords_json: Option<String>,

    // Email delivery
    #[serde(default = "default_email_api_url")]
    pub email_api_url: String,

    /// Without a key outgoing mail is only logged
    #[serde(default)]
    pub email_api_key: Option<String>,

    #[serde(default = "default_email_from_address")]
    pub email_from_address: String,

    #[serde(default = "default_email_timeout_secs")]
    pub email_timeout_secs: u64,

    // Telemetry
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    /// Seconds closers get to finish on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_cors_allowed_origins() -> String {
    "*".to_string()
}

fn default_http_ignored_paths() -> String {
    "/health".to_string()
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "morgana".to_string()
}

fn default_postgres_username() -> String {
    "morgana".to_string()
}

fn default_postgres_password() -> String {
    "morgana".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    10
}

fn default_postgres_migrations_dir() -> String {
    "crates/common/migrations".to_string()
}

fn default_postgres_goose_binary_path() -> String {
    "goose".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_public_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_reset_token_ttl_minutes() -> u64 {
    60
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_email_from_address() -> String {
    "Morgana & O.R.U.M. <noreply@morganaorum.it>".to_string()
}

fn default_email_timeout_secs() -> u64 {
    10
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "morgana".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("MORGANA"))
            .build()?
            .try_deserialize()
    }

    /// Whether the JWT secret is still the development default
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }
}
