//! HTTP server bootstrap shared by the API binary.
//!
//! ```ignore
//! let config = HttpServerConfig {
//!     port: 8080,
//!     cors_config: CorsConfig::from_comma_separated("https://morganaorum.it"),
//!     ..Default::default()
//! };
//! run_http_server(config, router, cancellation_token).await?;
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use http::{header, Method};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info};

use super::{HttpLoggingConfig, HttpLoggingLayer, HttpTracingLayer};

/// Allowed browser origins for the admin and public frontends
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `["*"]` allows any origin, without credentials
    pub allowed_origins: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    pub fn from_comma_separated(origins: &str) -> Self {
        let allowed_origins: Vec<String> = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed_origins.is_empty() {
            return Self::default();
        }
        Self {
            allowed_origins,
            ..Self::default()
        }
    }

    fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub logging_config: HttpLoggingConfig,
    pub cors_config: CorsConfig,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            logging_config: HttpLoggingConfig::default(),
            cors_config: CorsConfig::default(),
        }
    }
}

/// Session cookies need credentialed CORS, which browsers refuse with a
/// wildcard origin. Wildcard mode therefore only serves the public API.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.max_age_secs));

    if config.allows_any() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(
                config
                    .allowed_origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok()),
            ))
            .allow_credentials(true)
    }
}

/// Apply the tracing, logging and CORS layers to a router
pub fn with_http_layers(router: Router, config: &HttpServerConfig) -> Router {
    router
        .layer(build_cors_layer(&config.cors_config))
        .layer(HttpLoggingLayer::new(config.logging_config.clone()))
        .layer(HttpTracingLayer::new())
}

/// Serve `router` until `cancellation_token` fires, then drain in-flight requests.
pub async fn run_http_server(
    config: HttpServerConfig,
    router: Router,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid server address {}:{}", config.host, config.port))?;

    let app = with_http_layers(router, &config);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancellation_token.cancelled().await;
            debug!("HTTP server shutdown signal received");
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_from_comma_separated() {
        let config = CorsConfig::from_comma_separated(
            "https://morganaorum.it, https://admin.morganaorum.it,",
        );
        assert_eq!(
            config.allowed_origins,
            vec!["https://morganaorum.it", "https://admin.morganaorum.it"]
        );
        assert!(!config.allows_any());
    }

    #[test]
    fn test_empty_origins_fall_back_to_wildcard() {
        let config = CorsConfig::from_comma_separated(" , ");
        assert!(config.allows_any());
    }

    #[tokio::test]
    async fn test_server_stops_on_cancellation() {
        let token = CancellationToken::new();
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };
        let handle = tokio::spawn(run_http_server(config, Router::new(), token.clone()));
        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
