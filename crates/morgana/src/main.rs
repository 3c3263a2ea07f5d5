mod config;

use std::sync::Arc;
use std::time::Duration;

use common::auth::{
    AccessPolicy, Argon2PasswordService, CryptoResetTokenProvider, DepartmentKeywordMap,
    JwtAuthTokenProvider, JwtConfig, PasswordResetConfig, TokenSessionResolver,
};
use common::email::{email_sender_from_config, EmailConfig, EmailSender};
use common::http::{CorsConfig, HttpLoggingConfig, HttpServerConfig};
use common::postgres::{
    PostgresAnalyticsRepository, PostgresClient, PostgresConfig, PostgresConventionRepository,
    PostgresEventRepository, PostgresNewsRepository, PostgresNewsletterRepository,
    PostgresPasswordResetTokenRepository, PostgresRepresentativeRepository,
    PostgresUserRepository,
};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use crate::config::ServiceConfig;
use goose::MigrationRunner;
use morgana_api::domain::{
    AnalyticsService, ConventionService, EventService, NewsService, NewsletterService,
    RepresentativeService, UserService,
};
use morgana_api::http::AppState;
use morgana_api::morgana_api::MorganaApi;
use morgana_runner::Runner;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        http_port = config.http_port,
        "Starting morgana service"
    );
    if config.uses_default_jwt_secret() {
        warn!("MORGANA_JWT_SECRET is not set, using the development secret");
    }

    let state = match build_app_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize dependencies: {:#}", e);
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    let http_config = HttpServerConfig {
        host: config.http_host.clone(),
        port: config.http_port,
        logging_config: HttpLoggingConfig::new(split_comma_separated(&config.http_ignored_paths)),
        cors_config: CorsConfig::from_comma_separated(&config.cors_allowed_origins),
    };
    let api = MorganaApi::new(state, http_config);

    let result = Runner::new()
        .with_named_process("morgana_api", api.into_runner_process())
        .with_closer(move || async move {
            info!("Flushing telemetry");
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(config.shutdown_timeout_secs))
        .run()
        .await;

    if let Err(e) = result {
        eprintln!("morgana stopped with an error: {:#}", e);
        std::process::exit(1);
    }
}

async fn build_app_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    info!("Initializing PostgreSQL...");
    let postgres_config = PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        max_pool_size: config.postgres_max_pool_size,
        migrations_dir: config.postgres_migrations_dir.clone(),
        goose_binary_path: config.postgres_goose_binary_path.clone(),
    };
    MigrationRunner::postgres(
        postgres_config.goose_binary_path.clone(),
        postgres_config.migrations_dir.clone(),
        postgres_config.dsn(),
    )
    .run_migrations()
    .await?;

    let client = PostgresClient::new(&postgres_config)?;
    client.ping().await?;

    let users = Arc::new(PostgresUserRepository::new(client.clone()));
    let reset_tokens = Arc::new(PostgresPasswordResetTokenRepository::new(client.clone()));
    let representatives = Arc::new(PostgresRepresentativeRepository::new(client.clone()));
    let conventions = Arc::new(PostgresConventionRepository::new(client.clone()));
    let events = Arc::new(PostgresEventRepository::new(client.clone()));
    let news = Arc::new(PostgresNewsRepository::new(client.clone()));
    let newsletter = Arc::new(PostgresNewsletterRepository::new(client.clone()));
    let analytics = Arc::new(PostgresAnalyticsRepository::new(client));

    let keywords = match &config.department_keywords_json {
        Some(json) => DepartmentKeywordMap::from_json(json)?,
        None => DepartmentKeywordMap::builtin(),
    };
    let policy = Arc::new(AccessPolicy::new(keywords));
    debug!("access policy loaded");

    let email_sender: Arc<dyn EmailSender> = email_sender_from_config(&EmailConfig {
        api_url: config.email_api_url.clone(),
        api_key: config.email_api_key.clone(),
        from_address: config.email_from_address.clone(),
        timeout_secs: config.email_timeout_secs,
    })?;

    let token_provider = Arc::new(JwtAuthTokenProvider::new(JwtConfig::new(
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    )));

    let user_service = Arc::new(UserService::new(
        users.clone(),
        reset_tokens,
        token_provider.clone(),
        Arc::new(CryptoResetTokenProvider::new()),
        Arc::new(Argon2PasswordService::new()),
        email_sender.clone(),
        PasswordResetConfig::new(config.public_base_url.clone(), config.reset_token_ttl_minutes),
    ));

    Ok(AppState {
        user_service,
        representative_service: Arc::new(RepresentativeService::new(
            representatives,
            policy.clone(),
        )),
        convention_service: Arc::new(ConventionService::new(conventions, policy.clone())),
        event_service: Arc::new(EventService::new(
            events.clone(),
            events,
            email_sender,
            policy.clone(),
        )),
        news_service: Arc::new(NewsService::new(news, policy)),
        newsletter_service: Arc::new(NewsletterService::new(newsletter)),
        analytics_service: Arc::new(AnalyticsService::new(analytics)),
        session_resolver: Arc::new(TokenSessionResolver::new(token_provider, users)),
        secure_cookies: config.secure_cookies,
    })
}

fn split_comma_separated(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
