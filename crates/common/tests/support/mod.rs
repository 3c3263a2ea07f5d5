use common::postgres::{PostgresClient, PostgresConfig};
use goose::MigrationRunner;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

/// A migrated throwaway database. Keep the container alive for the test.
pub struct TestDb {
    pub _container: ContainerAsync<Postgres>,
    pub client: PostgresClient,
}

pub async fn setup_test_db() -> TestDb {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let config = PostgresConfig {
        host: host.to_string(),
        port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
        max_pool_size: 5,
        migrations_dir: format!("{}/migrations", env!("CARGO_MANIFEST_DIR")),
        goose_binary_path: which::which("goose")
            .expect("goose binary not found")
            .to_string_lossy()
            .to_string(),
    };

    MigrationRunner::postgres(
        config.goose_binary_path.clone(),
        config.migrations_dir.clone(),
        config.dsn(),
    )
    .run_migrations()
    .await
    .expect("Migrations failed");

    let client = PostgresClient::new(&config).expect("Failed to create client");
    client.ping().await.expect("Database not reachable");

    TestDb {
        _container: container,
        client,
    }
}
