use anyhow::Result;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::debug;

use super::PostgresConfig;

/// Pooled PostgreSQL connections shared by every repository
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
}

impl PostgresClient {
    pub fn new(config: &PostgresConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.database.clone());
        cfg.user = Some(config.username.clone());
        cfg.password = Some(config.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        pool.resize(config.max_pool_size);

        Ok(Self { pool })
    }

    pub async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        debug!("postgreSQL connection successful");
        Ok(())
    }

    pub async fn get_connection(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }
}
