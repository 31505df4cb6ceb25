// ABOUTME: MySQL/MariaDB connection pools for the source and target endpoints
// ABOUTME: Implements the Database trait over mysql_async

pub mod reader;

use crate::config::{Endpoint, EndpointRole};
use crate::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mysql_async::{Opts, OptsBuilder, Pool};

/// Build connection options for an endpoint
pub fn endpoint_opts(endpoint: &Endpoint) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(endpoint.host.as_str())
        .tcp_port(endpoint.port)
        .user(Some(endpoint.user.as_str()))
        .pass(Some(endpoint.password.as_str()))
        .db_name(Some(endpoint.database.as_str()))
        .into()
}

/// A lazily-connecting pool for one endpoint.
///
/// Creating the pool opens no connection; the first `ping` or query does.
pub struct MysqlDatabase {
    role: EndpointRole,
    database: String,
    pool: Pool,
}

impl MysqlDatabase {
    pub fn new(role: EndpointRole, endpoint: &Endpoint) -> Self {
        tracing::info!(
            "Using connection for {}: {}",
            role,
            endpoint.redacted()
        );

        Self {
            role,
            database: endpoint.database.clone(),
            pool: Pool::new(endpoint_opts(endpoint)),
        }
    }
}

#[async_trait]
impl Database for MysqlDatabase {
    fn label(&self) -> &str {
        self.role.label()
    }

    async fn ping(&self) -> Result<()> {
        let conn = self
            .pool
            .get_conn()
            .await
            .context("Failed to acquire a pooled connection")?;
        drop(conn);
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut conn = self
            .pool
            .get_conn()
            .await
            .with_context(|| format!("Failed to connect to {} database", self.role))?;
        let tables = reader::list_tables(&mut conn, &self.database).await?;
        drop(conn);
        Ok(tables)
    }

    async fn close(self) {
        match self.pool.disconnect().await {
            Ok(()) => tracing::debug!("Closed {} connection pool", self.role),
            Err(e) => tracing::warn!("Error closing {} connection pool: {}", self.role, e),
        }
    }
}
