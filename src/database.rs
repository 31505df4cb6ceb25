// ABOUTME: Database handle trait used by the orchestrator
// ABOUTME: Also hosts the connectivity probe that gates every run

use anyhow::Result;
use async_trait::async_trait;

/// A pooled connection to one endpoint.
///
/// `close` takes `self` so a handle can only be released once.
#[async_trait]
pub trait Database: Send + Sync {
    /// Short name for logs ("source", "target")
    fn label(&self) -> &str;

    /// Acquire one connection and give it straight back.
    async fn ping(&self) -> Result<()>;

    /// Table names of the connected database, in server order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Release the pool.
    async fn close(self);
}

/// Check that a database is reachable.
///
/// Failures are logged and reported as `false`; nothing is raised.
pub async fn probe<D: Database>(db: &D) -> bool {
    tracing::info!("Attempting to connect to {} database...", db.label());
    match db.ping().await {
        Ok(()) => {
            tracing::info!("✓ Connected to {} database", db.label());
            true
        }
        Err(e) => {
            tracing::error!("Error connecting to {} database: {:#}", db.label(), e);
            false
        }
    }
}
