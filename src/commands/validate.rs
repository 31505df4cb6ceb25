// ABOUTME: Validate command: pre-flight checks and connectivity probes only
// ABOUTME: Shares its environment checks with the migrate command

use crate::config::{self, EndpointRole, EnvConfig};
use crate::database::{probe, Database};
use crate::error::{MigrationError, Result};
use crate::mysql::MysqlDatabase;
use crate::utils;
use std::path::Path;

/// Client tools a run needs on PATH
pub fn required_tools(restore_enabled: bool) -> Vec<&'static str> {
    if restore_enabled {
        vec!["mysqldump", "mysql"]
    } else {
        vec!["mysqldump"]
    }
}

/// Checks that need no network access
pub fn check_environment(env: &EnvConfig) -> Result<()> {
    utils::check_required_tools(&required_tools(env.migrate_enabled))
        .map_err(MigrationError::config)?;

    if env.migrate_enabled {
        utils::validate_source_target_different(&env.source, &env.target)
            .map_err(MigrationError::config)?;
    }

    Ok(())
}

/// Load configuration, check tools, and probe both endpoints.
pub async fn validate(env_file: Option<&Path>) -> Result<()> {
    config::load_env_file(env_file).map_err(MigrationError::config)?;
    let env = EnvConfig::from_env().map_err(MigrationError::config)?;

    tracing::info!("Validating migration environment");
    tracing::info!(
        "Restore phase: {}",
        if env.migrate_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    check_environment(&env)?;
    tracing::info!("✓ Required client tools found");

    let source_db = MysqlDatabase::new(EndpointRole::Source, &env.source);
    let target_db = MysqlDatabase::new(EndpointRole::Target, &env.target);

    let source_ok = probe(&source_db).await;
    let target_ok = probe(&target_db).await;

    source_db.close().await;
    target_db.close().await;

    let mut failed = Vec::new();
    if !source_ok {
        failed.push(EndpointRole::Source.label().to_string());
    }
    if !target_ok {
        failed.push(EndpointRole::Target.label().to_string());
    }
    if !failed.is_empty() {
        return Err(MigrationError::Connectivity { failed });
    }

    tracing::info!("✓ Source and target are reachable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_needs_the_mysql_client() {
        assert_eq!(required_tools(false), vec!["mysqldump"]);
        assert_eq!(required_tools(true), vec!["mysqldump", "mysql"]);
    }
}
