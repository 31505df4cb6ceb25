// ABOUTME: Migrate command: wires configuration, pools, and mysqldump into a run
// ABOUTME: Config problems fail here, before any connection is opened

use crate::commands::validate::check_environment;
use crate::config::{self, EndpointRole, EnvConfig};
use crate::error::{MigrationError, Result};
use crate::migration::{MigrationPlan, MigrationReport, Migrator};
use crate::mysql::MysqlDatabase;
use crate::tool::SystemTool;
use std::path::PathBuf;

pub const DEFAULT_TABLES_CONFIG: &str = "tables.json";
pub const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub tables_config: PathBuf,
    pub output_dir: PathBuf,
    pub env_file: Option<PathBuf>,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            tables_config: PathBuf::from(DEFAULT_TABLES_CONFIG),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            env_file: None,
        }
    }
}

/// Run a full migration with the real MySQL pools and client tools.
pub async fn migrate(options: &MigrateOptions) -> Result<MigrationReport> {
    config::load_env_file(options.env_file.as_deref()).map_err(MigrationError::config)?;

    let classification =
        config::load_table_classification(&options.tables_config).map_err(MigrationError::config)?;
    tracing::info!(
        "Loaded {} structure-only table(s) from {}",
        classification.len(),
        options.tables_config.display()
    );

    let env = EnvConfig::from_env().map_err(MigrationError::config)?;
    check_environment(&env)?;

    let source_db = MysqlDatabase::new(EndpointRole::Source, &env.source);
    let target_db = MysqlDatabase::new(EndpointRole::Target, &env.target);

    let plan = MigrationPlan {
        source: env.source,
        target: env.target,
        classification,
        output_dir: options.output_dir.clone(),
        restore_enabled: env.migrate_enabled,
    };

    Migrator::new(source_db, target_db, SystemTool, plan)
        .run()
        .await
}
