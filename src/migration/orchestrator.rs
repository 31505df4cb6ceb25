// ABOUTME: Sequences probe, classify, dump, and restore for one migration run
// ABOUTME: Owns both database handles and closes them exactly once on every path

use crate::config::Endpoint;
use crate::database::{probe, Database};
use crate::error::{MigrationError, Result};
use crate::migration::dump::{dump_tables, DumpArtifact, DumpMode};
use crate::migration::restore::restore_artifact;
use crate::tables::{TableClassification, TablePartition};
use crate::tool::ExternalTool;
use std::path::PathBuf;

/// Inputs of a run that do not hold live resources
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub source: Endpoint,
    pub target: Endpoint,
    pub classification: TableClassification,
    pub output_dir: PathBuf,
    pub restore_enabled: bool,
}

/// What a successful run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub partition: TablePartition,
    pub artifacts: Vec<DumpArtifact>,
    pub restored: Vec<PathBuf>,
}

/// Runs one migration.
///
/// The database handles are moved in and released by [`Migrator::run`], which
/// consumes the migrator.
pub struct Migrator<D, T> {
    source_db: D,
    target_db: D,
    tool: T,
    plan: MigrationPlan,
}

impl<D: Database, T: ExternalTool> Migrator<D, T> {
    pub fn new(source_db: D, target_db: D, tool: T, plan: MigrationPlan) -> Self {
        Self {
            source_db,
            target_db,
            tool,
            plan,
        }
    }

    /// Probe, dump, optionally restore, then close both pools.
    ///
    /// The pools are closed whether or not an earlier phase failed.
    pub async fn run(self) -> Result<MigrationReport> {
        let Migrator {
            source_db,
            target_db,
            tool,
            plan,
        } = self;

        let result = execute(&source_db, &target_db, &tool, &plan).await;
        if let Err(e) = &result {
            tracing::error!("Error during migration: {}", e);
        }

        tracing::info!("Closing database connections...");
        source_db.close().await;
        target_db.close().await;

        result
    }
}

async fn execute<D: Database, T: ExternalTool>(
    source_db: &D,
    target_db: &D,
    tool: &T,
    plan: &MigrationPlan,
) -> Result<MigrationReport> {
    // Probe both so both statuses are logged
    let source_ok = probe(source_db).await;
    let target_ok = probe(target_db).await;
    if !source_ok || !target_ok {
        let failed = [(source_ok, source_db.label()), (target_ok, target_db.label())]
            .into_iter()
            .filter(|(ok, _)| !ok)
            .map(|(_, label)| label.to_string())
            .collect();
        return Err(MigrationError::Connectivity { failed });
    }

    let universe = source_db.list_tables().await.map_err(|e| {
        tracing::error!("Error listing source tables: {:#}", e);
        MigrationError::Query(format!("{:#}", e))
    })?;

    let partition = plan.classification.partition(&universe);
    tracing::info!(
        "Classified {} table(s): {} full, {} structure-only",
        universe.len(),
        partition.full.len(),
        partition.structure_only.len()
    );

    tokio::fs::create_dir_all(&plan.output_dir)
        .await
        .map_err(|e| {
            let message = format!("Failed to create output directory: {}", e);
            tracing::error!("{}", message);
            MigrationError::Dump {
                file: plan.output_dir.clone(),
                message,
            }
        })?;

    let mut artifacts = Vec::new();
    for (mode, tables) in [
        (DumpMode::Full, &partition.full),
        (DumpMode::StructureOnly, &partition.structure_only),
    ] {
        if tables.is_empty() {
            tracing::info!("No {} tables to dump, skipping", mode);
            continue;
        }
        tracing::info!("Dumping {} tables...", mode);
        artifacts.push(dump_tables(tool, &plan.source, tables, mode, &plan.output_dir).await?);
    }

    let mut restored = Vec::new();
    if plan.restore_enabled {
        for artifact in &artifacts {
            restore_artifact(tool, &plan.target, artifact).await?;
            restored.push(artifact.path.clone());
        }
    } else {
        tracing::info!("ENABLE_MIGRATE is not TRUE, skipping restore");
    }

    tracing::info!("✓ Migration completed successfully.");

    Ok(MigrationReport {
        partition,
        artifacts,
        restored,
    })
}
