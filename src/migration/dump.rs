// ABOUTME: Wrapper for the mysqldump command to export source tables
// ABOUTME: Builds full-row and structure-only dumps appended to the output directory

use crate::config::Endpoint;
use crate::error::{MigrationError, Result};
use crate::tool::{ExternalTool, Redirect, ToolInvocation};
use crate::utils;
use anyhow::{bail, Context};
use std::fmt;
use std::path::{Path, PathBuf};

pub const FULL_DUMP_FILE: &str = "full.sql";
pub const STRUCTURE_DUMP_FILE: &str = "structure.sql";

/// What a dump contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    /// Schema plus rows, with column names on every INSERT
    Full,
    /// Schema only
    StructureOnly,
}

impl DumpMode {
    pub fn mode_flag(self) -> &'static str {
        match self {
            DumpMode::Full => "--complete-insert",
            DumpMode::StructureOnly => "--no-data",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DumpMode::Full => FULL_DUMP_FILE,
            DumpMode::StructureOnly => STRUCTURE_DUMP_FILE,
        }
    }
}

impl fmt::Display for DumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpMode::Full => f.write_str("full"),
            DumpMode::StructureOnly => f.write_str("structure"),
        }
    }
}

/// A dump file produced during this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpArtifact {
    pub path: PathBuf,
    pub mode: DumpMode,
}

/// Build the mysqldump command line for a set of tables.
///
/// ```text
/// mysqldump --host=H --port=P --user=U --password=PW DB <mode> --skip-lock-tables t1 t2 >> out/file
/// ```
///
/// An empty table list is refused: mysqldump would dump the whole database.
pub fn build_dump_invocation(
    source: &Endpoint,
    tables: &[String],
    mode: DumpMode,
    output: &Path,
) -> anyhow::Result<ToolInvocation> {
    if tables.is_empty() {
        bail!("Refusing to run mysqldump with an empty table list");
    }
    for table in tables {
        utils::validate_table_name(table)?;
    }

    Ok(ToolInvocation::new("mysqldump")
        .arg(format!("--host={}", source.host))
        .arg(format!("--port={}", source.port))
        .arg(format!("--user={}", source.user))
        .arg(format!("--password={}", source.password))
        .arg(source.database.as_str())
        .arg(mode.mode_flag())
        .arg("--skip-lock-tables")
        .args(tables.iter().map(String::as_str))
        .redirect(Redirect::AppendStdout(output.to_path_buf())))
}

/// Dump `tables` from the source into `<output_dir>/<mode file>`.
///
/// Output is appended; an existing file from an earlier run keeps its content.
pub async fn dump_tables<T: ExternalTool + ?Sized>(
    tool: &T,
    source: &Endpoint,
    tables: &[String],
    mode: DumpMode,
    output_dir: &Path,
) -> Result<DumpArtifact> {
    let path = output_dir.join(mode.file_name());
    tracing::info!(
        "Dumping {} table(s) ({}) to {}",
        tables.len(),
        mode,
        path.display()
    );

    let fail = |message: String| {
        tracing::error!("Error executing dump command: {}", message);
        MigrationError::Dump {
            file: path.clone(),
            message,
        }
    };

    let invocation = build_dump_invocation(source, tables, mode, &path)
        .context("Invalid dump request")
        .map_err(|e| fail(format!("{:#}", e)))?;

    let output = tool
        .run(&invocation)
        .await
        .map_err(|e| fail(format!("{:#}", e)))?;

    if !output.success() {
        return Err(fail(output.failure_summary()));
    }

    tracing::info!("✓ Dump of {} completed successfully", tables.join(", "));

    Ok(DumpArtifact { path, mode })
}
