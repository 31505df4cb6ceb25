// ABOUTME: Phase-typed error for a migration run
// ABOUTME: Maps each failing phase to a log message and a process exit code

use std::path::PathBuf;
use thiserror::Error;

/// Errors that terminate a migration run.
///
/// Helpers lower in the stack return `anyhow::Result`; the orchestrator
/// converts those into one of these variants so `main` can pick an exit code.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Bad environment, classification file, missing tools, or source == target
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or both endpoints failed the connectivity probe
    #[error("Connectivity check failed for: {}", .failed.join(", "))]
    Connectivity { failed: Vec<String> },

    /// Listing tables on the source failed
    #[error("Failed to list source tables: {0}")]
    Query(String),

    /// mysqldump could not be spawned or exited non-zero
    #[error("Dump into {} failed: {message}", .file.display())]
    Dump { file: PathBuf, message: String },

    /// mysql could not be spawned or exited non-zero
    #[error("Restore from {} failed: {message}", .file.display())]
    Restore { file: PathBuf, message: String },
}

impl MigrationError {
    /// Process exit status for this failure.
    ///
    /// A failed probe exits with 1; everything else exits with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrationError::Connectivity { .. } => 1,
            _ => 2,
        }
    }

    pub(crate) fn config(err: anyhow::Error) -> Self {
        MigrationError::Config(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
