// ABOUTME: Migration module
// ABOUTME: Dump/restore wrappers around the MySQL client tools and the run orchestrator

pub mod dump;
pub mod orchestrator;
pub mod restore;

pub use dump::{build_dump_invocation, dump_tables, DumpArtifact, DumpMode};
pub use orchestrator::{MigrationPlan, MigrationReport, Migrator};
pub use restore::{build_restore_invocation, restore_artifact};
