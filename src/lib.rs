// ABOUTME: Library module for mysqldump-migrator
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod migration;
pub mod mysql;
pub mod tables;
pub mod tool;
pub mod utils;

pub use error::MigrationError;
