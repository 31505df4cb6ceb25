// ABOUTME: Command implementations behind the CLI
// ABOUTME: Exports migrate and validate

pub mod migrate;
pub mod validate;

pub use migrate::migrate;
pub use validate::validate;
