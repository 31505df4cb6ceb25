// ABOUTME: Validation helpers shared by the CLI and the command builders
// ABOUTME: Table-name checks, endpoint distinctness, and client tool discovery

use crate::config::Endpoint;
use anyhow::{bail, Result};
use which::which;

/// MySQL identifier length limit
const MAX_TABLE_NAME_LEN: usize = 64;

/// Validate a table name before it is passed to mysqldump.
///
/// Table names reach the tool as individual argv entries, so shell syntax is
/// harmless. What still matters:
/// - 1-64 characters
/// - no control characters
/// - no leading `-`, which mysqldump would parse as an option
///
/// # Examples
///
/// ```
/// # use mysqldump_migrator::utils::validate_table_name;
/// assert!(validate_table_name("orders").is_ok());
/// assert!(validate_table_name("order items; rm -rf /").is_ok());
/// assert!(validate_table_name("--all-databases").is_err());
/// assert!(validate_table_name("").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Table name cannot be empty or whitespace-only");
    }

    let length = name.chars().count();
    if length > MAX_TABLE_NAME_LEN {
        bail!(
            "Table name '{}' exceeds maximum length of {} characters (got {})",
            sanitize_identifier(name),
            MAX_TABLE_NAME_LEN,
            length
        );
    }

    if let Some((i, c)) = name.char_indices().find(|(_, c)| c.is_control()) {
        bail!(
            "Table name '{}' contains control character \\x{:02x} at position {}",
            sanitize_identifier(name),
            c as u32,
            i
        );
    }

    if name.starts_with('-') {
        bail!(
            "Table name '{}' starts with '-' and would be read as a mysqldump option",
            sanitize_identifier(name)
        );
    }

    Ok(())
}

/// Sanitize an identifier for display
///
/// Removes control characters and limits length to prevent log injection.
///
/// ```
/// # use mysqldump_migrator::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("table\nname"), "tablename");
/// assert_eq!(sanitize_identifier(&"a".repeat(200)).len(), 100);
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Refuse a restore whose target is the source itself.
///
/// Endpoints match when host (case-insensitive), port and database are equal.
/// The user is ignored: a different account on the same schema is still the
/// same data.
pub fn validate_source_target_different(source: &Endpoint, target: &Endpoint) -> Result<()> {
    if source.host.eq_ignore_ascii_case(&target.host)
        && source.port == target.port
        && source.database == target.database
    {
        bail!(
            "Source and target point to the same database!\n\
             \n\
             Restoring the dump would overwrite the source itself.\n\
             \n\
             Source: {}\n\
             Target: {}\n\
             \n\
             Check DB_*_SOURCE and DB_*_TARGET, or unset ENABLE_MIGRATE to only dump.",
            source.redacted(),
            target.redacted()
        );
    }

    Ok(())
}

/// Check that the MySQL client tools this run needs are on PATH.
pub fn check_required_tools(tools: &[&str]) -> Result<()> {
    let missing: Vec<&str> = tools
        .iter()
        .copied()
        .filter(|tool| which(tool).is_err())
        .collect();

    if !missing.is_empty() {
        bail!(
            "Missing required MySQL client tools: {}\n\
             \n\
             Please install the MySQL or MariaDB client:\n\
             - Ubuntu/Debian: sudo apt-get install mariadb-client\n\
             - macOS: brew install mysql-client\n\
             - RHEL/CentOS: sudo yum install mariadb",
            missing.join(", ")
        );
    }

    Ok(())
}
