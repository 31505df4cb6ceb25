// ABOUTME: Loads endpoints, the migrate toggle, and the table classification file
// ABOUTME: Reads DB_*_SOURCE / DB_*_TARGET from the environment, seeded by .env

use crate::tables::TableClassification;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Value of `ENABLE_MIGRATE` that turns the restore phase on.
pub const MIGRATE_ENABLED_TOKEN: &str = "TRUE";

/// Which side of the migration an endpoint describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl EndpointRole {
    fn env_suffix(self) -> &'static str {
        match self {
            EndpointRole::Source => "SOURCE",
            EndpointRole::Target => "TARGET",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EndpointRole::Source => "source",
            EndpointRole::Target => "target",
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Connection parameters for one database
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Endpoint {
    /// Read an endpoint from the process environment.
    pub fn from_env(role: EndpointRole) -> Result<Self> {
        Self::from_lookup(role, |key| std::env::var(key).ok())
    }

    /// Build an endpoint from an arbitrary variable lookup.
    ///
    /// Host, user and database are required. Port defaults to 3306 and
    /// password defaults to empty.
    pub fn from_lookup<F>(role: EndpointRole, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let suffix = role.env_suffix();
        let var = |name: &str| format!("DB_{}_{}", name, suffix);

        let required = |name: &str| -> Result<String> {
            let key = var(name);
            match lookup(&key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => bail!("{} is not set ({} database)", key, role),
            }
        };

        let port = match lookup(&var("PORT")) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u16>().with_context(|| {
                format!("{} must be a port number, got '{}'", var("PORT"), raw)
            })?,
            _ => DEFAULT_MYSQL_PORT,
        };

        Ok(Self {
            host: required("HOST")?,
            port,
            user: required("USER")?,
            password: lookup(&var("PASSWORD")).unwrap_or_default(),
            database: required("DATABASE")?,
        })
    }

    /// `user:***@host:port/database`, safe for logs
    pub fn redacted(&self) -> String {
        format!(
            "{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Everything read from the environment for one run
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub source: Endpoint,
    pub target: Endpoint,
    pub migrate_enabled: bool,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            source: Endpoint::from_lookup(EndpointRole::Source, &lookup)?,
            target: Endpoint::from_lookup(EndpointRole::Target, &lookup)?,
            migrate_enabled: migrate_enabled(lookup("ENABLE_MIGRATE").as_deref()),
        })
    }
}

/// Only the exact token enables restores; case and whitespace matter.
pub fn migrate_enabled(value: Option<&str>) -> bool {
    value == Some(MIGRATE_ENABLED_TOKEN)
}

/// Seed the process environment from a `.env` file.
///
/// An explicit path must exist. Without one, `.env` in the working directory
/// is loaded if present. Variables already set are left untouched.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file at {}", path.display()))?;
            tracing::debug!("Loaded environment from {}", path.display());
        }
        None => {
            if let Ok(found) = dotenv::dotenv() {
                tracing::debug!("Loaded environment from {}", found.display());
            }
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ClassificationFile {
    structure_only: Vec<String>,
}

/// Load `{ "structure_only": [...] }` from a JSON file.
///
/// A missing file, malformed JSON, or a missing `structure_only` key is an
/// error.
pub fn load_table_classification(path: &Path) -> Result<TableClassification> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table config at {}", path.display()))?;
    let parsed: ClassificationFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON table config at {}", path.display()))?;

    let mut structure_only = BTreeSet::new();
    for table in parsed.structure_only {
        crate::utils::validate_table_name(&table)
            .with_context(|| format!("Invalid structure_only entry in {}", path.display()))?;
        structure_only.insert(table);
    }

    Ok(TableClassification::new(structure_only))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        vars(&[
            ("DB_HOST_SOURCE", "src.internal"),
            ("DB_PORT_SOURCE", "3307"),
            ("DB_USER_SOURCE", "reader"),
            ("DB_PASSWORD_SOURCE", "s3cret"),
            ("DB_DATABASE_SOURCE", "shop"),
            ("DB_HOST_TARGET", "dst.internal"),
            ("DB_USER_TARGET", "writer"),
            ("DB_PASSWORD_TARGET", "hunter2"),
            ("DB_DATABASE_TARGET", "shop_copy"),
        ])
    }

    #[test]
    fn reads_both_endpoints() {
        let env = full_env();
        let config = EnvConfig::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.source.host, "src.internal");
        assert_eq!(config.source.port, 3307);
        assert_eq!(config.source.user, "reader");
        assert_eq!(config.source.password, "s3cret");
        assert_eq!(config.source.database, "shop");

        assert_eq!(config.target.host, "dst.internal");
        assert_eq!(config.target.port, DEFAULT_MYSQL_PORT);
        assert_eq!(config.target.database, "shop_copy");
        assert!(!config.migrate_enabled);
    }

    #[test]
    fn missing_required_variable_is_named() {
        let mut env = full_env();
        env.remove("DB_DATABASE_TARGET");

        let err = EnvConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("DB_DATABASE_TARGET"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut env = full_env();
        env.insert("DB_PORT_SOURCE".to_string(), "mysql".to_string());

        let err = EnvConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("DB_PORT_SOURCE"));
    }

    #[test]
    fn missing_password_defaults_to_empty() {
        let mut env = full_env();
        env.remove("DB_PASSWORD_SOURCE");

        let endpoint = Endpoint::from_lookup(EndpointRole::Source, |k| env.get(k).cloned()).unwrap();
        assert_eq!(endpoint.password, "");
    }

    #[test]
    fn migrate_requires_exact_token() {
        assert!(migrate_enabled(Some("TRUE")));
        assert!(!migrate_enabled(None));
        assert!(!migrate_enabled(Some("true")));
        assert!(!migrate_enabled(Some("1")));
        assert!(!migrate_enabled(Some(" TRUE")));
        assert!(!migrate_enabled(Some("")));
    }

    #[test]
    fn enable_migrate_is_read_from_lookup() {
        let mut env = full_env();
        env.insert("ENABLE_MIGRATE".to_string(), "TRUE".to_string());

        let config = EnvConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert!(config.migrate_enabled);
    }

    #[test]
    fn redacted_and_debug_hide_password() {
        let env = full_env();
        let endpoint = Endpoint::from_lookup(EndpointRole::Source, |k| env.get(k).cloned()).unwrap();

        assert_eq!(endpoint.redacted(), "reader:***@src.internal:3307/shop");
        assert!(!format!("{:?}", endpoint).contains("s3cret"));
    }

    #[test]
    fn parse_classification_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{ "structure_only": ["audit_log", "sessions", "audit_log"] }}"#
        )
        .unwrap();

        let classification = load_table_classification(tmp.path()).unwrap();
        assert_eq!(classification.len(), 2);
        assert!(classification.is_structure_only("audit_log"));
        assert!(classification.is_structure_only("sessions"));
        assert!(!classification.is_structure_only("orders"));
    }

    #[test]
    fn empty_structure_only_list_is_valid() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "structure_only": [] }}"#).unwrap();

        let classification = load_table_classification(tmp.path()).unwrap();
        assert!(classification.is_empty());
    }

    #[test]
    fn malformed_classification_file_is_an_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{{ structure_only: ").unwrap();

        let err = load_table_classification(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn missing_structure_only_key_is_an_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "tables": [] }}"#).unwrap();

        assert!(load_table_classification(tmp.path()).is_err());
    }

    #[test]
    fn missing_classification_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table_classification(&dir.path().join("tables.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read table config"));
    }

    #[test]
    fn missing_explicit_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(Some(&dir.path().join("nope.env"))).is_err());
    }
}
