//! Store configuration loaded from the environment
//!
//! Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! ## Keys
//! - `FLIGHTKEY_SHARED_DIR`: directory both processes can reach (unset means process-local only)
//! - `FLIGHTKEY_NAMESPACE`: prefix for the table files inside the shared directory
//!   (ASCII alphanumerics, `-` and `_` only)
//! - `FLIGHTKEY_AIRLINE_PREFIX`: airline designator used to repair flight numbers
//! - `FLIGHTKEY_ROLE`: `roster` or `logbook`

use std::path::PathBuf;

use crate::errors::{SharedError, SharedResult};
use crate::types::ProcessRole;

pub const ENV_SHARED_DIR: &str = "FLIGHTKEY_SHARED_DIR";
pub const ENV_NAMESPACE: &str = "FLIGHTKEY_NAMESPACE";
pub const ENV_AIRLINE_PREFIX: &str = "FLIGHTKEY_AIRLINE_PREFIX";
pub const ENV_ROLE: &str = "FLIGHTKEY_ROLE";

pub const DEFAULT_NAMESPACE: &str = "flightkey";
pub const DEFAULT_AIRLINE_PREFIX: &str = "CX";

/// Configuration for opening a reconciliation store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Shared directory; `None` runs process-local only
    pub shared_dir: Option<PathBuf>,
    pub namespace: String,
    pub airline_prefix: String,
    pub role: ProcessRole,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shared_dir: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            airline_prefix: DEFAULT_AIRLINE_PREFIX.to_string(),
            role: ProcessRole::Roster,
        }
    }
}

impl StoreConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> SharedResult<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_SHARED_DIR).filter(|v| !v.trim().is_empty()) {
            config.shared_dir = Some(PathBuf::from(dir.trim()));
        }

        if let Some(namespace) = lookup(ENV_NAMESPACE).filter(|v| !v.trim().is_empty()) {
            let trimmed = namespace.trim();
            if !is_valid_namespace(trimmed) {
                return Err(SharedError::InvalidConfig {
                    field: ENV_NAMESPACE.to_string(),
                    value: namespace.clone(),
                });
            }
            config.namespace = trimmed.to_string();
        }

        if let Some(prefix) = lookup(ENV_AIRLINE_PREFIX) {
            config.airline_prefix = validate_prefix(&prefix)?;
        }

        if let Some(role) = lookup(ENV_ROLE) {
            config.role = ProcessRole::parse(&role).ok_or_else(|| SharedError::InvalidConfig {
                field: ENV_ROLE.to_string(),
                value: role.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn with_shared_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shared_dir = Some(dir.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the airline prefix (uppercased, not validated)
    pub fn with_airline_prefix(mut self, prefix: &str) -> Self {
        self.airline_prefix = prefix.trim().to_uppercase();
        self
    }

    pub fn with_role(mut self, role: ProcessRole) -> Self {
        self.role = role;
        self
    }
}

/// Namespaces become file name prefixes, so path separators and dots are out
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn validate_prefix(prefix: &str) -> SharedResult<String> {
    let trimmed = prefix.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SharedError::InvalidConfig {
            field: ENV_AIRLINE_PREFIX.to_string(),
            value: prefix.to_string(),
        });
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = StoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert!(config.shared_dir.is_none());
        assert_eq!(config.airline_prefix, "CX");
    }

    #[test]
    fn test_reads_all_keys() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_SHARED_DIR, "/tmp/group"),
            (ENV_NAMESPACE, "crew"),
            (ENV_AIRLINE_PREFIX, " ka "),
            (ENV_ROLE, "logbook"),
        ]))
        .unwrap();

        assert_eq!(config.shared_dir, Some(PathBuf::from("/tmp/group")));
        assert_eq!(config.namespace, "crew");
        assert_eq!(config.airline_prefix, "KA");
        assert_eq!(config.role, ProcessRole::Logbook);
    }

    #[test]
    fn test_rejects_bad_prefix_and_role() {
        let bad_prefix = StoreConfig::from_lookup(lookup_from(&[(ENV_AIRLINE_PREFIX, "C|X")]));
        assert!(matches!(bad_prefix, Err(SharedError::InvalidConfig { .. })));

        let empty_prefix = StoreConfig::from_lookup(lookup_from(&[(ENV_AIRLINE_PREFIX, "  ")]));
        assert!(empty_prefix.is_err());

        let bad_role = StoreConfig::from_lookup(lookup_from(&[(ENV_ROLE, "widget")]));
        assert!(
            matches!(bad_role, Err(SharedError::InvalidConfig { field, .. }) if field == ENV_ROLE)
        );
    }

    #[test]
    fn test_rejects_namespace_that_leaves_the_directory() {
        for value in ["../escape", "a/b", "..", "a\\b", "crew.v2"] {
            let result = StoreConfig::from_lookup(lookup_from(&[(ENV_NAMESPACE, value)]));
            assert!(
                matches!(&result, Err(SharedError::InvalidConfig { field, .. }) if field == ENV_NAMESPACE),
                "{value} accepted"
            );
        }

        let config =
            StoreConfig::from_lookup(lookup_from(&[(ENV_NAMESPACE, " crew_roster-2 ")])).unwrap();
        assert_eq!(config.namespace, "crew_roster-2");
    }

    #[test]
    fn test_blank_shared_dir_is_ignored() {
        let config = StoreConfig::from_lookup(lookup_from(&[(ENV_SHARED_DIR, "   ")])).unwrap();
        assert!(config.shared_dir.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = StoreConfig::default()
            .with_shared_dir("/srv/shared")
            .with_namespace("ns")
            .with_airline_prefix("ka")
            .with_role(ProcessRole::Logbook);
        assert_eq!(config.shared_dir, Some(PathBuf::from("/srv/shared")));
        assert_eq!(config.namespace, "ns");
        assert_eq!(config.airline_prefix, "KA");
        assert_eq!(config.role, ProcessRole::Logbook);
    }
}
