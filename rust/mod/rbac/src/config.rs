//! Module configuration.
//!
//! Read from a TOML file; every key is optional:
//!
//! ```toml
//! [tables]
//! users = "accounts"
//! role_users = "account_roles"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RbacError;

/// Table names for the entities and pivots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub users: String,
    pub roles: String,
    pub permissions: String,
    /// Pivot: user <-> role.
    pub role_users: String,
    /// Pivot: role <-> permission.
    pub role_permissions: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            roles: "roles".to_string(),
            permissions: "permissions".to_string(),
            role_users: "role_users".to_string(),
            role_permissions: "role_permissions".to_string(),
        }
    }
}

impl Tables {
    fn names(&self) -> [(&'static str, &str); 5] {
        [
            ("users", self.users.as_str()),
            ("roles", self.roles.as_str()),
            ("permissions", self.permissions.as_str()),
            ("role_users", self.role_users.as_str()),
            ("role_permissions", self.role_permissions.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    pub tables: Tables,
}

impl RbacConfig {
    /// Load config from disk, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, RbacError> {
        if !path.exists() {
            debug!("rbac config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| RbacError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, RbacError> {
        let config: RbacConfig =
            toml::from_str(content).map_err(|e| RbacError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Table names are spliced into SQL text, so they must be plain identifiers.
    pub fn validate(&self) -> Result<(), RbacError> {
        for (key, name) in self.tables.names() {
            if !is_identifier(name) {
                return Err(RbacError::Config(format!(
                    "tables.{}: {:?} is not a valid identifier",
                    key, name
                )));
            }
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RbacConfig::default();
        assert_eq!(config.tables.role_users, "role_users");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = RbacConfig::from_toml(
            r#"
            [tables]
            users = "accounts"
            "#,
        )
        .unwrap();
        assert_eq!(config.tables.users, "accounts");
        assert_eq!(config.tables.roles, "roles");
    }

    #[test]
    fn test_rejects_bad_identifier() {
        let result = RbacConfig::from_toml(
            r#"
            [tables]
            roles = "roles; DROP TABLE users"
            "#,
        );
        assert!(matches!(result, Err(RbacError::Config(_))));
        assert!(!is_identifier(""));
        assert!(!is_identifier("9lives"));
        assert!(is_identifier("_role_users2"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RbacConfig::load(&dir.path().join("rbac.toml")).unwrap();
        assert_eq!(config, RbacConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbac.toml");
        std::fs::write(&path, "[tables]\npermissions = \"grants\"\n").unwrap();

        let config = RbacConfig::load(&path).unwrap();
        assert_eq!(config.tables.permissions, "grants");
    }
}
