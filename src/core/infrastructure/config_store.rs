//! Persisted YAML configuration with dotted-path access.

use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "proxmox-cli";
const CONFIG_FILE: &str = "config.yaml";

/// A hierarchical configuration document.
///
/// Paths are dotted (`proxmox.host`). Lookups never fail: a missing key, a
/// null leaf or a scalar in the middle of the path all yield the caller's
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    /// A tree with no keys at all.
    pub fn empty() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    /// The tree used when no configuration file exists.
    pub fn defaults() -> Self {
        let mut tree = Self::empty();
        tree.set("proxmox.host", "");
        tree.set("proxmox.user", "root@pam");
        tree.set("proxmox.verify_ssl", false);
        tree.set("output.format", "table");
        tree.set("output.color", true);
        tree
    }

    pub fn from_value(root: Value) -> Self {
        match root {
            Value::Null => Self::empty(),
            root => Self { root },
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Looks up a dotted path.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for key in path.split('.') {
            current = current.as_mapping()?.get(key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Reads a dotted path, returning `default` when it is absent or holds
    /// a value of another type.
    pub fn get<T: serde::de::DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.lookup(path)
            .and_then(|value| serde_yaml::from_value(value.clone()).ok())
            .unwrap_or(default)
    }

    /// Reads a scalar leaf as text. Booleans and numbers are rendered.
    pub fn get_str(&self, path: &str) -> Option<String> {
        match self.lookup(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Reads a boolean leaf; `"true"`/`"false"` strings are accepted.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match self.lookup(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Writes `value` at a dotted path, creating intermediate mappings.
    ///
    /// A scalar found where a mapping is needed is replaced.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let keys: Vec<&str> = path.split('.').collect();
        set_path(&mut self.root, &keys, value.into());
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::defaults()
    }
}

fn set_path(node: &mut Value, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        let child = map
            .entry(Value::String((*first).to_string()))
            .or_insert(Value::Null);
        set_path(child, rest, value);
    }
}

/// Parses a command-line value into the most specific YAML scalar.
pub fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Loads and saves the [`ConfigTree`] at a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Uses `path` when given, otherwise the per-user default location.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(Self::default_path),
        }
    }

    /// `$XDG_CONFIG_HOME/proxmox-cli/config.yaml` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, reporting malformed content as an error.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Config` if the file cannot be read or parsed.
    pub fn try_load(&self) -> ProxmoxResult<ConfigTree> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            return Ok(ConfigTree::defaults());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProxmoxError::Config(format!("Cannot read {}: {e}", self.path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(ConfigTree::empty());
        }

        let root: Value = serde_yaml::from_str(&content).map_err(|e| {
            ProxmoxError::Config(format!("Malformed {}: {e}", self.path.display()))
        })?;
        if !root.is_mapping() && !root.is_null() {
            return Err(ProxmoxError::Config(format!(
                "{} must contain a mapping at the top level",
                self.path.display()
            )));
        }
        Ok(ConfigTree::from_value(root))
    }

    /// Reads the document, falling back to the defaults when it is unusable.
    pub fn load(&self) -> ConfigTree {
        self.try_load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring configuration file");
            ConfigTree::defaults()
        })
    }

    /// Writes the document, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Config` if the file cannot be written.
    pub fn save(&self, tree: &ConfigTree) -> ProxmoxResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ProxmoxError::Config(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }
        let content = serde_yaml::to_string(tree.as_value())
            .map_err(|e| ProxmoxError::Config(format!("Cannot serialize configuration: {e}")))?;
        fs::write(&self.path, content).map_err(|e| {
            ProxmoxError::Config(format!("Cannot write {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_on_empty_tree_returns_default() {
        let tree = ConfigTree::empty();
        assert_eq!(tree.get("a.b.c", "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_set_then_get_roundtrips() {
        let mut tree = ConfigTree::empty();
        tree.set("a.b.c", "value");
        assert_eq!(tree.get("a.b.c", String::new()), "value");

        tree.set("a.b.d", 42);
        assert_eq!(tree.get("a.b.d", 0u32), 42);
        assert_eq!(tree.get("a.b.c", String::new()), "value");
    }

    #[test]
    fn test_scalar_mid_path_returns_default() {
        let mut tree = ConfigTree::empty();
        tree.set("proxmox.host", "pve.local");
        assert_eq!(tree.get("proxmox.host.port", 1u16), 1);
        assert!(tree.lookup("proxmox.host.port").is_none());
    }

    #[test]
    fn test_set_replaces_scalar_with_mapping() {
        let mut tree = ConfigTree::empty();
        tree.set("proxmox", "flat");
        tree.set("proxmox.host", "pve.local");
        assert_eq!(tree.get_str("proxmox.host").as_deref(), Some("pve.local"));
    }

    #[test]
    fn test_type_mismatch_returns_default() {
        let mut tree = ConfigTree::empty();
        tree.set("output.color", "not-a-bool");
        assert!(tree.get("output.color", true));
    }

    #[test]
    fn test_defaults() {
        let tree = ConfigTree::defaults();
        assert_eq!(tree.get_str("proxmox.host").as_deref(), Some(""));
        assert_eq!(tree.get_str("proxmox.user").as_deref(), Some("root@pam"));
        assert_eq!(tree.get_bool("proxmox.verify_ssl"), Some(false));
        assert_eq!(tree.get_str("output.format").as_deref(), Some("table"));
        assert_eq!(tree.get_bool("output.color"), Some(true));
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("8006"), Value::from(8006u64));
        assert_eq!(parse_scalar("pve.local"), Value::from("pve.local"));
        assert_eq!(parse_scalar("a: b"), Value::from("a: b"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(Some(dir.path().join("config.yaml")));
        assert_eq!(store.load(), ConfigTree::defaults());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(Some(dir.path().join("nested/dir/config.yaml")));

        let mut tree = ConfigTree::defaults();
        tree.set("proxmox.host", "pve.example.com");
        tree.set("proxmox.token_name", "ci");
        store.save(&tree).unwrap();

        let loaded = store.try_load().unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "proxmox: [unclosed").unwrap();

        let store = ConfigStore::new(Some(path));
        assert!(matches!(store.try_load(), Err(ProxmoxError::Config(_))));
        assert_eq!(store.load(), ConfigTree::defaults());
    }

    #[test]
    fn test_empty_file_is_empty_tree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "").unwrap();

        let store = ConfigStore::new(Some(path));
        assert_eq!(store.load(), ConfigTree::empty());
    }
}
