#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use configurer_core::regpath::{RegistryPath, RegistryValue};
use configurer_core::store::RegistryStore;
use configurer_core::{ConfigurerError, Result};
use uuid::Uuid;

/// In-memory registry that records every mutation.
#[derive(Default)]
pub struct MemoryStore {
    keys: RefCell<BTreeSet<String>>,
    values: RefCell<BTreeMap<(String, String), RegistryValue>>,
    pub created: RefCell<Vec<String>>,
    pub writes: RefCell<Vec<(String, String, RegistryValue)>>,
    pub deny_writes: bool,
    pub deny_key_reads: bool,
}

fn key_id(path: &RegistryPath) -> String {
    format!("{}\\{}", path.root().canonical_name(), path.relative_path())
}

impl MemoryStore {
    /// A store whose every mutation fails like a permission error.
    pub fn denying() -> Self {
        Self {
            deny_writes: true,
            ..Default::default()
        }
    }

    /// A store where opening any non-root key for read is refused.
    pub fn unreadable_keys() -> Self {
        Self {
            deny_key_reads: true,
            ..Default::default()
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl RegistryStore for MemoryStore {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool> {
        if self.deny_key_reads && !path.is_root() {
            return Err(ConfigurerError::RegistryAccess {
                path: path.to_string(),
                message: "Accès refusé.".into(),
            });
        }
        Ok(path.is_root() || self.keys.borrow().contains(&key_id(path)))
    }

    fn get_value(&self, path: &RegistryPath, name: &str) -> Result<Option<RegistryValue>> {
        Ok(self
            .values
            .borrow()
            .get(&(key_id(path), name.to_string()))
            .cloned())
    }

    fn create_key(&self, path: &RegistryPath) -> Result<()> {
        if self.deny_writes {
            return Err(ConfigurerError::RegistryOperationFailed {
                path: path.to_string(),
                message: "Accès refusé.".into(),
            });
        }
        if self.keys.borrow_mut().insert(key_id(path)) {
            self.created.borrow_mut().push(path.to_string());
        }
        Ok(())
    }

    fn set_value(&self, path: &RegistryPath, name: &str, value: &RegistryValue) -> Result<()> {
        if self.deny_writes {
            return Err(ConfigurerError::RegistryOperationFailed {
                path: path.to_string(),
                message: "Accès refusé.".into(),
            });
        }
        assert!(
            self.key_exists(path)?,
            "set_value called before {path} was created"
        );
        self.values
            .borrow_mut()
            .insert((key_id(path), name.to_string()), value.clone());
        self.writes
            .borrow_mut()
            .push((path.to_string(), name.to_string(), value.clone()));
        Ok(())
    }
}

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap_or_else(|e| panic!("write {} failed: {e}", path.display()));
}

pub struct CleanupDir(pub PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
