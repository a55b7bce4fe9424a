//! Module version resolution with a process-wide memo.
//!
//! A descriptor's version comes from an explicit field when present;
//! otherwise the ancestor directories are climbed for a package manifest
//! carrying one.

use crate::constants::MANIFEST_FILE;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Memoized version per module path, computed once and reused for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct VersionCache {
    inner: Mutex<HashMap<PathBuf, String>>,
}

impl VersionCache {
    pub fn get(&self, module: &Path) -> Option<String> {
        self.inner.lock().unwrap().get(module).cloned()
    }

    pub fn insert(&self, module: &Path, version: String) {
        self.inner.lock().unwrap().insert(module.to_path_buf(), version);
    }
}

/// Climb parent directories of `module_path` looking for a manifest with a
/// `version` entry. Stops at the filesystem root, or early when the climb
/// reaches `stop_at` (the last known package root) without success.
pub fn manifest_version_above(module_path: &Path, stop_at: Option<&Path>) -> Option<String> {
    for dir in module_path.ancestors().skip(1) {
        if stop_at == Some(dir) {
            debug!(dir = %dir.display(), "version climb reached package root, giving up");
            return None;
        }

        let manifest = dir.join(MANIFEST_FILE);
        if !manifest.exists() {
            continue;
        }

        let Ok(content) = fs::read_to_string(&manifest) else {
            continue;
        };
        let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) else {
            continue;
        };
        if let Some(version) = json.get("version").and_then(|v| v.as_str()) {
            debug!(manifest = %manifest.display(), version, "found manifest version");
            return Some(version.to_string());
        }
    }
    None
}
