//! Filesystem-anchored package root discovery with process-wide caching.

use crate::constants::PACKAGE_ROOT_DIR;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Process-wide cache of package-root probes.
///
/// `checked` remembers whether a directory contained a resolvable package
/// root. `last_good` is a fast-path guess at the root to try first; it is
/// advisory only and correctness never depends on it being fresh. Races can
/// only cost redundant filesystem probes because every entry is a pure
/// function of a path that does not change during a build.
#[derive(Debug, Default)]
pub struct PackageRootCache {
    checked: Mutex<HashMap<PathBuf, bool>>,
    last_good: Mutex<Option<PathBuf>>,
}

impl PackageRootCache {
    /// Check whether `dir` exists, consulting the cache first.
    fn probe(&self, dir: &Path) -> bool {
        if let Some(known) = self.checked.lock().unwrap().get(dir) {
            return *known;
        }
        let exists = dir.is_dir();
        self.checked
            .lock()
            .unwrap()
            .insert(dir.to_path_buf(), exists);
        exists
    }

    /// Last package root a lookup succeeded in, if any.
    pub fn last_good_root(&self) -> Option<PathBuf> {
        self.last_good.lock().unwrap().clone()
    }

    fn remember_root(&self, root: &Path) {
        debug!(root = %root.display(), "new default package root");
        *self.last_good.lock().unwrap() = Some(root.to_path_buf());
    }
}

/// Resolves package directories by walking upward through the filesystem.
pub struct PathResolver<'a> {
    cache: &'a PackageRootCache,
}

impl<'a> PathResolver<'a> {
    pub fn new(cache: &'a PackageRootCache) -> Self {
        Self { cache }
    }

    /// Walk upward from `start_dir` to the filesystem root, collecting every
    /// ancestor level that holds a package-root marker directory.
    ///
    /// Ordered closest ancestor first, so project-local directories win over
    /// ones higher up the tree.
    pub fn find_package_roots(&self, start_dir: &Path) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        for ancestor in start_dir.ancestors() {
            let candidate = ancestor.join(PACKAGE_ROOT_DIR);
            if self.cache.probe(&candidate) {
                roots.push(candidate);
            }
        }
        roots
    }

    /// Find the directory a package resolves to, trying the last successful
    /// root first and falling back to a full upward walk.
    ///
    /// Returns `None` when the package cannot be found anywhere; callers must
    /// treat that as "unresolved", not as an error.
    pub fn resolve_package_path(&self, start_dir: &Path, package: &str) -> Option<PathBuf> {
        if let Some(root) = self.cache.last_good_root() {
            let candidate = root.join(package);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        for root in self.find_package_roots(start_dir) {
            let candidate = root.join(package);
            if candidate.exists() {
                self.cache.remember_root(&root);
                return Some(candidate);
            }
        }
        None
    }
}

/// Canonical forward-slash form of a path, for stable cross-platform
/// comparison and logging.
pub fn normalize_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Join a relative specifier onto a base directory, resolving `.` and `..`
/// lexically so the result stays canonical without touching the filesystem.
pub fn clean_join(base: &Path, relative: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
