//! Cross-module identifier-origin crawler.
//!
//! Given a starting path and an identifier name, walks import chains, barrel
//! re-exports and package boundaries until it reaches the file that actually
//! declares the identifier.

use crate::ast;
use crate::config::Dialect;
use crate::paths::{clean_join, normalize_slashes, PackageRootCache, PathResolver};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SymbolResolver<'a> {
    paths: PathResolver<'a>,
    dialect: Dialect,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(cache: &'a PackageRootCache, dialect: Dialect) -> Self {
        Self {
            paths: PathResolver::new(cache),
            dialect,
        }
    }

    /// Find the module that declares `identifier`, starting from `start`.
    ///
    /// `start` may be a source file, a file missing its extension, or a
    /// directory holding an index file. Returns `None` when the declaration
    /// cannot be located; callers recover with their own fallback policy.
    pub fn locate_declaration(&self, start: &Path, identifier: &str) -> Option<PathBuf> {
        let mut visited = HashSet::new();
        self.crawl(start, identifier, &mut visited)
    }

    fn crawl(
        &self,
        start: &Path,
        identifier: &str,
        visited: &mut HashSet<String>,
    ) -> Option<PathBuf> {
        let target = self.normalize_target(start);

        // Cyclic barrel re-exports would otherwise recurse forever. Keys are
        // slash-normalized so the same file cannot slip past the guard under
        // a different separator style.
        if !visited.insert(normalize_slashes(&target)) {
            debug!(path = %target.display(), "cycle detected while crawling, abandoning branch");
            return None;
        }

        let code = fs::read_to_string(&target).ok()?;
        let label = target.to_string_lossy().to_string();
        let parsed = ast::parse_module(&label, &code, self.dialect).ok()?;
        let module = parsed.module;

        // The name appearing in import-specifier position means this file
        // pulls it in from elsewhere; follow the import instead of treating
        // any local use as a declaration.
        if let Some(source) = ast::import_source_for(&module, identifier) {
            debug!(
                file = %target.display(),
                identifier, source, "identifier is imported, following"
            );
            let dir = target.parent()?;
            let next = if ast::is_relative_specifier(&source) {
                clean_join(dir, &source)
            } else {
                self.paths.resolve_package_path(dir, &source)?
            };
            return self.crawl(&next, identifier, visited);
        }

        if ast::count_ident_uses(&module, identifier) > 0 {
            debug!(file = %target.display(), identifier, "found declaring module");
            return Some(target);
        }

        // Barrel file: chase each export-all until one branch succeeds.
        let dir = target.parent()?;
        for source in ast::export_all_sources(&module) {
            let next = clean_join(dir, &source);
            if let Some(found) = self.crawl(&next, identifier, visited) {
                return Some(found);
            }
        }

        None
    }

    /// Normalize a crawl target to a concrete file: keep recognized source
    /// files as-is, probe `path.<ext>`, and fall back to a directory index.
    fn normalize_target(&self, start: &Path) -> PathBuf {
        let ext = self.dialect.extension();
        if start.extension().map_or(false, |e| e == ext) {
            return start.to_path_buf();
        }

        let mut with_ext = start.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        if with_ext.exists() {
            with_ext
        } else {
            start.join(format!("index.{}", ext))
        }
    }
}
