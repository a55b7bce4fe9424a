//! The elimination engine: one entry point per candidate source file.
//!
//! `Engine::transform` parses the file, picks a working mode by structural
//! inspection (module-descriptor shape vs. loader-chain shape), applies the
//! side-based removals and returns the re-printed source, or `None` when
//! neither mode matched.

mod descriptor;
mod loaders;

use crate::ast;
use crate::config::EngineConfig;
use crate::error::SidecutResult;
use crate::metadata;
use crate::paths::{clean_join, PackageRootCache, PathResolver};
use crate::resolver::SymbolResolver;
use crate::side::SideTag;
use crate::sweep;
use crate::version::VersionCache;
use std::fs;
use std::path::Path;
use swc_core::ecma::ast::Module;
use tracing::debug;

pub struct Engine {
    config: EngineConfig,
    package_roots: PackageRootCache,
    versions: VersionCache,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            package_roots: PackageRootCache::default(),
            versions: VersionCache::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn package_roots(&self) -> &PackageRootCache {
        &self.package_roots
    }

    pub(crate) fn versions(&self) -> &VersionCache {
        &self.versions
    }

    /// Transform one source file for the configured side.
    ///
    /// Returns `Ok(Some(source))` with the rewritten text when a processing
    /// mode matched, `Ok(None)` when the file has neither recognizable shape,
    /// and an error when parsing fails or a required side annotation cannot
    /// be read.
    pub fn transform(&self, id: &str, code: &str) -> SidecutResult<Option<String>> {
        let parsed = ast::parse_module(id, code, self.config.dialect)?;
        let cm = parsed.cm;
        let mut module = parsed.module;

        if descriptor::DescriptorPass::new(self, id).run(&mut module)? {
            self.finish(&mut module);
            return Ok(Some(ast::print_module(&cm, &module)?));
        }

        if loaders::LoaderPass::new(self, id).run(&mut module)? {
            self.finish(&mut module);
            return Ok(Some(ast::print_module(&cm, &module)?));
        }

        debug!(file = id, "no processing mode matched, leaving unchanged");
        Ok(None)
    }

    fn finish(&self, module: &mut Module) {
        sweep::prune_unused_imports(module);
    }

    /// Resolve the side tag of an identifier referenced in `module` by
    /// crawling its import to the declaring file and reading the decorators
    /// on the class declared there.
    ///
    /// Every resolution failure degrades to `Both` (kept); only an
    /// unreadable annotation on a located declaration is an error.
    pub(crate) fn resolve_ident_side(
        &self,
        module: &Module,
        module_dir: &Path,
        name: &str,
        exported_only: bool,
    ) -> SidecutResult<SideTag> {
        let Some(source) = ast::import_source_for(module, name) else {
            debug!(identifier = name, "no import introduces identifier, assuming both");
            return Ok(SideTag::Both);
        };

        let start = if ast::is_relative_specifier(&source) {
            clean_join(module_dir, &source)
        } else {
            match PathResolver::new(&self.package_roots).resolve_package_path(module_dir, &source)
            {
                Some(path) => path,
                None => {
                    debug!(identifier = name, source, "package unresolved, assuming both");
                    return Ok(SideTag::Both);
                }
            }
        };

        let resolver = SymbolResolver::new(&self.package_roots, self.config.dialect);
        let Some(origin) = resolver.locate_declaration(&start, name) else {
            debug!(identifier = name, "declaration not located, assuming both");
            return Ok(SideTag::Both);
        };

        let Ok(code) = fs::read_to_string(&origin) else {
            return Ok(SideTag::Both);
        };
        let label = origin.to_string_lossy().to_string();
        let Ok(parsed) = ast::parse_module(&label, &code, self.config.dialect) else {
            return Ok(SideTag::Both);
        };

        let class = if exported_only {
            ast::find_exported_class(&parsed.module, name)
        } else {
            ast::find_class(&parsed.module, name)
        };
        let Some(class) = class else {
            debug!(identifier = name, origin = %origin.display(), "no class declaration found, assuming both");
            return Ok(SideTag::Both);
        };

        let tag = metadata::side_from_decorators(&origin, name, &class.decorators)?;
        debug!(identifier = name, origin = %origin.display(), ?tag, "resolved identifier side");
        Ok(tag)
    }
}
