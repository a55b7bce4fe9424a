//! Dead import sweeping: rudimentary single-file tree shaking.
//!
//! After elimination passes prune declarations, imports that introduced the
//! removed names would survive as dangling references. This pass counts real
//! uses of every imported binding and drops the ones nothing mentions.

use crate::ast;
use std::collections::HashSet;
use swc_core::ecma::ast::{Module, ModuleDecl, ModuleItem};
use tracing::debug;

/// Remove import bindings that are never used outside import-specifier
/// position. Emptied import declarations are removed whole; bare side-effect
/// imports (`import "./x"`) are left alone. Idempotent.
pub fn prune_unused_imports(module: &mut Module) {
    let mut imported: Vec<String> = Vec::new();
    for item in &module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item {
            for spec in &decl.specifiers {
                imported.push(ast::specifier_local(spec).to_string());
            }
        }
    }

    let used: HashSet<String> = imported
        .into_iter()
        .filter(|name| ast::count_ident_uses(module, name) > 0)
        .collect();

    module.body.retain_mut(|item| {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item else {
            return true;
        };
        let had_specifiers = !decl.specifiers.is_empty();
        decl.specifiers.retain(|spec| {
            let keep = used.contains(ast::specifier_local(spec));
            if !keep {
                debug!(binding = ast::specifier_local(spec), "pruning dead import");
            }
            keep
        });
        !had_specifiers || !decl.specifiers.is_empty()
    });
}
