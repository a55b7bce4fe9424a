//! Thin wrappers around the swc parsing, printing and traversal primitives.
//!
//! Everything that touches a syntax tree goes through here so the rest of the
//! crate can reason about modules, imports and identifier uses without
//! repeating parser plumbing.

use crate::config::Dialect;
use crate::error::{SidecutError, SidecutResult};
use swc_core::common::{sync::Lrc, FileName, SourceMap};
use swc_core::ecma::ast::{
    Class, ClassDecl, Decl, DefaultDecl, ExportDefaultDecl, Ident, ImportDecl, ImportSpecifier,
    Module, ModuleDecl, ModuleItem, PropName, Stmt,
};
use swc_core::ecma::codegen::{text_writer::JsWriter, Config as CodegenConfig, Emitter};
use swc_core::ecma::parser::{lexer::Lexer, Parser, StringInput};
use swc_core::ecma::visit::{Visit, VisitWith};

/// A parsed module together with the source map needed to print it again.
pub struct ParsedModule {
    pub cm: Lrc<SourceMap>,
    pub module: Module,
}

/// Parse `code` into a module, reporting the file label on failure.
pub fn parse_module(label: &str, code: &str, dialect: Dialect) -> SidecutResult<ParsedModule> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom(label.to_string())),
        code.to_string(),
    );

    let lexer = Lexer::new(
        dialect.syntax(),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| SidecutError::Parse {
        file: label.to_string(),
        message: e.into_kind().msg().to_string(),
    })?;

    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(SidecutError::Parse {
            file: label.to_string(),
            message: err.into_kind().msg().to_string(),
        });
    }

    Ok(ParsedModule { cm, module })
}

/// Serialize a (possibly mutated) module back to source text.
pub fn print_module(cm: &Lrc<SourceMap>, module: &Module) -> SidecutResult<String> {
    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: CodegenConfig::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        emitter
            .emit_module(module)
            .map_err(|e| SidecutError::Codegen(e.to_string()))?;
    }
    String::from_utf8(buf).map_err(|e| SidecutError::Codegen(e.to_string()))
}

/// Counts occurrences of one identifier name, skipping import declarations
/// entirely so specifier positions never register as uses.
struct IdentUses<'a> {
    name: &'a str,
    count: usize,
}

impl Visit for IdentUses<'_> {
    fn visit_ident(&mut self, ident: &Ident) {
        if ident.sym.as_ref() == self.name {
            self.count += 1;
        }
    }

    fn visit_import_decl(&mut self, _: &ImportDecl) {}
}

/// Count real uses of `name` in the module, outside import-specifier position.
pub fn count_ident_uses(module: &Module, name: &str) -> usize {
    let mut counter = IdentUses { name, count: 0 };
    module.visit_with(&mut counter);
    counter.count
}

/// Local binding name an import specifier introduces.
pub fn specifier_local(spec: &ImportSpecifier) -> &str {
    match spec {
        ImportSpecifier::Named(named) => named.local.sym.as_ref(),
        ImportSpecifier::Default(default) => default.local.sym.as_ref(),
        ImportSpecifier::Namespace(ns) => ns.local.sym.as_ref(),
    }
}

/// Source specifier of the import that introduces `name`, if any.
pub fn import_source_for(module: &Module, name: &str) -> Option<String> {
    for item in &module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item {
            if decl.specifiers.iter().any(|s| specifier_local(s) == name) {
                return Some(decl.src.value.to_string());
            }
        }
    }
    None
}

/// Source specifiers of every `export * from "..."` statement, in order.
pub fn export_all_sources(module: &Module) -> Vec<String> {
    module
        .body
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(all)) => {
                Some(all.src.value.to_string())
            }
            _ => None,
        })
        .collect()
}

/// Whether an import specifier is relative rather than a package reference.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Name of an object-literal property key, where one is statically known.
pub fn prop_key_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn class_decl_named<'m>(decl: &'m ClassDecl, name: &str) -> Option<&'m Class> {
    if decl.ident.sym.as_ref() == name {
        Some(&decl.class)
    } else {
        None
    }
}

/// Find a class-like declaration with the exact given name, exported or not.
pub fn find_class<'m>(module: &'m Module, name: &str) -> Option<&'m Class> {
    for item in &module.body {
        match item {
            ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) => {
                if let Some(class) = class_decl_named(decl, name) {
                    return Some(class);
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Class(decl) = &export.decl {
                    if let Some(class) = class_decl_named(decl, name) {
                        return Some(class);
                    }
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
                decl: DefaultDecl::Class(expr),
                ..
            })) => {
                if expr.ident.as_ref().map(|i| i.sym.as_ref()) == Some(name) {
                    return Some(&expr.class);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find a named-export class declaration with the exact given name.
pub fn find_exported_class<'m>(module: &'m Module, name: &str) -> Option<&'m Class> {
    for item in &module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) = item {
            if let Decl::Class(decl) = &export.decl {
                if let Some(class) = class_decl_named(decl, name) {
                    return Some(class);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> ParsedModule {
        parse_module("test.ts", code, Dialect::TypeScript).unwrap()
    }

    #[test]
    fn counts_uses_outside_import_position() {
        let parsed = parse("import { Foo } from \"./foo\";\nconst x = new Foo();\n");
        assert_eq!(count_ident_uses(&parsed.module, "Foo"), 1);
    }

    #[test]
    fn import_only_names_have_zero_uses() {
        let parsed = parse("import { Foo } from \"./foo\";\n");
        assert_eq!(count_ident_uses(&parsed.module, "Foo"), 0);
    }

    #[test]
    fn finds_the_import_source_for_a_binding() {
        let parsed = parse("import { Foo as Bar } from \"./foo\";\n");
        assert_eq!(
            import_source_for(&parsed.module, "Bar"),
            Some("./foo".to_string())
        );
        assert_eq!(import_source_for(&parsed.module, "Foo"), None);
    }

    #[test]
    fn collects_export_all_sources_in_order() {
        let parsed = parse("export * from \"./a\";\nexport * from \"./b\";\n");
        assert_eq!(export_all_sources(&parsed.module), vec!["./a", "./b"]);
    }

    #[test]
    fn finds_exported_classes_only_when_exported() {
        let parsed = parse("export class Foo {}\nclass Bar {}\n");
        assert!(find_exported_class(&parsed.module, "Foo").is_some());
        assert!(find_exported_class(&parsed.module, "Bar").is_none());
        assert!(find_class(&parsed.module, "Bar").is_some());
    }

    #[test]
    fn printing_round_trips_a_simple_module() {
        let parsed = parse("const x = 1;\n");
        let out = print_module(&parsed.cm, &parsed.module).unwrap();
        assert!(out.contains("const x = 1"));
    }
}
