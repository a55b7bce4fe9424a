//! Module-descriptor mode: strips sided fields from a `defineModule` call.
//!
//! The descriptor's object literal is treated as the root object whose
//! top-level fields are the candidate declarations. Decisions are computed
//! against the static field table first; fields whose side lives on their
//! element declarations are filtered per element by crawling each identifier
//! to its class and reading the decorators there.

use crate::ast;
use crate::constants::{DEFINE_MODULE, FIELD_DISABLED, FIELD_NAME, FIELD_VERSION, NO_VERSION_DEFAULT};
use crate::engine::Engine;
use crate::error::SidecutResult;
use crate::fields::field_tag;
use crate::side::{Side, SideTag};
use crate::version;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
    CallExpr, Callee, Expr, IdentName, KeyValueProp, Lit, Module, ObjectLit, Prop, PropName,
    PropOrSpread, Str,
};
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use tracing::{debug, info};

pub(crate) struct DescriptorPass<'e> {
    engine: &'e Engine,
    module_path: PathBuf,
}

impl<'e> DescriptorPass<'e> {
    pub(crate) fn new(engine: &'e Engine, id: &str) -> Self {
        Self {
            engine,
            module_path: PathBuf::from(id),
        }
    }

    /// Run the descriptor pass. Returns `false` without touching the tree
    /// when the file holds no module-definition call.
    pub(crate) fn run(&self, module: &mut Module) -> SidecutResult<bool> {
        let mut snapshot = DescriptorSnapshot::default();
        module.visit_with(&mut SnapshotVisitor {
            snapshot: &mut snapshot,
        });
        if !snapshot.found {
            return Ok(false);
        }

        let display_name = self.module_name(&snapshot);
        let (version, inject_version) = self.resolve_version(&snapshot);

        let side = self.engine.config().side;
        let mut remove: HashSet<String> = HashSet::new();
        let mut keep_idents: HashMap<String, HashSet<String>> = HashMap::new();

        let disabled = snapshot
            .fields
            .iter()
            .any(|f| f.name == FIELD_DISABLED && f.literal_true);

        if disabled {
            // Everything except the module's identity goes.
            for field in &snapshot.fields {
                if field.name != FIELD_NAME && field.name != FIELD_VERSION {
                    remove.insert(field.name.clone());
                }
            }
            info!(module = %display_name, version = %version, "disabled");
        } else {
            let module_dir = self.module_dir();
            for field in &snapshot.fields {
                match field_tag(&field.name) {
                    SideTag::Neither => {
                        remove.insert(field.name.clone());
                    }
                    SideTag::Client if side == Side::Server => {
                        remove.insert(field.name.clone());
                    }
                    SideTag::Server if side == Side::Client => {
                        remove.insert(field.name.clone());
                    }
                    SideTag::DeclarationDefined => {
                        if let Some(idents) = &field.idents {
                            let mut kept = HashSet::new();
                            for ident in idents {
                                let tag = self.engine.resolve_ident_side(
                                    module, &module_dir, ident, false,
                                )?;
                                if side.accepts(tag) {
                                    kept.insert(ident.clone());
                                } else {
                                    debug!(
                                        field = %field.name,
                                        identifier = %ident,
                                        ?tag,
                                        "dropping identifier for wrong side"
                                    );
                                }
                            }
                            keep_idents.insert(field.name.clone(), kept);
                        }
                    }
                    _ => {}
                }
            }
            info!(module = %display_name, version = %version, "enabled");
        }

        let mut apply = ApplyDescriptor {
            remove: &remove,
            keep_idents: &keep_idents,
            inject_version,
            applied: false,
        };
        module.visit_mut_with(&mut apply);
        Ok(true)
    }

    fn module_dir(&self) -> PathBuf {
        self.module_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Display name: explicit `name` field, else the file stem.
    fn module_name(&self, snapshot: &DescriptorSnapshot) -> String {
        if let Some(field) = snapshot.fields.iter().find(|f| f.name == FIELD_NAME) {
            if let Some(value) = &field.string_value {
                return value.clone();
            }
        }
        let stem = self
            .module_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module");
        stem.strip_suffix(".module").unwrap_or(stem).to_string()
    }

    /// Resolve the module's version: explicit field, cached value, manifest
    /// climb, fixed default, in that order. The second tuple element is a
    /// version to synthesize into the descriptor when the tree lacks one.
    fn resolve_version(&self, snapshot: &DescriptorSnapshot) -> (String, Option<String>) {
        if let Some(field) = snapshot.fields.iter().find(|f| f.name == FIELD_VERSION) {
            if let Some(value) = &field.string_value {
                self.engine
                    .versions()
                    .insert(&self.module_path, value.clone());
                return (value.clone(), None);
            }
            // A non-literal value (identifier, template, call) still counts
            // as an explicit version. Synthesizing a literal next to it
            // would leave a duplicate key whose later entry overrides the
            // declared one at runtime. Only the display value falls back.
            let display = self
                .engine
                .versions()
                .get(&self.module_path)
                .unwrap_or_else(|| NO_VERSION_DEFAULT.to_string());
            return (display, None);
        }

        if let Some(cached) = self.engine.versions().get(&self.module_path) {
            return (cached.clone(), Some(cached));
        }

        let stop = self.engine.package_roots().last_good_root();
        if let Some(found) = version::manifest_version_above(&self.module_path, stop.as_deref()) {
            self.engine.versions().insert(&self.module_path, found.clone());
            return (found.clone(), Some(found));
        }

        (NO_VERSION_DEFAULT.to_string(), None)
    }
}

/// Field-level summary of the descriptor object, captured before mutation.
#[derive(Default)]
struct DescriptorSnapshot {
    found: bool,
    fields: Vec<FieldSnapshot>,
}

struct FieldSnapshot {
    name: String,
    literal_true: bool,
    string_value: Option<String>,
    idents: Option<Vec<String>>,
}

struct SnapshotVisitor<'a> {
    snapshot: &'a mut DescriptorSnapshot,
}

impl Visit for SnapshotVisitor<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        call.visit_children_with(self);
        if self.snapshot.found {
            return;
        }
        if let Some(object) = define_module_object(call) {
            self.snapshot.found = true;
            self.snapshot.fields = object.props.iter().filter_map(snapshot_prop).collect();
        }
    }
}

fn snapshot_prop(prop: &PropOrSpread) -> Option<FieldSnapshot> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    let Prop::KeyValue(kv) = prop.as_ref() else {
        return None;
    };
    let name = ast::prop_key_name(&kv.key)?;

    let mut snapshot = FieldSnapshot {
        name,
        literal_true: false,
        string_value: None,
        idents: None,
    };
    match kv.value.as_ref() {
        Expr::Lit(Lit::Bool(b)) => snapshot.literal_true = b.value,
        Expr::Lit(Lit::Str(s)) => snapshot.string_value = Some(s.value.to_string()),
        Expr::Array(array) => {
            snapshot.idents = Some(
                array
                    .elems
                    .iter()
                    .flatten()
                    .filter_map(|elem| match elem.expr.as_ref() {
                        Expr::Ident(ident) if elem.spread.is_none() => {
                            Some(ident.sym.to_string())
                        }
                        _ => None,
                    })
                    .collect(),
            );
        }
        _ => {}
    }
    Some(snapshot)
}

/// The object literal of a `defineModule({...})` call, if that is what
/// `call` is.
fn define_module_object(call: &CallExpr) -> Option<&ObjectLit> {
    if !is_define_module(call) {
        return None;
    }
    match call.args.as_slice() {
        [arg] if arg.spread.is_none() => match arg.expr.as_ref() {
            Expr::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

fn define_module_object_mut(call: &mut CallExpr) -> Option<&mut ObjectLit> {
    if !is_define_module(call) {
        return None;
    }
    match call.args.as_mut_slice() {
        [arg] if arg.spread.is_none() => match arg.expr.as_mut() {
            Expr::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

fn is_define_module(call: &CallExpr) -> bool {
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };
    let Expr::Ident(name) = callee.as_ref() else {
        return false;
    };
    name.sym.as_ref() == DEFINE_MODULE
}

/// Applies the computed decisions to the descriptor object: prunes removed
/// fields key-and-all, filters element lists down to the surviving
/// identifiers, and synthesizes the version field where needed.
struct ApplyDescriptor<'a> {
    remove: &'a HashSet<String>,
    keep_idents: &'a HashMap<String, HashSet<String>>,
    inject_version: Option<String>,
    applied: bool,
}

impl VisitMut for ApplyDescriptor<'_> {
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if self.applied {
            return;
        }
        let Some(object) = define_module_object_mut(call) else {
            return;
        };

        object.props.retain(|prop| match prop_field_name(prop) {
            Some(name) => !self.remove.contains(&name),
            None => true,
        });

        for prop in object.props.iter_mut() {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(kv) = prop.as_mut() else {
                continue;
            };
            let Some(name) = ast::prop_key_name(&kv.key) else {
                continue;
            };
            let Some(keep) = self.keep_idents.get(&name) else {
                continue;
            };
            if let Expr::Array(array) = kv.value.as_mut() {
                array.elems.retain(|elem| match elem {
                    Some(elem) => match elem.expr.as_ref() {
                        Expr::Ident(ident) => keep.contains(ident.sym.as_ref()),
                        _ => true,
                    },
                    None => true,
                });
            }
        }

        if let Some(version) = self.inject_version.take() {
            object
                .props
                .push(PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName::new(FIELD_VERSION.into(), DUMMY_SP)),
                    value: Box::new(Expr::Lit(Lit::Str(Str {
                        span: DUMMY_SP,
                        value: version.into(),
                        raw: None,
                    }))),
                }))));
        }

        self.applied = true;
    }
}

fn prop_field_name(prop: &PropOrSpread) -> Option<String> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    let Prop::KeyValue(kv) = prop.as_ref() else {
        return None;
    };
    ast::prop_key_name(&kv.key)
}
