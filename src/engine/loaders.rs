//! Loader-chain mode: filters `.useLoader(X)` registrations by side.
//!
//! Loader calls are daisy-chained onto a base `useApi()` call. Removing an
//! interior link one call at a time would orphan the base call, so the chain
//! is rebuilt wholesale from the surviving registrations and swapped in for
//! the first statement that registered one. Code interleaved between the
//! original loader calls inside that chain is lost, and so is any later
//! statement containing further registrations, wrapper expressions around
//! them included; this is an accepted limitation of the rebuild, not
//! silently worked around.

use crate::constants::{USE_API, USE_LOADER};
use crate::engine::Engine;
use crate::error::SidecutResult;
use std::path::{Path, PathBuf};
use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    CallExpr, Callee, Expr, ExprOrSpread, Ident, IdentName, MemberExpr, MemberProp, Module,
    ModuleItem, Stmt,
};
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use tracing::debug;

pub(crate) struct LoaderPass<'e> {
    engine: &'e Engine,
    module_path: PathBuf,
}

impl<'e> LoaderPass<'e> {
    pub(crate) fn new(engine: &'e Engine, id: &str) -> Self {
        Self {
            engine,
            module_path: PathBuf::from(id),
        }
    }

    /// Run the loader pass. Returns `false` without touching the tree when
    /// the file registers no loaders.
    pub(crate) fn run(&self, module: &mut Module) -> SidecutResult<bool> {
        let mut scan = LoaderScan {
            registrations: Vec::new(),
        };
        module.visit_with(&mut scan);
        if scan.registrations.is_empty() {
            return Ok(false);
        }

        let side = self.engine.config().side;
        let module_dir = self
            .module_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // Keep survivors in first-encounter order; the chain is rebuilt in
        // exactly this order.
        let mut kept = Vec::new();
        for name in &scan.registrations {
            let tag = self
                .engine
                .resolve_ident_side(module, &module_dir, name, true)?;
            if side.accepts(tag) {
                kept.push(name.clone());
            } else {
                debug!(loader = %name, ?tag, "dropping loader for wrong side");
            }
        }

        // Swap the first registration statement for the rebuilt chain and
        // drop any further registration statements as redundant, whatever
        // else they wrapped around their loader calls.
        let mut replaced = false;
        module.body.retain_mut(|item| {
            let ModuleItem::Stmt(Stmt::Expr(stmt)) = item else {
                return true;
            };
            if !contains_loader_call(&stmt.expr) {
                return true;
            }
            if replaced {
                return false;
            }
            stmt.expr = Box::new(build_chain(&kept));
            replaced = true;
            true
        });

        if !replaced {
            // The chain is buried inside a larger expression, e.g. a const
            // initializer; rebuild it in place instead.
            let mut rebuild = RebuildChain {
                chain: Some(build_chain(&kept)),
            };
            module.visit_mut_with(&mut rebuild);
        }

        Ok(true)
    }
}

/// Collects loader registrations in source order. Children are visited
/// before the call itself so interior chain links come out innermost first,
/// which is the order they were written in.
struct LoaderScan {
    registrations: Vec<String>,
}

impl Visit for LoaderScan {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        call.visit_children_with(self);
        if let Some(name) = call_loader_arg(call) {
            if !self.registrations.contains(&name) {
                self.registrations.push(name);
            }
        }
    }
}

/// The loader identifier of a `.useLoader(X)` call, if `call` is one.
fn call_loader_arg(call: &CallExpr) -> Option<String> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = callee.as_ref() else {
        return None;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    if prop.sym.as_ref() != USE_LOADER {
        return None;
    }
    match call.args.as_slice() {
        [arg] if arg.spread.is_none() => match arg.expr.as_ref() {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn loader_arg(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Call(call) => call_loader_arg(call),
        _ => None,
    }
}

/// Whether any `.useLoader(X)` call appears anywhere inside `expr`.
fn contains_loader_call(expr: &Expr) -> bool {
    let mut scan = LoaderScan {
        registrations: Vec::new(),
    };
    expr.visit_with(&mut scan);
    !scan.registrations.is_empty()
}

/// Replaces the outermost loader-registration expression with the rebuilt
/// chain. Inner links disappear with the replacement, so the visitor stops
/// descending once it has swapped the chain in.
struct RebuildChain {
    chain: Option<Expr>,
}

impl VisitMut for RebuildChain {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if loader_arg(expr).is_some() {
            if let Some(chain) = self.chain.take() {
                *expr = chain;
            }
            return;
        }
        expr.visit_mut_children_with(self);
    }
}

/// Build `useApi().useLoader(a).useLoader(b)...` for the surviving loaders.
fn build_chain(loaders: &[String]) -> Expr {
    let mut chain = Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(Expr::Ident(Ident::new(
            USE_API.into(),
            DUMMY_SP,
            SyntaxContext::empty(),
        )))),
        args: vec![],
        type_args: None,
    });

    for name in loaders {
        chain = Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(chain),
                prop: MemberProp::Ident(IdentName::new(USE_LOADER.into(), DUMMY_SP)),
            }))),
            args: vec![ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Ident(Ident::new(
                    name.clone().into(),
                    DUMMY_SP,
                    SyntaxContext::empty(),
                ))),
            }],
            type_args: None,
        });
    }

    chain
}
