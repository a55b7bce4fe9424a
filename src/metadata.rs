//! Reads side metadata from decorator annotations on a declaration.
//!
//! Exactly two shapes are recognized:
//!
//! - `@RunsOn(Side.Server)`: single argument, a qualified name whose
//!   terminal segment is the side;
//! - `@Provide({ side: Side.Client, ... })`: options object with a `side`
//!   entry whose value is a qualified name.
//!
//! Anything else on a recognized decorator is a hard error. Guessing here
//! would silently ship code to the wrong environment.

use crate::ast;
use crate::constants::{DECORATOR_PROVIDE, DECORATOR_RUNS_ON, SIDE_KEY};
use crate::error::{SidecutError, SidecutResult};
use crate::side::SideTag;
use std::path::Path;
use swc_core::ecma::ast::{Callee, Decorator, Expr, MemberProp, Prop, PropOrSpread};

/// A successfully matched annotation shape carrying a side name.
enum RecognizedAnnotation {
    /// `RunsOn(Side.X)`
    SingleSideArg(String),
    /// `Provide({ side: Side.X })`
    SideFieldArg(String),
}

enum Recognition {
    NotOurs,
    Matched(RecognizedAnnotation),
    Malformed,
}

/// Read the side tag for a declaration from its decorators.
///
/// Zero decorators means the declaration is neutral (`Both`). The first
/// recognized decorator wins; unrecognized decorator names are ignored.
/// A recognized decorator whose argument fits neither shape aborts with
/// `SidecutError::Metadata` identifying the file and declaration.
pub fn side_from_decorators(
    file: &Path,
    declaration: &str,
    decorators: &[Decorator],
) -> SidecutResult<SideTag> {
    for decorator in decorators {
        match recognize(&decorator.expr) {
            Recognition::NotOurs => continue,
            Recognition::Matched(
                RecognizedAnnotation::SingleSideArg(name)
                | RecognizedAnnotation::SideFieldArg(name),
            ) => {
                return SideTag::parse(&name).ok_or_else(|| shape_error(file, declaration));
            }
            Recognition::Malformed => return Err(shape_error(file, declaration)),
        }
    }
    Ok(SideTag::Both)
}

fn shape_error(file: &Path, declaration: &str) -> SidecutError {
    SidecutError::Metadata {
        file: file.display().to_string(),
        declaration: declaration.to_string(),
    }
}

fn recognize(expr: &Expr) -> Recognition {
    let Expr::Call(call) = expr else {
        return Recognition::NotOurs;
    };
    let Callee::Expr(callee) = &call.callee else {
        return Recognition::NotOurs;
    };
    let Expr::Ident(name) = callee.as_ref() else {
        return Recognition::NotOurs;
    };

    match name.sym.as_ref() {
        DECORATOR_RUNS_ON => match single_side_arg(call.args.first().map(|a| a.expr.as_ref())) {
            Some(side) => Recognition::Matched(RecognizedAnnotation::SingleSideArg(side)),
            None => Recognition::Malformed,
        },
        DECORATOR_PROVIDE => match side_field_arg(call.args.first().map(|a| a.expr.as_ref())) {
            Some(side) => Recognition::Matched(RecognizedAnnotation::SideFieldArg(side)),
            None => Recognition::Malformed,
        },
        _ => Recognition::NotOurs,
    }
}

/// `Side.Server` style qualified name; the terminal segment is the side.
fn qualified_terminal(expr: &Expr) -> Option<String> {
    if let Expr::Member(member) = expr {
        if let MemberProp::Ident(prop) = &member.prop {
            return Some(prop.sym.to_string().to_ascii_lowercase());
        }
    }
    None
}

fn single_side_arg(arg: Option<&Expr>) -> Option<String> {
    qualified_terminal(arg?)
}

fn side_field_arg(arg: Option<&Expr>) -> Option<String> {
    let Expr::Object(object) = arg? else {
        return None;
    };
    for prop in &object.props {
        if let PropOrSpread::Prop(prop) = prop {
            if let Prop::KeyValue(kv) = prop.as_ref() {
                if ast::prop_key_name(&kv.key).as_deref() == Some(SIDE_KEY) {
                    return qualified_terminal(&kv.value);
                }
            }
        }
    }
    None
}
