//! The recursive structural comparison.
//!
//! [`deep_equal`] decides whether an actual value matches an expected one,
//! applying, in order:
//!
//! 1. absent-value rules
//! 2. smuggle hooks (replace actual)
//! 3. compare hooks (decide)
//! 4. custom `equal` methods (decide)
//! 5. type reconciliation: operators, lax coercion, dynamic unwrapping
//! 6. the cycle guard
//! 7. anchors
//! 8. structural recursion by kind
//!
//! The entry points ([`matches`], [`explain`] and their `_with` variants) run
//! the same walk in boolean or diagnostic mode.

use std::sync::Arc;

use tracing::trace;

use crate::context::Shared;
use crate::value::{lookup, INVALID};
use crate::{
    Config, Context, Mismatch, Mode, Operator, Reflect, Report, Shown, Summary, Type, Value,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Entry points
// ═══════════════════════════════════════════════════════════════════════════════

/// Returns `true` if `got` matches `expected`, with the default [`Config`].
///
/// ```
/// use deepmatch::{matches, ops};
///
/// assert!(matches(&vec![1_i64, 2], &vec![1_i64, 2]));
/// assert!(matches(&15_i64, &ops::between(10_i64, 20_i64)));
/// assert!(!matches(&1_i64, &1_i32));
/// ```
#[must_use]
pub fn matches<G, E>(got: &G, expected: &E) -> bool
where
    G: Reflect + ?Sized,
    E: Reflect + ?Sized,
{
    matches_with(&Config::default(), got, expected)
}

/// Explains why `got` does not match `expected`, with the default [`Config`].
///
/// Returns `None` exactly when [`matches`] returns `true`.
#[must_use]
pub fn explain<G, E>(got: &G, expected: &E) -> Option<Report>
where
    G: Reflect + ?Sized,
    E: Reflect + ?Sized,
{
    explain_with(&Config::default(), got, expected)
}

/// [`matches`] with an explicit configuration.
#[must_use]
pub fn matches_with<G, E>(config: &Config, got: &G, expected: &E) -> bool
where
    G: Reflect + ?Sized,
    E: Reflect + ?Sized,
{
    let (got, expected) = (got.reflect(), expected.reflect());
    let shared = Shared::default();
    let ctx = Context::root(config, &shared, Mode::Boolean);
    let matched = deep_equal(&ctx, &got, &expected).is_ok();
    trace!(matched, "boolean comparison done");
    matched
}

/// [`explain`] with an explicit configuration.
///
/// With `max_errors` other than 1, the returned report heads a `next` chain
/// of every collected mismatch.
#[must_use]
pub fn explain_with<G, E>(config: &Config, got: &G, expected: &E) -> Option<Report>
where
    G: Reflect + ?Sized,
    E: Reflect + ?Sized,
{
    let (got, expected) = (got.reflect(), expected.reflect());
    let shared = Shared::default();
    let ctx = Context::root(config, &shared, Mode::Diagnostic);
    let result = deep_equal(&ctx, &got, &expected);
    let mut reports = shared.take_errors();
    match result {
        Ok(()) => {}
        Err(Mismatch::Report(report)) => reports.push(*report),
        // only reachable through an operator returning the sentinel itself
        Err(Mismatch::Boolean) => reports.push(Report {
            path: ctx.path().to_string(),
            ..Report::differ(got, expected)
        }),
    }
    let report = Report::merge(reports);
    trace!(matched = report.is_none(), "diagnostic comparison done");
    report
}

// ═══════════════════════════════════════════════════════════════════════════════
// Recursion
// ═══════════════════════════════════════════════════════════════════════════════

/// Compare `got` against `expected` under `ctx`.
///
/// # Panics
///
/// If `got` is an operator: operators are only legal on the expected side.
pub(crate) fn deep_equal(ctx: &Context<'_>, got: &Value, expected: &Value) -> crate::MatchResult {
    if let Value::Op(op) = got {
        panic!(
            "found operator {} in the actual value at {}; operators belong on the expected side",
            op.render(),
            ctx.path()
        );
    }

    if got.is_invalid() || expected.is_invalid() {
        return absent(ctx, got, expected);
    }

    match ctx.config().hooks().smuggle(got) {
        Ok(None) => compare(ctx, got, expected),
        Ok(Some(smuggled)) => {
            trace!(
                path = %ctx.path(),
                got_type = ?got.type_of(),
                smuggled_type = ?smuggled.type_of(),
                "smuggle hook applied"
            );
            if let Value::Op(_) = smuggled {
                panic!("smuggle hook returned an operator at {}", ctx.path());
            }
            if smuggled.is_invalid() {
                return absent(ctx, &smuggled, expected);
            }
            compare(ctx, &smuggled, expected)
        }
        Err(reason) => ctx.fail(|| {
            Report::new("smuggle hook failed")
                .got(got.clone())
                .summary(Summary::text(reason))
        }),
    }
}

/// Exactly one side, or both, is absent.
fn absent(ctx: &Context<'_>, got: &Value, expected: &Value) -> crate::MatchResult {
    if got.is_invalid() && expected.is_invalid() {
        return Ok(());
    }
    if let Value::Op(op) = expected {
        if op.handles_absent() || op.base().error().is_some() {
            return call_operator(ctx, got, op);
        }
        return ctx.fail(|| Report::differ(Value::Invalid, Shown::raw(op.render())));
    }
    if expected.is_invalid() {
        // untyped nil matches a nil of any type
        if got.is_nil_like() {
            return Ok(());
        }
        return ctx.fail(|| Report::differ(got.clone(), Value::Invalid));
    }
    ctx.fail(|| Report::differ(Value::Invalid, expected.clone()))
}

/// Steps 3 onwards; both sides are present and `got` is final.
fn compare(ctx: &Context<'_>, got: &Value, expected: &Value) -> crate::MatchResult {
    let (Some(got_ty), Some(expected_ty)) = (got.type_of(), expected.type_of()) else {
        return absent(ctx, got, expected);
    };
    let config = ctx.config();
    let hooks = config.hooks();

    if let Some(hook) = hooks.comparer(&got_ty, &expected_ty) {
        trace!(
            path = %ctx.path(),
            got_type = %got_ty,
            expected_type = %expected_ty,
            "compare hook"
        );
        return match hook(got, expected) {
            Ok(true) => Ok(()),
            Ok(false) => ctx.fail(|| Report::differ(got.clone(), expected.clone())),
            Err(reason) => ctx.fail(|| {
                Report::new("hook failed")
                    .got(got.clone())
                    .expected(expected.clone())
                    .summary(Summary::text(reason))
            }),
        };
    }

    if let (Value::Custom(g), Value::Custom(e)) = (got, expected) {
        if config.use_equal() || hooks.uses_equal(&got_ty) {
            if let Some(equal) = g.equal(e.as_ref()) {
                return if equal {
                    Ok(())
                } else {
                    ctx.fail(|| {
                        Report::new("got.equal(expected) failed")
                            .got(got.clone())
                            .expected(expected.clone())
                    })
                };
            }
        }
    }

    if got_ty != expected_ty {
        return reconcile(ctx, got, expected, &got_ty, &expected_ty);
    }

    // pairs already on the stack are assumed equal; this is what ends cycles
    let _guard = match (got.identity(), expected.identity()) {
        (Some(g), Some(e)) => match ctx.visit(g, e) {
            Some(guard) => Some(guard),
            None => {
                trace!(path = %ctx.path(), "cycle detected, assuming equal");
                return Ok(());
            }
        },
        _ => None,
    };

    if let Some(Value::Op(op)) = config.anchors().resolve(expected) {
        trace!(path = %ctx.path(), operator = op.base().name(), "anchor resolved");
        return call_operator(ctx, got, op);
    }

    structural(ctx, got, expected, &got_ty)
}

/// Types differ.
fn reconcile(
    ctx: &Context<'_>,
    got: &Value,
    expected: &Value,
    got_ty: &Type,
    expected_ty: &Type,
) -> crate::MatchResult {
    if let Value::Op(op) = expected {
        return match got {
            Value::Dyn(Some(inner)) => call_operator(ctx, inner, op),
            Value::Dyn(None) => absent(ctx, &INVALID, expected),
            _ => call_operator(ctx, got, op),
        };
    }

    if ctx.is_lax() && expected_ty.converts_to(got_ty) {
        trace!(
            path = %ctx.path(),
            got_type = %got_ty,
            expected_type = %expected_ty,
            "lax conversion"
        );
        return match expected.convert(got_ty) {
            Some(converted) => compare(ctx, got, &converted),
            None => ctx.fail(|| Report::differ(got.clone(), expected.clone())),
        };
    }

    match (got, expected) {
        (Value::Dyn(Some(inner)), _) => deep_equal(ctx, inner, expected),
        (Value::Dyn(None), _) => absent(ctx, &INVALID, expected),
        (_, Value::Dyn(Some(inner))) => deep_equal(ctx, got, inner),
        (_, Value::Dyn(None)) => absent(ctx, got, &INVALID),
        _ => ctx.fail(|| {
            Report::new("type mismatch")
                .got(Shown::raw(got_ty.to_string()))
                .expected(Shown::raw(expected_ty.to_string()))
        }),
    }
}

/// Hand `got` to an operator.
fn call_operator(ctx: &Context<'_>, got: &Value, op: &Arc<dyn Operator>) -> crate::MatchResult {
    let base = op.base();
    let ctx = ctx.under(base.attribution());
    trace!(operator = base.name(), path = %ctx.path(), "delegating to operator");
    if let Some(error) = base.error() {
        return ctx.fail(|| {
            Report::new(format!("bad usage of {} operator", base.name()))
                .summary(Summary::text(error.to_string()))
        });
    }
    op.match_value(&ctx, got)
}

/// Same types, no hook or operator involved.
fn structural(
    ctx: &Context<'_>,
    got: &Value,
    expected: &Value,
    ty: &Type,
) -> crate::MatchResult {
    match (got, expected) {
        (Value::Array { items: g, .. }, Value::Array { items: e, .. }) => {
            for (i, (g, e)) in g.iter().zip(e.iter()).enumerate() {
                deep_equal(&ctx.index(i), g, e)?;
            }
            Ok(())
        }
        (Value::Slice { items: g, .. }, Value::Slice { items: e, .. }) => {
            slices(ctx, got, expected, g.as_deref(), e.as_deref())
        }
        (Value::Map { entries: g, .. }, Value::Map { entries: e, .. }) => {
            maps(ctx, got, expected, g.as_deref(), e.as_deref())
        }
        (Value::Dyn(g), Value::Dyn(e)) => deep_equal(
            ctx,
            g.as_deref().unwrap_or(&INVALID),
            e.as_deref().unwrap_or(&INVALID),
        ),
        (Value::Ptr { .. }, Value::Ptr { .. }) => match (got.pointee(), expected.pointee()) {
            (None, None) => Ok(()),
            // same referent
            (Some(_), Some(_)) if got.identity() == expected.identity() => Ok(()),
            (Some(g), Some(e)) => deep_equal(&ctx.deref(), g, e),
            _ => ctx.fail(|| {
                Report::new("nil pointer")
                    .got(got.clone())
                    .expected(expected.clone())
            }),
        },
        (Value::Struct(g), Value::Struct(e)) => {
            if Arc::ptr_eq(g, e) {
                return Ok(());
            }
            if !g.same_shape(e) {
                let shape = |r: &crate::Record| {
                    let names: Vec<&str> = r.fields().iter().map(|f| &*f.name).collect();
                    format!("{} {{ {} }}", r.name(), names.join(", "))
                };
                return ctx.fail(|| {
                    Report::new("record fields differ")
                        .got(Shown::raw(shape(g)))
                        .expected(Shown::raw(shape(e)))
                });
            }
            let config = ctx.config();
            let skip_private = config.ignore_private() || config.hooks().ignores_private(ty);
            for (gf, ef) in g.fields().iter().zip(e.fields()) {
                if skip_private && !gf.public {
                    continue;
                }
                deep_equal(&ctx.field(Arc::clone(&gf.name)), &gf.value, &ef.value)?;
            }
            Ok(())
        }
        (Value::Func { handle: None, .. }, Value::Func { handle: None, .. }) => Ok(()),
        (Value::Func { .. }, Value::Func { .. }) => ctx.fail(|| {
            Report::new("functions mismatch").summary(Summary::text("<can not be compared>"))
        }),
        (Value::Chan { handle: g, .. }, Value::Chan { handle: e, .. }) => {
            let same = match (g, e) {
                (None, None) => true,
                (Some(g), Some(e)) => std::ptr::addr_eq(Arc::as_ptr(g), Arc::as_ptr(e)),
                _ => false,
            };
            if same {
                Ok(())
            } else {
                ctx.fail(|| Report::differ(got.clone(), expected.clone()))
            }
        }
        (Value::Custom(g), Value::Custom(e)) => {
            if std::ptr::addr_eq(Arc::as_ptr(g), Arc::as_ptr(e)) {
                return Ok(());
            }
            match (g.inspect(), e.inspect()) {
                (Some(gv), Some(ev)) => deep_equal(ctx, &gv, &ev),
                _ => ctx.fail(|| Report::differ(got.clone(), expected.clone())),
            }
        }
        (Value::Bool(a), Value::Bool(b)) if a == b => Ok(()),
        (Value::Int(a, _), Value::Int(b, _)) if a == b => Ok(()),
        (Value::Uint(a, _), Value::Uint(b, _)) if a == b => Ok(()),
        (Value::Float(a, _), Value::Float(b, _)) if a == b => Ok(()),
        (Value::Str(a), Value::Str(b)) if a == b => Ok(()),
        _ => ctx.fail(|| Report::differ(got.clone(), expected.clone())),
    }
}

fn slices(
    ctx: &Context<'_>,
    got: &Value,
    expected: &Value,
    g: Option<&[Value]>,
    e: Option<&[Value]>,
) -> crate::MatchResult {
    let (g, e) = match (g, e) {
        (None, None) => return Ok(()),
        (Some(g), Some(e)) => (g, e),
        _ => {
            return ctx.fail(|| {
                Report::new("nil slice")
                    .got(got.clone())
                    .expected(expected.clone())
            })
        }
    };
    if got.identity() == expected.identity() {
        return Ok(());
    }

    let common = g.len().min(e.len());
    for (i, (gv, ev)) in g.iter().zip(e).enumerate() {
        deep_equal(&ctx.index(i), gv, ev)?;
    }
    if g.len() == e.len() {
        return Ok(());
    }
    ctx.fail(|| {
        Report::new(format!("comparing slices, from index #{common}"))
            .summary(Summary::set_diff("item", &e[common..], &g[common..]))
    })
}

fn maps(
    ctx: &Context<'_>,
    got: &Value,
    expected: &Value,
    g: Option<&[(Value, Value)]>,
    e: Option<&[(Value, Value)]>,
) -> crate::MatchResult {
    let (g, e) = match (g, e) {
        (None, None) => return Ok(()),
        (Some(g), Some(e)) => (g, e),
        _ => {
            return ctx.fail(|| {
                Report::new("nil map")
                    .got(got.clone())
                    .expected(expected.clone())
            })
        }
    };
    if got.identity() == expected.identity() {
        return Ok(());
    }

    // entries are kept sorted, so this walk is in key order
    let mut missing = Vec::new();
    let mut found = 0;
    for (key, ev) in e {
        match lookup(g, key) {
            Some(gv) => {
                found += 1;
                deep_equal(&ctx.key(key.clone()), gv, ev)?;
            }
            None if ctx.is_boolean() => return Err(Mismatch::Boolean),
            None => missing.push(key.clone()),
        }
    }
    if missing.is_empty() && found == g.len() {
        return Ok(());
    }
    let extra: Vec<Value> = g
        .iter()
        .filter(|(k, _)| lookup(e, k).is_none())
        .map(|(k, _)| k.clone())
        .collect();
    ctx.fail(|| {
        Report::new("comparing map keys").summary(Summary::set_diff("key", &missing, &extra))
    })
}
