//! Boolean composition of expectations: `All`, `Any`, `None`, `Not`.
//!
//! # Semantics
//!
//! - `All`: every child must match; the first failing child is reported
//!   as the `origin` of an `All` report
//! - `Any`: at least one child must match
//! - `None`: no child may match
//! - `Not`: the single child must not match
//!
//! Children run against the same context, under a `<Name#i/n>` path label.
//! `Any`, `None` and `Not` only need yes/no answers from their children, so
//! they query them in boolean mode.

use itertools::Itertools;

use crate::{
    type_hint_of, Base, Context, MatchResult, Mismatch, Operator, OperatorError, Report, Shown,
    Type, Value, MAX_COMPOSITE_CHILDREN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    All,
    Any,
    None,
}

impl Combine {
    fn name(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Any => "Any",
            Self::None => "None",
        }
    }
}

#[derive(Debug)]
struct Compound {
    base: Base,
    combine: Combine,
    children: Vec<Value>,
}

#[track_caller]
fn compound(combine: Combine, children: impl IntoIterator<Item = Value>) -> Value {
    let children: Vec<Value> = children.into_iter().collect();
    let base = Base::new(combine.name());
    let check = if children.len() > MAX_COMPOSITE_CHILDREN {
        Err(OperatorError::TooManyChildren {
            count: children.len(),
            max: MAX_COMPOSITE_CHILDREN,
        })
    } else {
        Ok(())
    };
    Value::op(Compound {
        base: base.check(check),
        combine,
        children,
    })
}

/// Matches when every child matches.
///
/// ```
/// use deepmatch::{explain, ops};
///
/// let op = ops::all([ops::between(0_i64, 100_i64), ops::not(50_i64)]);
/// let report = explain(&50_i64, &op).unwrap();
/// assert_eq!(report.message, "compared (part 2 of 2)");
/// assert_eq!(report.origin.unwrap().path, "DATA<All#2/2>");
/// ```
#[track_caller]
#[must_use]
pub fn all(children: impl IntoIterator<Item = Value>) -> Value {
    compound(Combine::All, children)
}

/// Matches when at least one child matches.
#[track_caller]
#[must_use]
pub fn any(children: impl IntoIterator<Item = Value>) -> Value {
    compound(Combine::Any, children)
}

/// Matches when no child matches.
#[track_caller]
#[must_use]
pub fn none(children: impl IntoIterator<Item = Value>) -> Value {
    compound(Combine::None, children)
}

impl Compound {
    fn child_ctx<'a>(&self, ctx: &Context<'a>, i: usize) -> Context<'a> {
        ctx.label(format!(
            "<{}#{}/{}>",
            self.combine.name(),
            i + 1,
            self.children.len()
        ))
    }

    fn match_all(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let n = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            match self.child_ctx(ctx, i).without_collection().deep_equal(got, child) {
                Ok(()) => {}
                Err(Mismatch::Boolean) => return Err(Mismatch::Boolean),
                Err(Mismatch::Report(origin)) => {
                    return ctx.fail(|| {
                        Report::new(format!("compared (part {} of {n})", i + 1))
                            .got(got.clone())
                            .expected(child.clone())
                            .origin(*origin)
                    })
                }
            }
        }
        Ok(())
    }
}

impl Operator for Compound {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        match self.combine {
            Combine::All => self.match_all(ctx, got),
            Combine::Any => {
                let matched = (0..self.children.len())
                    .any(|i| self.child_ctx(ctx, i).matches(got, &self.children[i]));
                if matched {
                    return Ok(());
                }
                ctx.fail(|| {
                    Report::new("comparing with Any")
                        .got(got.clone())
                        .expected(Shown::raw(self.render()))
                })
            }
            Combine::None => {
                let hit = (0..self.children.len())
                    .find(|&i| self.child_ctx(ctx, i).matches(got, &self.children[i]));
                let Some(i) = hit else {
                    return Ok(());
                };
                ctx.fail(|| {
                    Report::new(format!(
                        "comparing with None (part {} of {} is OK)",
                        i + 1,
                        self.children.len()
                    ))
                    .got(got.clone())
                    .expected(Shown::raw(self.render()))
                })
            }
        }
    }

    fn handles_absent(&self) -> bool {
        true
    }

    fn expected_type(&self) -> Option<Type> {
        if self.combine == Combine::None {
            return None;
        }
        // only when every child agrees
        let mut hints = self.children.iter().map(type_hint_of);
        let first = hints.next()??;
        let agreed = hints.all(|h| h.as_ref() == Some(&first));
        self.base.type_hint(agreed.then_some(first))
    }

    fn render(&self) -> String {
        self.base.render_with(|| {
            format!(
                "{}({})",
                self.combine.name(),
                self.children.iter().join(", ")
            )
        })
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

#[derive(Debug)]
struct Not {
    base: Base,
    expected: Value,
}

/// Matches when `expected` does not.
#[track_caller]
#[must_use]
pub fn not(expected: impl Into<Value>) -> Value {
    Value::op(Not {
        base: Base::new("Not"),
        expected: expected.into(),
    })
}

impl Operator for Not {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        if !ctx.label("<Not>").matches(got, &self.expected) {
            return Ok(());
        }
        ctx.fail(|| {
            Report::new("comparing with Not")
                .got(got.clone())
                .expected(Shown::raw(self.render()))
        })
    }

    fn handles_absent(&self) -> bool {
        true
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("Not({})", self.expected))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}
