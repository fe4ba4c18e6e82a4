//! Reference operators.
//!
//! Every constructor returns a [`Value`] wrapping the operator, ready to be
//! placed anywhere in an expected value. Constructors are `#[track_caller]`:
//! reports raised under an operator point at the line that built it.
//!
//! | Constructor | Matches |
//! |-------------|---------|
//! | [`between`], [`between_with`] | numbers in a range |
//! | [`nil`], [`not_nil`] | (non-)nil values, absent included |
//! | [`all`], [`any`], [`none`], [`not`] | combinations of expectations |
//! | [`has_prefix`], [`has_suffix`], [`contains`], [`re`], [`re_captures`] | strings |
//! | [`smuggle`], [`smuggle_field`] | a transformed actual value |
//! | [`len`] | the length of a container |
//! | [`code`] | a custom predicate |
//! | [`ignore`] | anything |
//! | [`lax`] | with lax coercion enabled below |

mod between;
mod logic;
mod smuggle;
mod string;

pub use between::{between, between_with, Bounds};
pub use logic::{all, any, none, not};
pub use smuggle::{smuggle, smuggle_field};
pub use string::{contains, has_prefix, has_suffix, re, re_captures};

use std::fmt;

use crate::{Base, Context, MatchResult, Operator, Report, Shown, Summary, Type, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Nil / NotNil
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Nil {
    base: Base,
    negate: bool,
}

/// Matches the absent value and nil values of any type.
#[track_caller]
#[must_use]
pub fn nil() -> Value {
    Value::op(Nil {
        base: Base::new("Nil"),
        negate: false,
    })
}

/// Matches anything but the absent value and nil values.
#[track_caller]
#[must_use]
pub fn not_nil() -> Value {
    Value::op(Nil {
        base: Base::new("NotNil"),
        negate: true,
    })
}

impl Operator for Nil {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        if got.is_nil_like() != self.negate {
            return Ok(());
        }
        ctx.fail(|| {
            let report = Report::new(if self.negate {
                "nil value"
            } else {
                "non-nil value"
            })
            .got(got.clone());
            if self.negate {
                report.expected(Shown::raw("not nil"))
            } else {
                report.expected(Shown::raw("nil"))
            }
        })
    }

    fn handles_absent(&self) -> bool {
        true
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("{}()", self.base.name()))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Ignore
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Ignore {
    base: Base,
}

/// Matches anything, absent included.
#[track_caller]
#[must_use]
pub fn ignore() -> Value {
    Value::op(Ignore {
        base: Base::new("Ignore"),
    })
}

impl Operator for Ignore {
    fn match_value(&self, _ctx: &Context<'_>, _got: &Value) -> MatchResult {
        Ok(())
    }

    fn handles_absent(&self) -> bool {
        true
    }

    fn render(&self) -> String {
        self.base.render_with(|| "Ignore()".to_string())
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Code
// ═══════════════════════════════════════════════════════════════════════════════

type CheckFn = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

struct Code {
    base: Base,
    name: String,
    check: CheckFn,
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Code").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Matches when `check` accepts the actual value.
///
/// `check` returns `Err(reason)` to reject; the reason ends up in the
/// report's summary.
///
/// ```
/// use deepmatch::{matches, ops, Value};
///
/// let even = ops::code("is_even", |v: &Value| match v {
///     Value::Int(i, _) if i % 2 == 0 => Ok(()),
///     _ => Err("odd or not an integer".to_string()),
/// });
/// assert!(matches(&4_i64, &even));
/// assert!(!matches(&3_i64, &even));
/// ```
#[track_caller]
#[must_use]
pub fn code<F>(name: impl Into<String>, check: F) -> Value
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
{
    Value::op(Code {
        base: Base::new("Code"),
        name: name.into(),
        check: Box::new(check),
    })
}

impl Operator for Code {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        match (self.check)(got) {
            Ok(()) => Ok(()),
            Err(reason) => ctx.fail(|| {
                Report::new("code rejected value")
                    .got(got.clone())
                    .summary(Summary::text(reason))
            }),
        }
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("Code({})", self.name))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Len
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Len {
    base: Base,
    expected: Value,
}

/// Matches containers and strings whose length matches `expected`.
///
/// A string's length is its length in bytes, not in characters.
///
/// `expected` is compared against a `usize`; use an operator (or lax mode)
/// to compare against other integer types.
#[track_caller]
#[must_use]
pub fn len(expected: impl Into<Value>) -> Value {
    Value::op(Len {
        base: Base::new("Len"),
        expected: expected.into(),
    })
}

impl Operator for Len {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let Some(n) = got.len() else {
            return ctx.fail(|| {
                Report::new("bad kind")
                    .got(Shown::raw(
                        got.type_of().map_or_else(|| "nil".to_string(), |t| t.to_string()),
                    ))
                    .expected(Shown::raw("a string, a sequence or a map"))
            });
        };
        ctx.label(".len()").deep_equal(&Value::from(n), &self.expected)
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("Len({})", self.expected))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lax
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Lax {
    base: Base,
    expected: Value,
}

/// Compares against `expected` with lax coercion enabled for the subtree.
///
/// ```
/// use deepmatch::{matches, ops};
///
/// assert!(!matches(&3_u8, &3_i64));
/// assert!(matches(&3_u8, &ops::lax(3_i64)));
/// ```
#[track_caller]
#[must_use]
pub fn lax(expected: impl Into<Value>) -> Value {
    Value::op(Lax {
        base: Base::new("Lax"),
        expected: expected.into(),
    })
}

impl Operator for Lax {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        ctx.with_lax(true).deep_equal(got, &self.expected)
    }

    fn handles_absent(&self) -> bool {
        true
    }

    fn expected_type(&self) -> Option<Type> {
        self.base.type_hint(crate::type_hint_of(&self.expected))
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("Lax({})", self.expected))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{explain, matches};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nil() {
        assert!(matches(&Value::Invalid, &nil()));
        assert!(matches(&Value::nil_ptr(Type::I64), &nil()));
        assert!(matches(&None::<i64>, &nil()));
        assert!(!matches(&Some(1_i64), &nil()));
        assert!(matches(&Some(1_i64), &not_nil()));
        assert!(!matches(&Value::Invalid, &not_nil()));
        let report = explain(&Value::Invalid, &not_nil()).unwrap();
        assert_eq!(report.message, "nil value");
    }

    #[test]
    fn test_ignore() {
        assert!(matches(&Value::Invalid, &ignore()));
        assert!(matches(&vec![1_i64], &ignore()));
        assert_eq!(ignore().to_string(), "Ignore()");
    }

    #[test]
    fn test_code() {
        let positive = code("positive", |v| match v {
            Value::Int(i, _) if *i > 0 => Ok(()),
            _ => Err("not positive".into()),
        });
        assert!(matches(&1_i64, &positive));
        let report = explain(&-1_i64, &positive).unwrap();
        assert_eq!(report.summary.unwrap(), Summary::text("not positive"));
        assert_eq!(positive.to_string(), "Code(positive)");
    }

    #[test]
    fn test_len() {
        assert!(matches(&vec![1_i64, 2], &len(2_usize)));
        // bytes, not characters
        assert!(matches(&"héllo", &len(6_usize)));
        assert!(!matches(&"héllo", &len(5_usize)));
        let report = explain(&vec![1_i64], &len(2_usize)).unwrap();
        assert_eq!(report.path, "DATA.len()");
        assert_eq!(report.location.unwrap().operator, "Len");
        assert_eq!(explain(&1_i64, &len(1_usize)).unwrap().message, "bad kind");
    }

    #[test]
    fn test_len_with_operator() {
        let tags = vec!["a", "b", "c"];
        assert!(matches(&tags, &len(between(2_usize, 5_usize))));
    }

    #[test]
    fn test_lax() {
        let expected = |second: i64| Value::slice(Type::U8, [lax(1_i64), lax(second)]);
        assert!(matches(&vec![1_u8, 2], &expected(2)));
        assert!(!matches(&vec![1_u8, 2], &expected(3)));
    }
}
