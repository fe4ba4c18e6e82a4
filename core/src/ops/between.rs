//! Numeric range operator.

use std::cmp::Ordering;

use crate::{Base, Context, MatchResult, Operator, OperatorError, Report, Shown, Type, Value};

/// Which ends of a [`between_with`] range are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bounds {
    /// `from ≤ got ≤ to`
    #[default]
    InIn,
    /// `from ≤ got < to`
    InOut,
    /// `from < got ≤ to`
    OutIn,
    /// `from < got < to`
    OutOut,
}

impl Bounds {
    fn includes_from(self) -> bool {
        matches!(self, Self::InIn | Self::InOut)
    }

    fn includes_to(self) -> bool {
        matches!(self, Self::InIn | Self::OutIn)
    }

    fn mirrored(self) -> Self {
        match self {
            Self::InOut => Self::OutIn,
            Self::OutIn => Self::InOut,
            other => other,
        }
    }
}

/// A number of any width, widened for comparison.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn of(v: &Value) -> Option<Self> {
        match v.unboxed() {
            Value::Int(i, _) => Some(Self::Int(i128::from(*i))),
            Value::Uint(u, _) => Some(Self::Int(i128::from(*u))),
            Value::Float(f, _) => Some(Self::Float(*f)),
            _ => None,
        }
    }

    fn cmp(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (Self::Int(a), Self::Float(b)) => int_float_cmp(a, b),
            (Self::Float(a), Self::Int(b)) => int_float_cmp(b, a).map(Ordering::reverse),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b),
        }
    }
}

/// Exact ordering of an integer against a float, without rounding the integer.
fn int_float_cmp(a: i128, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        return None;
    }
    let floor = b.floor();
    let limit = 2_f64.powi(127);
    if floor >= limit {
        return Some(Ordering::Less);
    }
    if floor < -limit {
        return Some(Ordering::Greater);
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = floor as i128;
    let frac = if b == floor {
        Ordering::Equal
    } else {
        Ordering::Less
    };
    Some(a.cmp(&whole).then(frac))
}

#[derive(Debug)]
struct Between {
    base: Base,
    from: Value,
    to: Value,
    bounds: Bounds,
}

/// Matches numbers in `[from, to]`.
///
/// Any numeric actual value is accepted, whatever its width: the range is
/// compared numerically. `from` and `to` are swapped if given in the wrong
/// order.
///
/// ```
/// use deepmatch::{explain, matches, ops};
///
/// let teen = ops::between(13_i64, 19_i64);
/// assert!(matches(&15_u8, &teen));
/// let report = explain(&25_i64, &teen).unwrap();
/// assert_eq!(report.expected.unwrap().to_string(), "13 ≤ got ≤ 19");
/// ```
#[track_caller]
#[must_use]
pub fn between(from: impl Into<Value>, to: impl Into<Value>) -> Value {
    between_with(from, to, Bounds::InIn)
}

/// Matches numbers between `from` and `to`, with the ends included or not
/// according to `bounds`.
#[track_caller]
#[must_use]
pub fn between_with(from: impl Into<Value>, to: impl Into<Value>, bounds: Bounds) -> Value {
    let base = Base::new("Between");
    let (mut from, mut to, mut bounds) = (from.into(), to.into(), bounds);
    let order = match (Num::of(&from), Num::of(&to)) {
        (Some(f), Some(t)) => f.cmp(t).ok_or_else(|| OperatorError::InvalidArgument {
            reason: "bounds must not be NaN".into(),
        }),
        _ => Err(OperatorError::InvalidArgument {
            reason: format!("bounds must be numbers, got {from} and {to}"),
        }),
    };
    if let Ok(Ordering::Greater) = order {
        std::mem::swap(&mut from, &mut to);
        bounds = bounds.mirrored();
    }
    Value::op(Between {
        base: base.check(order.map(drop)),
        from,
        to,
        bounds,
    })
}

impl Between {
    fn contains(&self, n: Num) -> bool {
        let (Some(from), Some(to)) = (Num::of(&self.from), Num::of(&self.to)) else {
            return false;
        };
        let above = match n.cmp(from) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.bounds.includes_from(),
            _ => false,
        };
        let below = match n.cmp(to) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.bounds.includes_to(),
            _ => false,
        };
        above && below
    }
}

impl Operator for Between {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let Some(n) = Num::of(got) else {
            return ctx.fail(|| {
                Report::new("type mismatch")
                    .got(Shown::raw(
                        got.type_of().map_or_else(|| "nil".to_string(), |t| t.to_string()),
                    ))
                    .expected(Shown::raw("a number"))
            });
        };
        if self.contains(n) {
            return Ok(());
        }
        ctx.fail(|| Report::differ(got.clone(), Shown::raw(self.render())))
    }

    fn expected_type(&self) -> Option<Type> {
        self.base.type_hint(self.from.type_of())
    }

    fn render(&self) -> String {
        self.base.render_with(|| {
            let lo = if self.bounds.includes_from() { "≤" } else { "<" };
            let hi = if self.bounds.includes_to() { "≤" } else { "<" };
            format!("{} {lo} got {hi} {}", self.from, self.to)
        })
    }

    fn base(&self) -> &Base {
        &self.base
    }
}
