//! Smuggling: compare a value derived from the actual one.

use std::fmt;
use std::sync::Arc;

use crate::{
    type_hint_of, Base, Context, MatchResult, Operator, OperatorError, Report, Summary, Type,
    Value,
};

type SmuggleFn = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

enum Via {
    /// Custom transform, shown as `<label>` in paths.
    Func { label: String, f: SmuggleFn },
    /// Dotted field path through records, maps and pointers.
    Fields(Vec<Arc<str>>),
}

struct Smuggle {
    base: Base,
    via: Via,
    expected: Value,
}

impl fmt::Debug for Smuggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let via = match &self.via {
            Via::Func { label, .. } => label.clone(),
            Via::Fields(fields) => fields.join("."),
        };
        f.debug_struct("Smuggle")
            .field("via", &via)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

/// Transforms the actual value with `f`, then compares the result against
/// `expected`.
///
/// The path gains a `<label>` segment. `f` also sees absent values.
///
/// ```
/// use deepmatch::{explain, ops, Value};
///
/// let parsed = ops::smuggle("parsed", |v: &Value| {
///     let s = v.as_str().ok_or("not a string")?;
///     s.parse::<i64>().map(Value::from).map_err(|e| e.to_string())
/// }, ops::between(1_i64, 9_i64));
/// assert!(explain(&"7", &parsed).is_none());
/// assert_eq!(explain(&"12", &parsed).unwrap().path, "DATA<parsed>");
/// ```
#[track_caller]
#[must_use]
pub fn smuggle<F>(label: impl Into<String>, f: F, expected: impl Into<Value>) -> Value
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
{
    Value::op(Smuggle {
        base: Base::new("Smuggle"),
        via: Via::Func {
            label: label.into(),
            f: Box::new(f),
        },
        expected: expected.into(),
    })
}

/// Follows the dotted `path` of field names (or string map keys) into the
/// actual value, then compares what it finds against `expected`.
///
/// Pointers and dynamic values along the way are followed transparently.
///
/// ```
/// use deepmatch::{matches, ops, Record};
///
/// let order = Record::new("Order")
///     .field("customer", Record::new("Customer").field("name", "Ann").build())
///     .build();
/// assert!(matches(&order, &ops::smuggle_field("customer.name", "Ann")));
/// ```
#[track_caller]
#[must_use]
pub fn smuggle_field(path: &str, expected: impl Into<Value>) -> Value {
    let base = Base::new("Smuggle");
    let fields: Vec<Arc<str>> = path.split('.').map(Arc::from).collect();
    let check = if fields.iter().any(|f| f.is_empty()) {
        Err(OperatorError::InvalidArgument {
            reason: format!("invalid field path {path:?}"),
        })
    } else {
        Ok(())
    };
    Value::op(Smuggle {
        base: base.check(check),
        via: Via::Fields(fields),
        expected: expected.into(),
    })
}

/// Look `name` up in `value`, through pointers and dynamic values.
fn field<'v>(value: &'v Value, name: &str) -> Result<&'v Value, String> {
    let mut current = value;
    loop {
        current = match current {
            Value::Dyn(Some(inner)) => inner,
            Value::Ptr { .. } => current
                .pointee()
                .ok_or_else(|| format!("nil pointer while looking for field {name:?}"))?,
            _ => break,
        };
    }
    match current {
        Value::Struct(record) => record
            .get(name)
            .ok_or_else(|| format!("{} has no field {name:?}", record.name())),
        Value::Map { .. } => current
            .get(&Value::from(name))
            .ok_or_else(|| format!("map has no key {name:?}")),
        other => Err(format!(
            "cannot look for field {name:?} in {}",
            other
                .type_of()
                .map_or_else(|| "nil".to_string(), |t| t.to_string())
        )),
    }
}

impl Operator for Smuggle {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        match &self.via {
            Via::Func { label, f } => match f(got) {
                Ok(smuggled) => ctx
                    .label(format!("<{label}>"))
                    .deep_equal(&smuggled, &self.expected),
                Err(reason) => ctx.fail(|| {
                    Report::new("smuggle function failed")
                        .got(got.clone())
                        .summary(Summary::text(reason))
                }),
            },
            Via::Fields(fields) => {
                let mut ctx = ctx.clone();
                let mut current = got;
                for name in fields {
                    current = match field(current, name) {
                        Ok(v) => v,
                        Err(reason) => {
                            return ctx.fail(|| {
                                Report::new("cannot smuggle")
                                    .got(got.clone())
                                    .summary(Summary::text(reason))
                            })
                        }
                    };
                    ctx = ctx.field(Arc::clone(name));
                }
                ctx.deep_equal(current, &self.expected)
            }
        }
    }

    fn handles_absent(&self) -> bool {
        matches!(self.via, Via::Func { .. })
    }

    fn expected_type(&self) -> Option<Type> {
        self.base.type_hint(type_hint_of(&self.expected))
    }

    fn render(&self) -> String {
        self.base.render_with(|| match &self.via {
            Via::Func { label, .. } => format!("Smuggle(<{label}>, {})", self.expected),
            Via::Fields(fields) => format!("Smuggle({:?}, {})", fields.join("."), self.expected),
        })
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{between, nil};
    use crate::{explain, matches, Record, Type};
    use pretty_assertions::assert_eq;

    fn order() -> Value {
        let customer = Record::new("Customer").field("name", "Ann").field("age", 31_i64).build();
        Record::new("Order")
            .field("id", 7_i64)
            .field("customer", Value::ptr(Type::record("Customer"), customer))
            .build()
    }

    #[test]
    fn test_field_path() {
        assert!(matches(&order(), &smuggle_field("customer.age", between(30_i64, 40_i64))));
        let report = explain(&order(), &smuggle_field("customer.name", "Bob")).unwrap();
        assert_eq!(report.path, "DATA.customer.name");
    }

    #[test]
    fn test_missing_field() {
        let report = explain(&order(), &smuggle_field("customer.email", "x")).unwrap();
        assert_eq!(report.message, "cannot smuggle");
        assert_eq!(
            report.summary.unwrap(),
            Summary::text("Customer has no field \"email\"")
        );
    }

    #[test]
    fn test_map_keys_as_fields() {
        let m = Value::map(Type::Str, Type::I64, [("x".into(), 1_i64.into())]);
        assert!(matches(&m, &smuggle_field("x", 1_i64)));
    }

    #[test]
    fn test_invalid_path() {
        let op = smuggle_field("a..b", 1_i64);
        assert_eq!(op.to_string(), "Smuggle(<ERROR>)");
    }

    #[test]
    fn test_func_sees_absent() {
        let op = smuggle("is_absent", |v: &Value| Ok(Value::from(v.is_invalid())), true);
        assert!(matches(&Value::Invalid, &op));
        assert!(matches(&Value::Invalid, &smuggle("same", |v: &Value| Ok(v.clone()), nil())));
    }

    #[test]
    fn test_func_failure() {
        let op = smuggle("boom", |_: &Value| Err("exploded".to_string()), 1_i64);
        let report = explain(&1_i64, &op).unwrap();
        assert_eq!(report.message, "smuggle function failed");
        assert_eq!(op.to_string(), "Smuggle(<boom>, 1)");
    }
}
