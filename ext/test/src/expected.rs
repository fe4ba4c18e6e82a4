//! Expected documents: JSON-shaped data with embedded operators.
//!
//! | Key | Argument | Operator |
//! |-----|----------|----------|
//! | `$between` | `[from, to]` or `[from, to, "[]" \| "[)" \| "(]" \| "()"]` | [`ops::between_with`] |
//! | `$nil`, `$not_nil`, `$ignore` | anything | [`ops::nil`], [`ops::not_nil`], [`ops::ignore`] |
//! | `$all`, `$any`, `$none` | list of expected | [`ops::all`], [`ops::any`], [`ops::none`] |
//! | `$not` | expected | [`ops::not`] |
//! | `$has_prefix`, `$has_suffix` | string | [`ops::has_prefix`], [`ops::has_suffix`] |
//! | `$contains` | expected | [`ops::contains`] |
//! | `$re` | pattern, or `[pattern, captures]` | [`ops::re`], [`ops::re_captures`] |
//! | `$len` | expected length | [`ops::len`] |
//! | `$lax` | expected | [`ops::lax`] |
//! | `$smuggle_field` | `[path, expected]` | [`ops::smuggle_field`] |
//!
//! Anything else converts like the actual document does: objects become
//! `Map<str, dyn Any>`, arrays `Vec<dyn Any>`, `null` the absent value.

use deepmatch::ops::{self, Bounds};
use deepmatch::{Type, Value};
use serde_json::Value as Json;

use crate::FixtureError;

/// Converts an expected document into a [`Value`], building operators for
/// `$name` keys.
///
/// # Errors
///
/// [`FixtureError::UnknownOperator`] for an unknown `$name`, and
/// [`FixtureError::BadArguments`] when an operator's argument has the
/// wrong shape.
pub fn build_expected(json: &Json) -> Result<Value, FixtureError> {
    match json {
        Json::Array(items) => Ok(Value::list(
            items.iter().map(build_expected).collect::<Result<Vec<_>, _>>()?,
        )),
        Json::Object(fields) => {
            if fields.len() == 1 {
                if let Some((key, arg)) = fields.iter().next() {
                    if let Some(name) = key.strip_prefix('$') {
                        return operator(name, arg);
                    }
                }
            }
            let entries = fields
                .iter()
                .map(|(k, v)| Ok((Value::from(k.as_str()), build_expected(v)?)))
                .collect::<Result<Vec<_>, FixtureError>>()?;
            Ok(Value::map(Type::Str, Type::Dyn, entries))
        }
        scalar => Ok(Value::from(scalar)),
    }
}

fn bad(operator: &str, reason: impl Into<String>) -> FixtureError {
    FixtureError::BadArguments {
        operator: operator.to_string(),
        reason: reason.into(),
    }
}

fn list<'a>(name: &str, arg: &'a Json) -> Result<&'a [Json], FixtureError> {
    arg.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| bad(name, "expected a list"))
}

fn string<'a>(name: &str, arg: &'a Json) -> Result<&'a str, FixtureError> {
    arg.as_str().ok_or_else(|| bad(name, "expected a string"))
}

fn children(name: &str, arg: &Json) -> Result<Vec<Value>, FixtureError> {
    list(name, arg)?.iter().map(build_expected).collect()
}

fn operator(name: &str, arg: &Json) -> Result<Value, FixtureError> {
    let op = match name {
        "between" => {
            let (from, to, bounds) = match list(name, arg)? {
                [from, to] => (from, to, Bounds::InIn),
                [from, to, Json::String(b)] => (from, to, parse_bounds(name, b)?),
                _ => return Err(bad(name, "expected [from, to] or [from, to, bounds]")),
            };
            ops::between_with(Value::from(from), Value::from(to), bounds)
        }
        "nil" => ops::nil(),
        "not_nil" => ops::not_nil(),
        "ignore" => ops::ignore(),
        "all" => ops::all(children(name, arg)?),
        "any" => ops::any(children(name, arg)?),
        "none" => ops::none(children(name, arg)?),
        "not" => ops::not(build_expected(arg)?),
        "has_prefix" => ops::has_prefix(string(name, arg)?),
        "has_suffix" => ops::has_suffix(string(name, arg)?),
        "contains" => ops::contains(build_expected(arg)?),
        "re" => match arg {
            Json::String(pattern) => ops::re(pattern),
            Json::Array(parts) => match parts.as_slice() {
                [Json::String(pattern), captures] => {
                    ops::re_captures(pattern, captures_of(name, captures)?)
                }
                _ => return Err(bad(name, "expected [pattern, captures]")),
            },
            _ => return Err(bad(name, "expected a pattern")),
        },
        "len" => ops::len(length(arg)?),
        "lax" => ops::lax(build_expected(arg)?),
        "smuggle_field" => match list(name, arg)? {
            [Json::String(path), expected] => ops::smuggle_field(path, build_expected(expected)?),
            _ => return Err(bad(name, "expected [path, expected]")),
        },
        _ => {
            return Err(FixtureError::UnknownOperator {
                name: name.to_string(),
            })
        }
    };
    Ok(op)
}

fn parse_bounds(name: &str, spec: &str) -> Result<Bounds, FixtureError> {
    match spec {
        "[]" => Ok(Bounds::InIn),
        "[)" => Ok(Bounds::InOut),
        "(]" => Ok(Bounds::OutIn),
        "()" => Ok(Bounds::OutOut),
        other => Err(bad(name, format!("unknown bounds {other:?}"))),
    }
}

/// Capture groups are strings: a literal list becomes a `Vec<str>`.
fn captures_of(name: &str, captures: &Json) -> Result<Value, FixtureError> {
    match captures {
        Json::Array(items) => {
            let items = items
                .iter()
                .map(|item| match item {
                    Json::String(s) => Ok(Value::from(s.as_str())),
                    other => build_expected(other),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::slice(Type::Str, items))
        }
        Json::Object(_) => build_expected(captures),
        _ => Err(bad(name, "captures must be a list or an operator")),
    }
}

/// Lengths are `usize`; literal integers are converted, operators kept.
fn length(arg: &Json) -> Result<Value, FixtureError> {
    match arg.as_u64() {
        Some(n) => usize::try_from(n)
            .map(Value::from)
            .map_err(|e| bad("len", e.to_string())),
        None if arg.is_object() => build_expected(arg),
        None => Err(bad("len", "expected a non-negative integer or an operator")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepmatch::matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_documents() {
        let expected = build_expected(&json!({"a": [1, "x", null]})).unwrap();
        assert!(matches(&json!({"a": [1, "x", null]}), &expected));
        assert!(!matches(&json!({"a": [1, "y", null]}), &expected));
    }

    #[test]
    fn test_operators() {
        let expected = build_expected(&json!({
            "age": {"$between": [18, 65]},
            "name": {"$all": [{"$has_prefix": "a"}, {"$len": 3}]},
            "nick": {"$nil": null},
        }))
        .unwrap();
        assert!(matches(&json!({"age": 30, "name": "ada", "nick": null}), &expected));
        assert!(!matches(&json!({"age": 30, "name": "adam", "nick": null}), &expected));
    }

    #[test]
    fn test_unknown_operator() {
        let err = build_expected(&json!({"$frobnicate": 1})).unwrap_err();
        assert!(matches!(err, FixtureError::UnknownOperator { name } if name == "frobnicate"));
    }

    #[test]
    fn test_bad_arguments() {
        let err = build_expected(&json!({"$between": 3})).unwrap_err();
        assert_eq!(err.to_string(), "bad arguments for $between: expected a list");
    }

    #[test]
    fn test_dollar_keys_among_others_are_data() {
        let expected = build_expected(&json!({"$ref": 1, "id": 2})).unwrap();
        assert!(matches(&json!({"$ref": 1, "id": 2}), &expected));
    }
}
