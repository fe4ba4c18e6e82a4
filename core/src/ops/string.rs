//! String operators: prefix, suffix, containment and regular expressions.
//!
//! The actual value may be a `str` or a `Vec<u8>` holding UTF-8; anything
//! else is a "bad type" mismatch. [`contains`] also accepts sequences and
//! maps, looking for an element that matches.

use std::borrow::Cow;

use regex::Regex;

use crate::{
    Base, Context, MatchResult, Operator, OperatorError, Report, Shown, Type, Value,
    MAX_PATTERN_LENGTH, MAX_REGEX_PATTERN_LENGTH,
};

/// String view of the actual value, if it has one.
fn as_text(got: &Value) -> Option<Cow<'_, str>> {
    match got.unboxed() {
        Value::Str(s) => Some(Cow::Borrowed(&**s)),
        bytes @ Value::Slice { .. } => bytes
            .convert(&Type::Str)
            .and_then(|v| v.as_str().map(|s| Cow::Owned(s.to_string()))),
        _ => None,
    }
}

fn bad_type(ctx: &Context<'_>, got: &Value, wanted: &'static str) -> MatchResult {
    ctx.fail(|| {
        Report::new("bad type")
            .got(Shown::raw(
                got.type_of()
                    .map_or_else(|| "nil".to_string(), |t| t.to_string()),
            ))
            .expected(Shown::raw(wanted))
    })
}

fn check_length(pattern: &str, max: usize) -> Result<(), OperatorError> {
    if pattern.len() > max {
        return Err(OperatorError::PatternTooLong {
            len: pattern.len(),
            max,
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// HasPrefix / HasSuffix
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum Affix {
    Prefix,
    Suffix,
}

#[derive(Debug)]
struct HasAffix {
    base: Base,
    affix: Affix,
    pattern: String,
}

/// Matches strings starting with `prefix`.
#[track_caller]
#[must_use]
pub fn has_prefix(prefix: impl Into<String>) -> Value {
    affix(Base::new("HasPrefix"), Affix::Prefix, prefix.into())
}

/// Matches strings ending with `suffix`.
#[track_caller]
#[must_use]
pub fn has_suffix(suffix: impl Into<String>) -> Value {
    affix(Base::new("HasSuffix"), Affix::Suffix, suffix.into())
}

fn affix(base: Base, affix: Affix, pattern: String) -> Value {
    Value::op(HasAffix {
        base: base.check(check_length(&pattern, MAX_PATTERN_LENGTH)),
        affix,
        pattern,
    })
}

impl Operator for HasAffix {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let Some(text) = as_text(got) else {
            return bad_type(ctx, got, "str or Vec<u8>");
        };
        let ok = match self.affix {
            Affix::Prefix => text.starts_with(self.pattern.as_str()),
            Affix::Suffix => text.ends_with(self.pattern.as_str()),
        };
        if ok {
            return Ok(());
        }
        ctx.fail(|| Report::differ(got.clone(), Shown::raw(self.render())))
    }

    fn expected_type(&self) -> Option<Type> {
        self.base.type_hint(Some(Type::Str))
    }

    fn render(&self) -> String {
        self.base
            .render_with(|| format!("{}({:?})", self.base.name(), self.pattern))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Contains
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Contains {
    base: Base,
    expected: Value,
}

/// Matches strings containing `expected` (a string), and sequences or maps
/// holding an element that matches `expected` (a value or an operator).
///
/// ```
/// use deepmatch::{matches, ops};
///
/// assert!(matches(&"haystack", &ops::contains("st")));
/// assert!(matches(&vec![1_i64, 5, 9], &ops::contains(ops::between(4_i64, 6_i64))));
/// ```
#[track_caller]
#[must_use]
pub fn contains(expected: impl Into<Value>) -> Value {
    let base = Base::new("Contains");
    let expected = expected.into();
    let check = match expected.as_str() {
        Some(s) => check_length(s, MAX_PATTERN_LENGTH),
        None => Ok(()),
    };
    Value::op(Contains {
        base: base.check(check),
        expected,
    })
}

impl Operator for Contains {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let found = match got.unboxed() {
            Value::Array { .. } | Value::Slice { .. } => got
                .unboxed()
                .items()
                .unwrap_or_default()
                .iter()
                .any(|item| ctx.matches(item, &self.expected)),
            Value::Map { .. } => got
                .unboxed()
                .entries()
                .unwrap_or_default()
                .iter()
                .any(|(_, v)| ctx.matches(v, &self.expected)),
            _ => match (as_text(got), self.expected.as_str()) {
                (Some(text), Some(needle)) => text.contains(needle),
                (Some(_), None) => {
                    return bad_type(ctx, &self.expected, "a str to look for in a string")
                }
                _ => return bad_type(ctx, got, "str, a sequence or a map"),
            },
        };
        if found {
            return Ok(());
        }
        ctx.fail(|| {
            Report::new("does not contain")
                .got(got.clone())
                .expected(Shown::raw(self.render()))
        })
    }

    fn render(&self) -> String {
        self.base.render_with(|| format!("Contains({})", self.expected))
    }

    fn base(&self) -> &Base {
        &self.base
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Re
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Re {
    base: Base,
    pattern: String,
    regex: Option<Regex>,
    captures: Option<Value>,
}

/// Matches strings matching the regular expression `pattern`.
///
/// The pattern is compiled once, at construction. Patterns longer than
/// [`MAX_REGEX_PATTERN_LENGTH`] are rejected.
#[track_caller]
#[must_use]
pub fn re(pattern: &str) -> Value {
    regex_op(Base::new("Re"), pattern, None)
}

/// Matches strings matching `pattern` whose capture groups, as a
/// `Vec<str>`, match `captures`.
///
/// ```
/// use deepmatch::{matches, ops, Type, Value};
///
/// let expected = ops::re_captures(
///     r"^(\w+)@(\w+)\.com$",
///     Value::slice(Type::Str, ["bob".into(), ops::any(["example".into(), "test".into()])]),
/// );
/// assert!(matches(&"bob@example.com", &expected));
/// ```
#[track_caller]
#[must_use]
pub fn re_captures(pattern: &str, captures: impl Into<Value>) -> Value {
    regex_op(Base::new("Re"), pattern, Some(captures.into()))
}

fn regex_op(base: Base, pattern: &str, captures: Option<Value>) -> Value {
    let compiled = check_length(pattern, MAX_REGEX_PATTERN_LENGTH).and_then(|()| {
        Regex::new(pattern).map_err(|e| OperatorError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
    });
    let (regex, check) = match compiled {
        Ok(regex) => (Some(regex), Ok(())),
        Err(e) => (None, Err(e)),
    };
    Value::op(Re {
        base: base.check(check),
        pattern: pattern.to_string(),
        regex,
        captures,
    })
}

impl Operator for Re {
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
        let Some(text) = as_text(got) else {
            return bad_type(ctx, got, "str or Vec<u8>");
        };
        // construction errors are reported before match_value is reached
        let Some(regex) = &self.regex else {
            return ctx.fail(|| Report::new("regex failed to compile"));
        };
        let Some(expected) = &self.captures else {
            if regex.is_match(&text) {
                return Ok(());
            }
            return ctx.fail(|| Report::differ(got.clone(), Shown::raw(self.render())));
        };
        let Some(caps) = regex.captures(&text) else {
            return ctx.fail(|| Report::differ(got.clone(), Shown::raw(self.render())));
        };
        let groups = Value::slice(
            Type::Str,
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(|| Value::from(""), |m| Value::from(m.as_str()))),
        );
        ctx.label("<captures>").deep_equal(&groups, expected)
    }

    fn expected_type(&self) -> Option<Type> {
        self.base.type_hint(Some(Type::Str))
    }

    fn render(&self) -> String {
        self.base.render_with(|| match &self.captures {
            None => format!("Re({:?})", self.pattern),
            Some(captures) => format!("Re({:?}, {captures})", self.pattern),
        })
    }

    fn base(&self) -> &Base {
        &self.base
    }
}
