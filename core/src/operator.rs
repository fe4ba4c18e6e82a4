//! `Operator`: pluggable matchers usable wherever an expected value can appear.
//!
//! An operator is wrapped in [`Value::Op`](crate::Value::Op) and placed on the
//! expected side. When the engine meets it, it hands the actual value over to
//! [`Operator::match_value`] together with the current [`Context`], so the
//! operator can compare however it likes, including by calling back into
//! the engine on sub-values ([`Context::deep_equal`], [`Context::matches`]).
//!
//! The trait is intentionally **non-generic**: operators work on the erased
//! [`Value`] and can be shared freely between comparisons and threads.
//!
//! # Construction errors
//!
//! Operators validate their arguments when built. A failed validation is
//! stored in the operator's [`Base`], never thrown: the engine reports it as
//! a "bad usage of X operator" mismatch, and [`Base::render_with`] renders
//! the operator as `X(<ERROR>)`.

use std::fmt::Debug;
use std::panic::Location;
use std::sync::OnceLock;

use crate::{Attribution, Context, MatchResult, OperatorError, Type, Value};

/// Matcher plugged into the structural comparison.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; operators live inside values
/// that are shared across threads.
///
/// # Example
///
/// ```
/// use deepmatch::{matches, Base, Context, MatchResult, Operator, Report, Value};
///
/// #[derive(Debug)]
/// struct Even {
///     base: Base,
/// }
///
/// impl Operator for Even {
///     fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult {
///         match got {
///             Value::Int(i, _) if i % 2 == 0 => Ok(()),
///             _ => ctx.fail(|| Report::new("not even").got(got.clone())),
///         }
///     }
///
///     fn render(&self) -> String {
///         self.base.render_with(|| "Even()".to_string())
///     }
///
///     fn base(&self) -> &Base {
///         &self.base
///     }
/// }
///
/// let even = Value::op(Even { base: Base::new("Even") });
/// assert!(matches(&4_i64, &even));
/// assert!(!matches(&5_i64, &even));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Operator`",
    label = "this type cannot be used as an expected-side matcher",
    note = "implement `match_value`, `render` and `base`, embedding a `Base` built in your constructor"
)]
pub trait Operator: Send + Sync + Debug {
    /// Compare `got` against this operator.
    ///
    /// `got` is never an operator. It is the absent value only if
    /// [`handles_absent`](Self::handles_absent) returns `true`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch raised through `ctx` (see [`Context::fail`]).
    fn match_value(&self, ctx: &Context<'_>, got: &Value) -> MatchResult;

    /// Whether this operator wants to see absent actual values.
    fn handles_absent(&self) -> bool {
        false
    }

    /// Best-effort type this operator expects, for introspection only.
    fn expected_type(&self) -> Option<Type> {
        None
    }

    /// Canonical rendering; stable across calls and safe to nest.
    fn render(&self) -> String;

    /// Shared scaffolding.
    fn base(&self) -> &Base;
}

/// Scaffolding every operator embeds.
///
/// Holds the operator's name, the call site it was built at, the stored
/// construction error and the cached rendering.
#[derive(Debug)]
pub struct Base {
    name: &'static str,
    location: &'static Location<'static>,
    error: Option<OperatorError>,
    rendered: OnceLock<String>,
}

impl Base {
    /// Record the operator name and the caller's location.
    ///
    /// Mark operator constructors `#[track_caller]` too, so the location is
    /// the user's call site rather than the constructor body.
    #[track_caller]
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            location: Location::caller(),
            error: None,
            rendered: OnceLock::new(),
        }
    }

    /// Store a construction error.
    #[must_use]
    pub fn with_error(mut self, error: OperatorError) -> Self {
        self.error = Some(error);
        self
    }

    /// Store the first construction error of `result`.
    #[must_use]
    pub fn check(self, result: Result<(), OperatorError>) -> Self {
        match result {
            Ok(()) => self,
            Err(e) => self.with_error(e),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The stored construction error.
    #[must_use]
    pub fn error(&self) -> Option<&OperatorError> {
        self.error.as_ref()
    }

    /// Render with `f` once and cache the result; `Name(<ERROR>)` when a
    /// construction error is stored.
    pub fn render_with(&self, f: impl FnOnce() -> String) -> String {
        if self.error.is_some() {
            return format!("{}(<ERROR>)", self.name);
        }
        self.rendered.get_or_init(f).clone()
    }

    /// `ty`, unless a construction error is stored.
    #[must_use]
    pub fn type_hint(&self, ty: Option<Type>) -> Option<Type> {
        if self.error.is_some() {
            None
        } else {
            ty
        }
    }

    /// Attribution for reports raised under this operator.
    #[must_use]
    pub fn attribution(&self) -> Attribution {
        Attribution {
            operator: self.name,
            location: self.location,
        }
    }
}

/// Best-effort type of an expected value: the operator's hint for operators,
/// the runtime type otherwise.
#[must_use]
pub fn type_hint_of(expected: &Value) -> Option<Type> {
    match expected {
        Value::Op(op) => op.expected_type(),
        other => other.type_of(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_location_is_caller() {
        let base = Base::new("Probe");
        assert_eq!(base.location().file(), file!());
        assert_eq!(base.attribution().operator, "Probe");
    }

    #[test]
    fn test_render_cached() {
        let calls = AtomicUsize::new(0);
        let base = Base::new("Probe");
        let render = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "Probe(1)".to_string()
        };
        assert_eq!(base.render_with(render), "Probe(1)");
        assert_eq!(base.render_with(render), "Probe(1)");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_surfaces() {
        let base = Base::new("Probe").check(Err(OperatorError::InvalidArgument {
            reason: "boom".into(),
        }));
        assert_eq!(base.render_with(|| "Probe(1)".into()), "Probe(<ERROR>)");
        assert_eq!(base.type_hint(Some(Type::I64)), None);
        assert!(base.error().is_some());
    }

    #[test]
    fn test_type_hint_of_literal() {
        assert_eq!(type_hint_of(&Value::from(1_u8)), Some(Type::U8));
        assert_eq!(type_hint_of(&Value::Invalid), None);
    }
}
