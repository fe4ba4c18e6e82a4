//! Anchors: operators hidden behind placeholder values.
//!
//! Some expected values are built by code that only accepts concrete types
//! (a struct literal, a typed map). An anchor lets such code carry an
//! operator anyway: bind the operator to a placeholder value of the right
//! type, put the placeholder where the operator should be, and the engine
//! swaps it back when it meets the placeholder during a comparison.
//!
//! # Example
//!
//! ```
//! use deepmatch::{ops, matches_with, Anchors, Config, Record, Type};
//!
//! let mut anchors = Anchors::new();
//! let age = anchors.anchor(&Type::I64, ops::between(18_i64, 65_i64)).unwrap();
//! let expected = Record::new("Person").field("name", "Bob").field("age", age).build();
//! let config = Config::builder().anchors(anchors).build();
//!
//! let got = Record::new("Person").field("name", "Bob").field("age", 42_i64).build();
//! assert!(matches_with(&config, &got, &expected));
//! ```

use std::collections::HashMap;

use crate::value::lookup;
use crate::types::UintType;
use crate::{type_hint_of, AnchorError, FloatType, Type, Value};

/// Placeholder → operator bindings.
///
/// Placeholders match by exact value and type; `42_i64` and `42_i32` are
/// different placeholders.
#[derive(Debug, Clone, Default)]
pub struct Anchors {
    /// Sorted by placeholder (see [`Value::sort_cmp`]); values are operators.
    bindings: Vec<(Value, Value)>,
    /// Placeholders handed out so far, per type.
    generated: HashMap<Type, u64>,
}

impl Anchors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind `op` to an explicit placeholder.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NotAnOperator`] if `op` is not an operator,
    /// [`AnchorError::Unsupported`] if the placeholder is absent or itself an
    /// operator, [`AnchorError::AlreadyBound`] if it is already bound.
    pub fn bind(&mut self, placeholder: Value, op: Value) -> Result<(), AnchorError> {
        if !op.is_operator() {
            return Err(AnchorError::NotAnOperator {
                got: op.to_string(),
            });
        }
        if placeholder.is_invalid() || placeholder.is_operator() {
            return Err(AnchorError::Unsupported {
                ty: placeholder
                    .type_of()
                    .map_or_else(|| "nil".to_string(), |t| t.to_string()),
            });
        }
        match self
            .bindings
            .binary_search_by(|(k, _)| k.sort_cmp(&placeholder))
        {
            Ok(_) => Err(AnchorError::AlreadyBound {
                placeholder: placeholder.to_string(),
            }),
            Err(at) => {
                self.bindings.insert(at, (placeholder, op));
                Ok(())
            }
        }
    }

    /// Bind `op` to a fresh placeholder of type `ty` and return it.
    ///
    /// Each type has its own sequence: integers count down from the type's
    /// maximum, floats down from the largest finite value, strings are
    /// `<anchor#N>`. Placeholders already bound with [`bind`](Self::bind) are
    /// skipped.
    ///
    /// # Errors
    ///
    /// [`AnchorError::Unsupported`] for types without generated placeholders,
    /// [`AnchorError::Exhausted`] once the type has no value left, or
    /// [`AnchorError::NotAnOperator`].
    pub fn anchor(&mut self, ty: &Type, op: Value) -> Result<Value, AnchorError> {
        loop {
            let placeholder = self.placeholder(ty)?;
            match self.bind(placeholder.clone(), op.clone()) {
                Ok(()) => return Ok(placeholder),
                Err(AnchorError::AlreadyBound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// [`anchor`](Self::anchor) using the operator's own type hint.
    ///
    /// # Errors
    ///
    /// [`AnchorError::NoTypeHint`] if the operator does not know its type.
    pub fn anchor_op(&mut self, op: Value) -> Result<Value, AnchorError> {
        let ty = type_hint_of(&op).ok_or_else(|| AnchorError::NoTypeHint {
            operator: op.to_string(),
        })?;
        self.anchor(&ty, op)
    }

    /// Operator bound to `expected`, if `expected` is a placeholder.
    pub(crate) fn resolve(&self, expected: &Value) -> Option<&Value> {
        if self.bindings.is_empty() {
            return None;
        }
        lookup(&self.bindings, expected)
    }

    fn placeholder(&mut self, ty: &Type) -> Result<Value, AnchorError> {
        let n = self.generated.get(ty).copied().unwrap_or(0);
        let placeholder = match ty {
            Type::Int(t) => {
                let (min, max) = t.bounds();
                i64::try_from(n)
                    .ok()
                    .and_then(|n| max.checked_sub(n))
                    .filter(|v| *v >= min)
                    .map(|v| Value::Int(v, *t))
            }
            Type::Uint(t) => UintType::max(*t).checked_sub(n).map(|v| Value::Uint(v, *t)),
            Type::Float(FloatType::F64) => f64::MAX
                .to_bits()
                .checked_sub(n)
                .map(f64::from_bits)
                .filter(|f| f.is_finite() && *f > 0.0)
                .map(|f| Value::Float(f, FloatType::F64)),
            Type::Float(FloatType::F32) => u32::try_from(n)
                .ok()
                .and_then(|n| f32::MAX.to_bits().checked_sub(n))
                .map(f32::from_bits)
                .filter(|f| f.is_finite() && *f > 0.0)
                .map(|f| Value::Float(f64::from(f), FloatType::F32)),
            Type::Str => Some(Value::string(format!("<anchor#{n}>"))),
            other => {
                return Err(AnchorError::Unsupported {
                    ty: other.to_string(),
                })
            }
        };
        let placeholder = placeholder.ok_or_else(|| AnchorError::Exhausted {
            ty: ty.to_string(),
        })?;
        self.generated.insert(ty.clone(), n + 1);
        Ok(placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;

    #[test]
    fn test_generated_placeholders() {
        let mut anchors = Anchors::new();
        let a = anchors.anchor(&Type::I8, ops::not_nil()).unwrap();
        let b = anchors.anchor(&Type::I8, ops::not_nil()).unwrap();
        assert!(matches!(a, Value::Int(127, _)));
        assert!(matches!(b, Value::Int(126, _)));
        // each type counts on its own
        let s = anchors.anchor(&Type::Str, ops::not_nil()).unwrap();
        assert_eq!(s.as_str(), Some("<anchor#0>"));
        let u = anchors.anchor(&Type::U16, ops::not_nil()).unwrap();
        assert!(matches!(u, Value::Uint(65535, _)));
        let f = anchors.anchor(&Type::F64, ops::not_nil()).unwrap();
        assert!(matches!(f, Value::Float(x, _) if x == f64::MAX));
        let g = anchors.anchor(&Type::F64, ops::not_nil()).unwrap();
        assert!(matches!(g, Value::Float(x, _) if x < f64::MAX && x > 1e300));
        assert_eq!(anchors.len(), 6);
    }

    #[test]
    fn test_other_types_do_not_use_up_placeholders() {
        let mut anchors = Anchors::new();
        for _ in 0..300 {
            anchors.anchor(&Type::Str, ops::not_nil()).unwrap();
        }
        let u = anchors.anchor(&Type::U8, ops::not_nil()).unwrap();
        assert!(matches!(u, Value::Uint(255, _)));
        let i = anchors.anchor(&Type::I8, ops::not_nil()).unwrap();
        assert!(matches!(i, Value::Int(127, _)));
    }

    #[test]
    fn test_exhausted() {
        let mut anchors = Anchors::new();
        for expected in (0..=255_u64).rev() {
            let p = anchors.anchor(&Type::U8, ops::not_nil()).unwrap();
            assert!(matches!(p, Value::Uint(v, _) if v == expected));
        }
        assert!(matches!(
            anchors.anchor(&Type::U8, ops::not_nil()),
            Err(AnchorError::Exhausted { .. })
        ));

        let mut anchors = Anchors::new();
        let placeholders: Vec<Value> = (0..256)
            .map(|_| anchors.anchor(&Type::I8, ops::not_nil()).unwrap())
            .collect();
        assert!(placeholders
            .iter()
            .all(|p| matches!(p, Value::Int(v, _) if (-128..=127).contains(v))));
        let err = anchors.anchor(&Type::I8, ops::not_nil()).unwrap_err();
        assert_eq!(err.to_string(), "no placeholder left for type i8");
    }

    #[test]
    fn test_skips_explicitly_bound_placeholders() {
        let mut anchors = Anchors::new();
        anchors.bind(Value::from(127_i8), ops::ignore()).unwrap();
        let p = anchors.anchor(&Type::I8, ops::not_nil()).unwrap();
        assert!(matches!(p, Value::Int(126, _)));
    }

    #[test]
    fn test_resolve_exact_type() {
        let mut anchors = Anchors::new();
        anchors.bind(42_i64.into(), ops::ignore()).unwrap();
        assert!(anchors.resolve(&42_i64.into()).is_some());
        assert!(anchors.resolve(&42_i32.into()).is_none());
        assert!(anchors.resolve(&41_i64.into()).is_none());
    }

    #[test]
    fn test_bind_errors() {
        let mut anchors = Anchors::new();
        assert!(matches!(
            anchors.bind(1_i64.into(), 2_i64.into()),
            Err(AnchorError::NotAnOperator { .. })
        ));
        assert!(matches!(
            anchors.bind(Value::Invalid, ops::ignore()),
            Err(AnchorError::Unsupported { .. })
        ));
        anchors.bind("x".into(), ops::ignore()).unwrap();
        assert!(matches!(
            anchors.bind("x".into(), ops::ignore()),
            Err(AnchorError::AlreadyBound { .. })
        ));
        assert!(matches!(
            anchors.anchor(&Type::Bool, ops::ignore()),
            Err(AnchorError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_anchor_op_needs_hint() {
        let mut anchors = Anchors::new();
        let p = anchors.anchor_op(ops::between(1_u32, 5_u32)).unwrap();
        assert_eq!(p.type_of(), Some(Type::U32));
        assert!(matches!(
            anchors.anchor_op(ops::ignore()),
            Err(AnchorError::NoTypeHint { .. })
        ));
    }
}
