//! Type-keyed hooks consulted before structural comparison.
//!
//! Hooks are registered once through [`HooksBuilder`] and frozen into an
//! immutable [`Hooks`] table, carried by [`Config`](crate::Config).
//!
//! # Hook kinds
//!
//! | Hook | Keyed by | Effect |
//! |------|----------|--------|
//! | smuggle | actual's type | replace actual before comparing |
//! | compare | (actual's type, expected's type) | decide the comparison |
//! | ignore private | record type | skip private fields |
//! | use equal | custom type | compare with [`CustomValue::equal`](crate::CustomValue::equal) |
//!
//! Registration erases the concrete closure type into an `Arc<dyn Fn>`, the
//! way handlers are erased at registration time and invoked late.
//!
//! # Example
//!
//! ```
//! use deepmatch::{matches_with, Config, HooksBuilder, Type, Value};
//!
//! // compare strings case-insensitively
//! let hooks = HooksBuilder::new()
//!     .compare(Type::Str, Type::Str, |got, expected| {
//!         let (Some(g), Some(e)) = (got.as_str(), expected.as_str()) else {
//!             return Err("not strings".into());
//!         };
//!         Ok(g.eq_ignore_ascii_case(e))
//!     })
//!     .build();
//! let config = Config::builder().hooks(hooks).build();
//! assert!(matches_with(&config, &"HeLLo", &"hello"));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::{CustomValue, Type, Value, MAX_SMUGGLE_CHAIN};

type SmuggleFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;
type CompareFn = Arc<dyn Fn(&Value, &Value) -> Result<bool, String> + Send + Sync>;

/// Builder for [`Hooks`].
#[derive(Default)]
pub struct HooksBuilder {
    smugglers: HashMap<Type, SmuggleFn>,
    comparers: HashMap<(Type, Type), CompareFn>,
    ignore_private: HashSet<Type>,
    use_equal: HashSet<Type>,
}

impl HooksBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform actual values of type `ty` before they are compared.
    ///
    /// Returning an error makes the comparison fail. A later registration for
    /// the same type replaces the earlier one.
    #[must_use]
    pub fn smuggle<F>(mut self, ty: Type, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.smugglers.insert(ty, Arc::new(f));
        self
    }

    /// [`smuggle`](Self::smuggle) for a [`CustomValue`] type, with the
    /// downcast done for you.
    #[must_use]
    pub fn smuggle_custom<T, F>(self, f: F) -> Self
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.smuggle(Type::custom::<T>(), move |v| f(downcast::<T>(v)?))
    }

    /// Decide comparisons of `got` (type `got_ty`) against `expected` (type
    /// `expected_ty`).
    ///
    /// `Ok(false)` reports "values differ", an error reports "hook failed".
    #[must_use]
    pub fn compare<F>(mut self, got_ty: Type, expected_ty: Type, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.comparers.insert((got_ty, expected_ty), Arc::new(f));
        self
    }

    /// [`compare`](Self::compare) for a pair of [`CustomValue`] types.
    #[must_use]
    pub fn compare_custom<A, B, F>(self, f: F) -> Self
    where
        A: CustomValue + 'static,
        B: CustomValue + 'static,
        F: Fn(&A, &B) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.compare(Type::custom::<A>(), Type::custom::<B>(), move |g, e| {
            f(downcast::<A>(g)?, downcast::<B>(e)?)
        })
    }

    /// Skip private fields of records of type `ty`.
    #[must_use]
    pub fn ignore_private(mut self, ty: Type) -> Self {
        self.ignore_private.insert(ty);
        self
    }

    /// Compare values of custom type `ty` with their `equal` method.
    #[must_use]
    pub fn use_equal(mut self, ty: Type) -> Self {
        self.use_equal.insert(ty);
        self
    }

    /// Freeze the table.
    #[must_use]
    pub fn build(self) -> Hooks {
        Hooks {
            smugglers: self.smugglers,
            comparers: self.comparers,
            ignore_private: self.ignore_private,
            use_equal: self.use_equal,
        }
    }
}

/// Immutable hook table.
#[derive(Clone, Default)]
pub struct Hooks {
    smugglers: HashMap<Type, SmuggleFn>,
    comparers: HashMap<(Type, Type), CompareFn>,
    ignore_private: HashSet<Type>,
    use_equal: HashSet<Type>,
}

impl Hooks {
    /// Returns `true` if no hook of any kind is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.smugglers.is_empty()
            && self.comparers.is_empty()
            && self.ignore_private.is_empty()
            && self.use_equal.is_empty()
    }

    /// Run the smuggle hooks for `got`.
    ///
    /// Hooks chain: the result of one hook goes through the hook registered
    /// for its own type, until no hook applies or a hook returns its input
    /// type. Returns `Ok(None)` when no hook applies.
    pub(crate) fn smuggle(&self, got: &Value) -> Result<Option<Value>, String> {
        if self.smugglers.is_empty() {
            return Ok(None);
        }
        let mut current: Option<Value> = None;
        for _ in 0..MAX_SMUGGLE_CHAIN {
            let value = current.as_ref().unwrap_or(got);
            let Some(ty) = value.type_of() else {
                return Ok(current);
            };
            let Some(hook) = self.smugglers.get(&ty) else {
                return Ok(current);
            };
            let next = hook(value)?;
            let stop = next.type_of().as_ref() == Some(&ty);
            current = Some(next);
            if stop {
                return Ok(current);
            }
        }
        Err(format!(
            "smuggle hooks chained more than {MAX_SMUGGLE_CHAIN} times"
        ))
    }

    pub(crate) fn comparer(&self, got_ty: &Type, expected_ty: &Type) -> Option<&CompareFn> {
        if self.comparers.is_empty() {
            return None;
        }
        self.comparers.get(&(got_ty.clone(), expected_ty.clone()))
    }

    pub(crate) fn ignores_private(&self, ty: &Type) -> bool {
        self.ignore_private.contains(ty)
    }

    pub(crate) fn uses_equal(&self, ty: &Type) -> bool {
        self.use_equal.contains(ty)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("smugglers", &self.smugglers.keys().collect::<Vec<_>>())
            .field("comparers", &self.comparers.keys().collect::<Vec<_>>())
            .field("ignore_private", &self.ignore_private)
            .field("use_equal", &self.use_equal)
            .finish()
    }
}

fn downcast<T: CustomValue + 'static>(v: &Value) -> Result<&T, String> {
    match v {
        Value::Custom(c) => c
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| format!("expected a {}, got a {}", std::any::type_name::<T>(), c.custom_type_name())),
        other => Err(format!(
            "expected a {}, got {}",
            std::any::type_name::<T>(),
            other.type_of().map_or_else(|| "nil".to_string(), |t| t.to_string())
        )),
    }
}
