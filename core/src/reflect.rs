//! `Reflect`: turning ordinary Rust data into [`Value`]s.
//!
//! The entry points accept anything implementing [`Reflect`], so plain data
//! can be compared without building values by hand:
//!
//! ```
//! use std::collections::BTreeMap;
//! use deepmatch::{matches, Reflect, Type};
//!
//! let scores = BTreeMap::from([("ann", 3_u32), ("bob", 5)]);
//! assert_eq!(scores.reflect().type_of(), Some(Type::map(Type::Str, Type::U32)));
//! assert!(matches(&scores, &scores.clone()));
//! ```
//!
//! | Rust | `Type` |
//! |------|--------|
//! | `bool`, integers, floats | same-width scalar |
//! | `str`, `String` | `str` |
//! | `Vec<T>`, `[T]` | `Vec<T>` |
//! | `[T; N]` | `[T; N]` |
//! | `BTreeMap<K, V>`, `HashMap<K, V>` | `Map<K, V>` |
//! | `Option<T>` | `*T` (`None` is a nil pointer) |
//! | `&T`, `Box<T>`, `Arc<T>` | same as `T` |
//! | `Value` | `dyn Any` (the value itself) |

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::{Type, Value};

/// Conversion of Rust data into a [`Value`].
pub trait Reflect {
    /// Static type of reflected values.
    fn reflect_type() -> Type;

    /// Reflect this value.
    fn reflect(&self) -> Value;
}

/// Reflect any value; shorthand for [`Reflect::reflect`].
#[must_use]
pub fn reflect<T: Reflect + ?Sized>(value: &T) -> Value {
    value.reflect()
}

macro_rules! reflect_scalar {
    ($($t:ty => $ty:expr),* $(,)?) => {$(
        impl Reflect for $t {
            fn reflect_type() -> Type {
                $ty
            }

            fn reflect(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

reflect_scalar!(
    bool => Type::Bool,
    i8 => Type::I8,
    i16 => Type::I16,
    i32 => Type::I32,
    i64 => Type::I64,
    isize => Type::Isize,
    u8 => Type::U8,
    u16 => Type::U16,
    u32 => Type::U32,
    u64 => Type::U64,
    usize => Type::Usize,
    f32 => Type::F32,
    f64 => Type::F64,
);

impl Reflect for str {
    fn reflect_type() -> Type {
        Type::Str
    }

    fn reflect(&self) -> Value {
        Value::from(self)
    }
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::Str
    }

    fn reflect(&self) -> Value {
        Value::from(self.as_str())
    }
}

impl Reflect for Value {
    fn reflect_type() -> Type {
        Type::Dyn
    }

    fn reflect(&self) -> Value {
        self.clone()
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn reflect_type() -> Type {
        T::reflect_type()
    }

    fn reflect(&self) -> Value {
        (**self).reflect()
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn reflect_type() -> Type {
        T::reflect_type()
    }

    fn reflect(&self) -> Value {
        (**self).reflect()
    }
}

impl<T: Reflect + ?Sized> Reflect for Arc<T> {
    fn reflect_type() -> Type {
        T::reflect_type()
    }

    fn reflect(&self) -> Value {
        (**self).reflect()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect_type() -> Type {
        Type::ptr(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        match self {
            Some(v) => Value::ptr(T::reflect_type(), v.reflect()),
            None => Value::nil_ptr(T::reflect_type()),
        }
    }
}

impl<T: Reflect> Reflect for [T] {
    fn reflect_type() -> Type {
        Type::slice(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::slice(T::reflect_type(), self.iter().map(Reflect::reflect))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::slice(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        self.as_slice().reflect()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::array(T::reflect_type(), N)
    }

    fn reflect(&self) -> Value {
        Value::array(T::reflect_type(), self.iter().map(Reflect::reflect))
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::map(
            K::reflect_type(),
            V::reflect_type(),
            self.iter().map(|(k, v)| (k.reflect(), v.reflect())),
        )
    }
}

impl<K: Reflect, V: Reflect, S: BuildHasher> Reflect for HashMap<K, V, S> {
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::map(
            K::reflect_type(),
            V::reflect_type(),
            self.iter().map(|(k, v)| (k.reflect(), v.reflect())),
        )
    }
}
