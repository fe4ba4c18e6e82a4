//! `Type` and `Kind`: runtime type descriptors for [`Value`](crate::Value).
//!
//! Every non-absent value carries a `Type`. The engine compares types before
//! recursing (a type mismatch is terminal unless lax coercion or an operator
//! takes over), and hooks are keyed by `Type`.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Signed integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntType {
    /// Inclusive bounds of this width.
    #[must_use]
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            // isize is at most 64 bits on every supported target
            Self::I64 | Self::Isize => (i64::MIN, i64::MAX),
        }
    }

    /// Returns `true` if `v` is representable in this width.
    #[must_use]
    pub fn fits(self, v: i64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&v)
    }

    fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
        }
    }
}

/// Unsigned integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UintType {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl UintType {
    /// Inclusive upper bound of this width.
    #[must_use]
    pub fn max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX.into(),
            Self::U64 | Self::Usize => u64::MAX,
        }
    }

    /// Returns `true` if `v` is representable in this width.
    #[must_use]
    pub fn fits(self, v: u64) -> bool {
        v <= self.max()
    }

    fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
        }
    }
}

/// Floating point widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatType {
    F32,
    F64,
}

impl FloatType {
    fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// Identity of a [`CustomValue`](crate::CustomValue) type.
///
/// Equality and hashing use the Rust [`TypeId`] only; the name is for display.
#[derive(Debug, Clone, Copy)]
pub struct CustomType {
    id: TypeId,
    name: &'static str,
}

impl CustomType {
    /// Custom type identity for the Rust type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn new(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Display name of the custom type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CustomType {}

impl Hash for CustomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Category of a [`Type`].
///
/// The declaration order doubles as the rank used when sorting values of
/// different kinds (see [`Value::sort_cmp`](crate::Value::sort_cmp)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Invalid,
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Array,
    Slice,
    Map,
    Ptr,
    Struct,
    Dyn,
    Func,
    Chan,
    Custom,
    Operator,
}

/// Runtime type of a [`Value`](crate::Value).
///
/// # Example
///
/// ```
/// use deepmatch::{Kind, Type};
///
/// let ty = Type::slice(Type::map(Type::Str, Type::I64));
/// assert_eq!(ty.kind(), Kind::Slice);
/// assert_eq!(ty.to_string(), "Vec<Map<str, i64>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int(IntType),
    Uint(UintType),
    Float(FloatType),
    Str,
    /// Fixed-size sequence.
    Array(Arc<Type>, usize),
    /// Variable-size sequence, possibly nil.
    Slice(Arc<Type>),
    /// Associative map, possibly nil.
    Map(Arc<Type>, Arc<Type>),
    /// Reference to a value of the inner type, possibly nil.
    Ptr(Arc<Type>),
    /// Named record type.
    Struct(Arc<str>),
    /// Boxed dynamic value (any type, possibly nil).
    Dyn,
    /// Function with the given signature name.
    Func(Arc<str>),
    /// Channel-like handle carrying the inner type.
    Chan(Arc<Type>),
    /// Host type implementing [`CustomValue`](crate::CustomValue).
    Custom(CustomType),
    /// An operator; only ever seen on the expected side.
    Operator(&'static str),
}

#[allow(non_upper_case_globals)]
impl Type {
    pub const I8: Type = Type::Int(IntType::I8);
    pub const I16: Type = Type::Int(IntType::I16);
    pub const I32: Type = Type::Int(IntType::I32);
    pub const I64: Type = Type::Int(IntType::I64);
    pub const Isize: Type = Type::Int(IntType::Isize);
    pub const U8: Type = Type::Uint(UintType::U8);
    pub const U16: Type = Type::Uint(UintType::U16);
    pub const U32: Type = Type::Uint(UintType::U32);
    pub const U64: Type = Type::Uint(UintType::U64);
    pub const Usize: Type = Type::Uint(UintType::Usize);
    pub const F32: Type = Type::Float(FloatType::F32);
    pub const F64: Type = Type::Float(FloatType::F64);

    #[must_use]
    pub fn array(elem: Type, len: usize) -> Self {
        Self::Array(Arc::new(elem), len)
    }

    #[must_use]
    pub fn slice(elem: Type) -> Self {
        Self::Slice(Arc::new(elem))
    }

    #[must_use]
    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Arc::new(key), Arc::new(value))
    }

    #[must_use]
    pub fn ptr(elem: Type) -> Self {
        Self::Ptr(Arc::new(elem))
    }

    #[must_use]
    pub fn record(name: impl Into<Arc<str>>) -> Self {
        Self::Struct(name.into())
    }

    #[must_use]
    pub fn func(signature: impl Into<Arc<str>>) -> Self {
        Self::Func(signature.into())
    }

    #[must_use]
    pub fn chan(elem: Type) -> Self {
        Self::Chan(Arc::new(elem))
    }

    /// Type of the custom host type `T`.
    #[must_use]
    pub fn custom<T: 'static>() -> Self {
        Self::Custom(CustomType::of::<T>())
    }

    /// Returns the kind of this type.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Str => Kind::Str,
            Self::Array(..) => Kind::Array,
            Self::Slice(_) => Kind::Slice,
            Self::Map(..) => Kind::Map,
            Self::Ptr(_) => Kind::Ptr,
            Self::Struct(_) => Kind::Struct,
            Self::Dyn => Kind::Dyn,
            Self::Func(_) => Kind::Func,
            Self::Chan(_) => Kind::Chan,
            Self::Custom(_) => Kind::Custom,
            Self::Operator(_) => Kind::Operator,
        }
    }

    /// Returns `true` for kinds whose values can be nil.
    #[must_use]
    pub fn is_nilable(&self) -> bool {
        matches!(
            self.kind(),
            Kind::Slice | Kind::Map | Kind::Ptr | Kind::Dyn | Kind::Func | Kind::Chan
        )
    }

    /// Returns `true` for integer and float types.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind(), Kind::Int | Kind::Uint | Kind::Float)
    }

    /// Returns `true` if values of type `self` can be converted to `target`
    /// under lax coercion.
    ///
    /// Numbers convert to any other number, `str` converts to `Vec<u8>` and back.
    /// Whether a given value is representable is decided by
    /// [`Value::convert`](crate::Value::convert).
    #[must_use]
    pub fn converts_to(&self, target: &Type) -> bool {
        if self.is_numeric() && target.is_numeric() {
            return true;
        }
        match (self, target) {
            (Self::Str, Self::Slice(elem)) | (Self::Slice(elem), Self::Str) => **elem == Type::U8,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(t) => f.write_str(t.name()),
            Self::Uint(t) => f.write_str(t.name()),
            Self::Float(t) => f.write_str(t.name()),
            Self::Str => f.write_str("str"),
            Self::Array(elem, len) => write!(f, "[{elem}; {len}]"),
            Self::Slice(elem) => write!(f, "Vec<{elem}>"),
            Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Ptr(elem) => write!(f, "*{elem}"),
            Self::Struct(name) => f.write_str(name),
            Self::Dyn => f.write_str("dyn Any"),
            Self::Func(sig) => write!(f, "fn {sig}"),
            Self::Chan(elem) => write!(f, "Chan<{elem}>"),
            Self::Custom(c) => f.write_str(c.name()),
            Self::Operator(name) => write!(f, "operator {name}"),
        }
    }
}
