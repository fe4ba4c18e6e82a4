//! `Value`: the uniform handle the engine walks.
//!
//! A `Value` is one runtime value plus enough type information for the engine
//! to inspect it generically: its [`Type`], its [`Kind`] and accessors for the
//! elements, fields or pointee it contains.
//!
//! # Sharing and identity
//!
//! Containers share their storage through `Arc`, so cloning a `Value` is cheap
//! and two clones keep the same identity. Identity is what the engine's cycle
//! guard and its "same storage" fast paths key on.
//!
//! Pointers target a write-once [`Slot`], which is how self-referential graphs
//! are built (see [`Value::cyclic`]).
//!
//! # Extensibility via `Custom`
//!
//! Host types that should be compared by reference, by an `equal` method or
//! through a structural view implement [`CustomValue`] and are wrapped with
//! [`Value::custom`].

use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use crate::types::{CustomType, FloatType, IntType, Kind, Type, UintType};
use crate::Operator;

/// Opaque identity handle for function and channel values.
pub type Handle = Arc<dyn Any + Send + Sync>;

/// Extension trait for host types carried inside a [`Value`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; values are shared with operators,
/// which are `Send + Sync` themselves.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use deepmatch::{CustomValue, Value};
///
/// #[derive(Debug)]
/// struct Celsius(f64);
///
/// impl CustomValue for Celsius {
///     fn custom_type_name(&self) -> &'static str {
///         "celsius"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn equal(&self, other: &dyn CustomValue) -> Option<bool> {
///         let other = other.as_any().downcast_ref::<Celsius>()?;
///         Some((self.0 - other.0).abs() < 0.01)
///     }
/// }
///
/// let a = Value::custom(Celsius(21.0));
/// assert_eq!(a.type_of().map(|t| t.to_string()).as_deref(), Some("celsius"));
/// ```
pub trait CustomValue: Send + Sync + Debug {
    /// Returns a human-readable type identifier, used in diagnostics.
    fn custom_type_name(&self) -> &'static str;

    /// Returns a reference to `self` as `&dyn Any`, for downcasting in hooks.
    fn as_any(&self) -> &dyn Any;

    /// Custom equality method.
    ///
    /// Consulted only when custom equality is enabled (globally or for this
    /// type). Returns `None` when `other` is not a type this method can
    /// compare against, in which case the engine carries on as if the method
    /// did not exist.
    fn equal(&self, _other: &dyn CustomValue) -> Option<bool> {
        None
    }

    /// Structural view of this value.
    ///
    /// When two distinct custom values both expose a view, the views are
    /// compared structurally. Without a view, custom values only match
    /// themselves.
    fn inspect(&self) -> Option<Value> {
        None
    }
}

/// Write-once target of a pointer.
///
/// A pointer whose slot was never filled behaves like a nil pointer.
#[derive(Debug, Default)]
pub struct Slot(OnceLock<Value>);

impl Slot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fill the slot.
    ///
    /// # Errors
    ///
    /// Returns the value back if the slot was already filled.
    pub fn set(&self, value: Value) -> Result<(), Value> {
        self.0.set(value)
    }

    /// The pointee, if the slot was filled.
    #[must_use]
    pub fn get(&self) -> Option<&Value> {
        self.0.get()
    }
}

/// One field of a [`Record`].
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Arc<str>,
    /// Private fields can be skipped with the "ignore private fields" option.
    pub public: bool,
    pub value: Value,
}

/// Struct-like value: a named type with ordered fields.
///
/// # Example
///
/// ```
/// use deepmatch::{Record, Value};
///
/// let point = Record::new("Point").field("x", 1_i64).field("y", 2_i64).build();
/// assert_eq!(point.to_string(), "Point { x: 1, y: 2 }");
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    name: Arc<str>,
    fields: Vec<Field>,
}

impl Record {
    /// Start a record of the named type.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a public field.
    #[must_use]
    pub fn field(self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.push(name.into(), true, value.into())
    }

    /// Append a private field.
    #[must_use]
    pub fn private(self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.push(name.into(), false, value.into())
    }

    fn push(mut self, name: Arc<str>, public: bool, value: Value) -> Self {
        self.fields.push(Field {
            name,
            public,
            value,
        });
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Struct(Arc::new(self))
    }

    /// The record's type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look a field up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| &*f.name == name)
            .map(|f| &f.value)
    }

    /// Returns `true` if both records declare the same field names in the same order.
    pub(crate) fn same_shape(&self, other: &Record) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name)
    }
}

/// A runtime value plus its type.
///
/// # Variants
///
/// - `Invalid` is the absent value (an untyped nil)
/// - scalars carry their concrete width, so `1_i64` and `1_isize` differ
/// - nilable containers use `Option` for their storage (`None` = nil)
/// - `Dyn` boxes a value of any type, like a trait object slot
/// - `Op` holds an [`Operator`] and is only legal on the expected side
///
/// # Example
///
/// ```
/// use deepmatch::{Type, Value};
///
/// let v = Value::slice(Type::I64, [1_i64.into(), 2_i64.into()]);
/// assert_eq!(v.len(), Some(2));
/// assert_eq!(v.type_of(), Some(Type::slice(Type::I64)));
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// No value at all.
    #[default]
    Invalid,
    Bool(bool),
    Int(i64, IntType),
    Uint(u64, UintType),
    Float(f64, FloatType),
    Str(Arc<str>),
    Array {
        elem: Type,
        items: Arc<[Value]>,
    },
    Slice {
        elem: Type,
        items: Option<Arc<[Value]>>,
    },
    /// Entries are kept sorted by key (see [`Value::sort_cmp`]).
    Map {
        key: Type,
        value: Type,
        entries: Option<Arc<[(Value, Value)]>>,
    },
    Ptr {
        elem: Type,
        target: Option<Arc<Slot>>,
    },
    Struct(Arc<Record>),
    Dyn(Option<Box<Value>>),
    Func {
        signature: Arc<str>,
        handle: Option<Handle>,
    },
    Chan {
        elem: Type,
        handle: Option<Handle>,
    },
    Custom(Arc<dyn CustomValue>),
    Op(Arc<dyn Operator>),
}

/// The absent value, for places that need a `&'static Value`.
pub(crate) static INVALID: Value = Value::Invalid;

impl Value {
    // ── Constructors ────────────────────────────────────────────────────────

    /// A string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Self::Str(s.into())
    }

    /// A fixed-size sequence of `elem`.
    pub fn array(elem: Type, items: impl IntoIterator<Item = Value>) -> Self {
        let items = conform_all(&elem, items);
        Self::Array { elem, items }
    }

    /// A non-nil variable-size sequence of `elem`.
    ///
    /// When `elem` is [`Type::Dyn`], items are boxed automatically.
    pub fn slice(elem: Type, items: impl IntoIterator<Item = Value>) -> Self {
        let items = Some(conform_all(&elem, items));
        Self::Slice { elem, items }
    }

    /// A nil sequence of `elem`.
    #[must_use]
    pub fn nil_slice(elem: Type) -> Self {
        Self::Slice { elem, items: None }
    }

    /// A sequence of boxed dynamic values, the shape of heterogeneous data.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::slice(Type::Dyn, items)
    }

    /// A non-nil map.
    ///
    /// Entries are sorted by key; when a key repeats, the last entry wins.
    pub fn map(key: Type, value: Type, entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut sorted: Vec<(Value, Value)> = entries
            .into_iter()
            .map(|(k, v)| (conform(&key, k), conform(&value, v)))
            .collect();
        // stable sort keeps insertion order among equal keys, so the last one survives dedup
        sorted.sort_by(|a, b| a.0.sort_cmp(&b.0));
        let mut deduped: Vec<(Value, Value)> = Vec::with_capacity(sorted.len());
        for entry in sorted {
            match deduped.last_mut() {
                Some(last) if last.0.sort_cmp(&entry.0) == Ordering::Equal => *last = entry,
                _ => deduped.push(entry),
            }
        }
        Self::Map {
            key,
            value,
            entries: Some(deduped.into()),
        }
    }

    /// A nil map.
    #[must_use]
    pub fn nil_map(key: Type, value: Type) -> Self {
        Self::Map {
            key,
            value,
            entries: None,
        }
    }

    /// A pointer to a fresh slot holding `value`.
    ///
    /// When `elem` is [`Type::Dyn`], the pointee is boxed automatically.
    #[must_use]
    pub fn ptr(elem: Type, value: Value) -> Self {
        let slot = Slot::new();
        // a fresh slot is always empty
        let _ = slot.set(conform(&elem, value));
        Self::ptr_to(elem, slot)
    }

    /// A pointer to an existing slot; pointers to the same slot share identity.
    #[must_use]
    pub fn ptr_to(elem: Type, slot: Arc<Slot>) -> Self {
        Self::Ptr {
            elem,
            target: Some(slot),
        }
    }

    /// A nil pointer to `elem`.
    #[must_use]
    pub fn nil_ptr(elem: Type) -> Self {
        Self::Ptr { elem, target: None }
    }

    /// A pointer whose pointee may refer back to the pointer itself.
    ///
    /// `build` receives the pointer under construction and returns the pointee.
    ///
    /// ```
    /// use deepmatch::{Record, Type, Value};
    ///
    /// let node = Value::cyclic(Type::record("Node"), |this| {
    ///     Record::new("Node").field("next", this.clone()).build()
    /// });
    /// assert!(deepmatch::matches(&node, &node));
    /// ```
    pub fn cyclic(elem: Type, build: impl FnOnce(&Value) -> Value) -> Self {
        let slot = Slot::new();
        let this = Self::ptr_to(elem.clone(), Arc::clone(&slot));
        let _ = slot.set(conform(&elem, build(&this)));
        this
    }

    /// Box a value into a dynamic slot.
    #[must_use]
    pub fn boxed(value: Value) -> Self {
        match value {
            Self::Invalid => Self::Dyn(None),
            other => Self::Dyn(Some(Box::new(other))),
        }
    }

    /// A non-nil function value; functions only compare equal when both are nil.
    pub fn func<F: Any + Send + Sync>(signature: impl Into<Arc<str>>, f: F) -> Self {
        Self::Func {
            signature: signature.into(),
            handle: Some(Arc::new(f)),
        }
    }

    /// A nil function value.
    pub fn nil_func(signature: impl Into<Arc<str>>) -> Self {
        Self::Func {
            signature: signature.into(),
            handle: None,
        }
    }

    /// A new channel handle; channels compare by identity.
    #[must_use]
    pub fn chan(elem: Type) -> Self {
        Self::Chan {
            elem,
            handle: Some(Arc::new(())),
        }
    }

    /// A nil channel.
    #[must_use]
    pub fn nil_chan(elem: Type) -> Self {
        Self::Chan { elem, handle: None }
    }

    /// Wrap a host value.
    pub fn custom(value: impl CustomValue + 'static) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Wrap an operator; only meaningful as (part of) an expected value.
    pub fn op(op: impl Operator + 'static) -> Self {
        Self::Op(Arc::new(op))
    }

    // ── Introspection ───────────────────────────────────────────────────────

    /// Returns `true` for the absent value.
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Returns `true` if this value is an operator.
    #[inline]
    #[must_use]
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Op(_))
    }

    /// The operator, if this value is one.
    #[must_use]
    pub fn as_operator(&self) -> Option<&Arc<dyn Operator>> {
        match self {
            Self::Op(op) => Some(op),
            _ => None,
        }
    }

    /// Runtime type; `None` for the absent value.
    #[must_use]
    pub fn type_of(&self) -> Option<Type> {
        Some(match self {
            Self::Invalid => return None,
            Self::Bool(_) => Type::Bool,
            Self::Int(_, t) => Type::Int(*t),
            Self::Uint(_, t) => Type::Uint(*t),
            Self::Float(_, t) => Type::Float(*t),
            Self::Str(_) => Type::Str,
            Self::Array { elem, items } => Type::array(elem.clone(), items.len()),
            Self::Slice { elem, .. } => Type::slice(elem.clone()),
            Self::Map { key, value, .. } => Type::map(key.clone(), value.clone()),
            Self::Ptr { elem, .. } => Type::ptr(elem.clone()),
            Self::Struct(r) => Type::Struct(Arc::clone(&r.name)),
            Self::Dyn(_) => Type::Dyn,
            Self::Func { signature, .. } => Type::Func(Arc::clone(signature)),
            Self::Chan { elem, .. } => Type::chan(elem.clone()),
            Self::Custom(c) => Type::Custom(CustomType::new(
                c.as_any().type_id(),
                c.custom_type_name(),
            )),
            Self::Op(op) => Type::Operator(op.base().name()),
        })
    }

    /// Kind of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.type_of().map_or(Kind::Invalid, |t| t.kind())
    }

    /// Returns `true` for nil slices, maps, pointers, dynamic slots, functions
    /// and channels. The absent value is not "nil", it is nothing.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Slice { items, .. } => items.is_none(),
            Self::Map { entries, .. } => entries.is_none(),
            Self::Ptr { .. } => self.pointee().is_none(),
            Self::Dyn(inner) => inner.is_none(),
            Self::Func { handle, .. } | Self::Chan { handle, .. } => handle.is_none(),
            _ => false,
        }
    }

    /// Returns `true` for the absent value, nil values, and dynamic slots
    /// holding either.
    #[must_use]
    pub fn is_nil_like(&self) -> bool {
        match self {
            Self::Invalid => true,
            Self::Dyn(Some(inner)) => inner.is_nil_like(),
            other => other.is_nil(),
        }
    }

    /// Length of a sequence, map or string; strings count UTF-8 bytes.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.len()),
            Self::Array { items, .. } => Some(items.len()),
            Self::Slice { items, .. } => Some(items.as_ref().map_or(0, |i| i.len())),
            Self::Map { entries, .. } => Some(entries.as_ref().map_or(0, |e| e.len())),
            Self::Dyn(Some(inner)) => inner.len(),
            _ => None,
        }
    }

    /// Returns `true` if [`len`](Self::len) is `Some(0)`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Elements of an array or non-nil slice.
    #[must_use]
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Array { items, .. } => Some(items),
            Self::Slice { items, .. } => items.as_deref(),
            _ => None,
        }
    }

    /// Entries of a non-nil map, sorted by key.
    #[must_use]
    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map { entries, .. } => entries.as_deref(),
            _ => None,
        }
    }

    /// Look a key up in a map.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        lookup(self.entries()?, key)
    }

    /// Pointee of a non-nil pointer.
    #[must_use]
    pub fn pointee(&self) -> Option<&Value> {
        match self {
            Self::Ptr {
                target: Some(slot), ..
            } => slot.get(),
            _ => None,
        }
    }

    /// Record of a struct value.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Struct(r) => Some(r),
            _ => None,
        }
    }

    /// String slice of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Content of a dynamic slot; `self` for every other value.
    #[must_use]
    pub fn unboxed(&self) -> &Value {
        match self {
            Self::Dyn(Some(inner)) => inner.unboxed(),
            Self::Dyn(None) => &INVALID,
            other => other,
        }
    }

    /// Storage identity, for the kinds that can form cycles or share storage.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Self::Ptr {
                target: Some(slot), ..
            } => Some(Arc::as_ptr(slot) as usize),
            Self::Slice {
                items: Some(items), ..
            } => Some(Arc::as_ptr(items).cast::<()>() as usize),
            Self::Map {
                entries: Some(entries),
                ..
            } => Some(Arc::as_ptr(entries).cast::<()>() as usize),
            _ => None,
        }
    }

    // ── Lax coercion ────────────────────────────────────────────────────────

    /// Convert this value to `target`, if the types are convertible (see
    /// [`Type::converts_to`]) and the value is exactly representable.
    #[must_use]
    pub fn convert(&self, target: &Type) -> Option<Value> {
        match (self, target) {
            (Self::Int(v, _), Type::Int(t)) => t.fits(*v).then_some(Self::Int(*v, *t)),
            (Self::Int(v, _), Type::Uint(t)) => u64::try_from(*v)
                .ok()
                .filter(|u| t.fits(*u))
                .map(|u| Self::Uint(u, *t)),
            (Self::Int(v, _), Type::Float(t)) => float_from_i128(i128::from(*v), *t),
            (Self::Uint(v, _), Type::Int(t)) => i64::try_from(*v)
                .ok()
                .filter(|i| t.fits(*i))
                .map(|i| Self::Int(i, *t)),
            (Self::Uint(v, _), Type::Uint(t)) => t.fits(*v).then_some(Self::Uint(*v, *t)),
            (Self::Uint(v, _), Type::Float(t)) => float_from_i128(i128::from(*v), *t),
            (Self::Float(v, _), Type::Int(t)) => integral(*v)
                .and_then(|i| i64::try_from(i).ok())
                .filter(|i| t.fits(*i))
                .map(|i| Self::Int(i, *t)),
            (Self::Float(v, _), Type::Uint(t)) => integral(*v)
                .and_then(|i| u64::try_from(i).ok())
                .filter(|u| t.fits(*u))
                .map(|u| Self::Uint(u, *t)),
            (Self::Float(v, _), Type::Float(FloatType::F64)) => Some(Self::Float(*v, FloatType::F64)),
            (Self::Float(v, _), Type::Float(FloatType::F32)) => {
                #[allow(clippy::cast_possible_truncation)]
                let narrowed = *v as f32;
                (f64::from(narrowed) == *v).then_some(Self::Float(*v, FloatType::F32))
            }
            (Self::Str(s), Type::Slice(elem)) if **elem == Type::U8 => Some(Self::slice(
                Type::U8,
                s.bytes().map(|b| Self::Uint(b.into(), UintType::U8)),
            )),
            (Self::Slice { elem, items }, Type::Str) if *elem == Type::U8 => {
                let bytes = items
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|b| match b {
                        Self::Uint(v, _) => u8::try_from(*v).ok(),
                        _ => None,
                    })
                    .collect::<Option<Vec<u8>>>()?;
                String::from_utf8(bytes).ok().map(Self::string)
            }
            _ => None,
        }
    }

    // ── Ordering ────────────────────────────────────────────────────────────

    /// Deterministic total order over values.
    ///
    /// Used to keep map keys sorted and to sort the items listed in
    /// diagnostics. Dynamic slots are transparent; values of different kinds
    /// order by kind; scalars order by value; anything else orders by its
    /// rendering. Pointers, slices, maps, functions and channels that render
    /// alike but do not share storage are still distinct, ordered by address.
    #[must_use]
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        self.value_cmp(other)
            .then_with(|| self.address().cmp(&other.address()))
    }

    /// [`sort_cmp`](Self::sort_cmp) without the address tie-break.
    fn value_cmp(&self, other: &Value) -> Ordering {
        let (a, b) = (self.unboxed(), other.unboxed());
        let by_kind = a.kind().cmp(&b.kind());
        if by_kind != Ordering::Equal {
            return by_kind;
        }
        match (a, b) {
            (Self::Invalid, Self::Invalid) => Ordering::Equal,
            (Self::Bool(x), Self::Bool(y)) => x.cmp(y),
            (Self::Int(x, tx), Self::Int(y, ty)) => x.cmp(y).then(tx.cmp(ty)),
            (Self::Uint(x, tx), Self::Uint(y, ty)) => x.cmp(y).then(tx.cmp(ty)),
            (Self::Float(x, tx), Self::Float(y, ty)) => x.total_cmp(y).then(tx.cmp(ty)),
            (Self::Str(x), Self::Str(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        }
    }

    /// [`identity`](Self::identity), extended to function and channel handles.
    fn address(&self) -> Option<usize> {
        match self.unboxed() {
            Self::Func {
                handle: Some(h), ..
            }
            | Self::Chan {
                handle: Some(h), ..
            } => Some(Arc::as_ptr(h).cast::<()>() as usize),
            other => other.identity(),
        }
    }
}

/// Box `value` when the container slot is dynamic; operators stay unboxed so
/// the engine still sees them.
fn conform(elem: &Type, value: Value) -> Value {
    if *elem == Type::Dyn && !matches!(value, Value::Dyn(_) | Value::Op(_)) {
        Value::boxed(value)
    } else {
        value
    }
}

fn conform_all(elem: &Type, items: impl IntoIterator<Item = Value>) -> Arc<[Value]> {
    items.into_iter().map(|v| conform(elem, v)).collect()
}

/// Binary search in entries sorted with [`Value::sort_cmp`].
///
/// The key sharing storage with `key` wins; failing that, the only key equal
/// to it by value. Several such keys and none of them `key` itself is a miss.
pub(crate) fn lookup<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    let start = entries.partition_point(|(k, _)| k.value_cmp(key) == Ordering::Less);
    let rest = &entries[start..];
    let same = &rest[..rest.partition_point(|(k, _)| k.value_cmp(key) == Ordering::Equal)];
    match same {
        [(_, v)] => Some(v),
        _ => same
            .iter()
            .find(|(k, _)| k.address() == key.address())
            .map(|(_, v)| v),
    }
}

fn integral(v: f64) -> Option<i128> {
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let i = v as i128;
    #[allow(clippy::cast_precision_loss)]
    let back = i as f64;
    (back == v).then_some(i)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn float_from_i128(v: i128, t: FloatType) -> Option<Value> {
    let exact = match t {
        FloatType::F64 => {
            let f = v as f64;
            (f as i128 == v).then_some(f)
        }
        FloatType::F32 => {
            let f = v as f32;
            (f as i128 == v).then_some(f64::from(f))
        }
    };
    exact.map(|f| Value::Float(f, t))
}

/// Zero value of a type, where one can be synthesized.
///
/// Records, custom types and operators have no synthesizable zero value.
#[must_use]
pub fn zero_value(ty: &Type) -> Option<Value> {
    Some(match ty {
        Type::Bool => Value::Bool(false),
        Type::Int(t) => Value::Int(0, *t),
        Type::Uint(t) => Value::Uint(0, *t),
        Type::Float(t) => Value::Float(0.0, *t),
        Type::Str => Value::string(""),
        Type::Array(elem, len) => {
            let zero = zero_value(elem)?;
            Value::array((**elem).clone(), std::iter::repeat(zero).take(*len))
        }
        Type::Slice(elem) => Value::nil_slice((**elem).clone()),
        Type::Map(key, value) => Value::nil_map((**key).clone(), (**value).clone()),
        Type::Ptr(elem) => Value::nil_ptr((**elem).clone()),
        Type::Dyn => Value::Dyn(None),
        Type::Func(sig) => Value::nil_func(Arc::clone(sig)),
        Type::Chan(elem) => Value::nil_chan((**elem).clone()),
        Type::Struct(_) | Type::Custom(_) | Type::Operator(_) => return None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! from_int {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                #[allow(clippy::cast_possible_wrap)]
                Self::Int(v as i64, IntType::$variant)
            }
        }
    )*};
}

macro_rules! from_uint {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Uint(v as u64, UintType::$variant)
            }
        }
    )*};
}

from_int!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
from_uint!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v), FloatType::F32)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v, FloatType::F64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::list(items)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Invalid, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Opaque(u32);

    impl CustomValue for Opaque {
        fn custom_type_name(&self) -> &'static str {
            "opaque"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::from(1_i64).type_of(), Some(Type::I64));
        assert_eq!(Value::from(1_isize).type_of(), Some(Type::Isize));
        assert_eq!(Value::from("x").type_of(), Some(Type::Str));
        assert_eq!(Value::Invalid.type_of(), None);
        assert_eq!(
            Value::nil_ptr(Type::record("Widget")).type_of(),
            Some(Type::ptr(Type::record("Widget")))
        );
        let custom = Value::custom(Opaque(1));
        assert_eq!(custom.type_of(), Some(Type::custom::<Opaque>()));
        assert_eq!(custom.kind(), Kind::Custom);
    }

    #[test]
    fn test_is_nil() {
        assert!(Value::nil_slice(Type::I8).is_nil());
        assert!(Value::nil_map(Type::Str, Type::I8).is_nil());
        assert!(Value::nil_ptr(Type::I8).is_nil());
        assert!(Value::Dyn(None).is_nil());
        assert!(Value::nil_func("f").is_nil());
        assert!(!Value::slice(Type::I8, []).is_nil());
        assert!(!Value::Invalid.is_nil());
        assert!(Value::Invalid.is_nil_like());
        assert!(Value::boxed(Value::nil_ptr(Type::I8)).is_nil_like());
        // an unfilled slot reads as nil
        assert!(Value::ptr_to(Type::I8, Slot::new()).is_nil());
    }

    #[test]
    fn test_dyn_slices_box_items() {
        let v = Value::list([1_i64.into(), Value::Invalid]);
        let items = v.items().unwrap();
        assert!(matches!(&items[0], Value::Dyn(Some(_))));
        assert!(matches!(&items[1], Value::Dyn(None)));
    }

    #[test]
    fn test_map_sorted_and_deduped() {
        let m = Value::map(
            Type::Str,
            Type::I64,
            [
                ("z".into(), 1_i64.into()),
                ("a".into(), 2_i64.into()),
                ("z".into(), 3_i64.into()),
            ],
        );
        let keys: Vec<_> = m
            .entries()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["a", "z"]);
        assert!(matches!(m.get(&"z".into()), Some(Value::Int(3, _))));
        assert!(m.get(&"q".into()).is_none());
    }

    #[test]
    fn test_pointer_keys_by_identity() {
        let (p, q) = (
            Value::ptr(Type::I64, 1_i64.into()),
            Value::ptr(Type::I64, 1_i64.into()),
        );
        let m = Value::map(
            Type::ptr(Type::I64),
            Type::I64,
            [(p.clone(), 1_i64.into()), (q.clone(), 2_i64.into())],
        );
        assert_eq!(m.len(), Some(2));
        assert!(matches!(m.get(&p), Some(Value::Int(1, _))));
        assert!(matches!(m.get(&q), Some(Value::Int(2, _))));
        // a third pointer equal to both is ambiguous
        assert!(m.get(&Value::ptr(Type::I64, 1_i64.into())).is_none());

        // the same pointer twice is one key
        let m = Value::map(
            Type::ptr(Type::I64),
            Type::I64,
            [(p.clone(), 1_i64.into()), (p.clone(), 2_i64.into())],
        );
        assert_eq!(m.len(), Some(1));
        assert!(matches!(m.get(&p), Some(Value::Int(2, _))));

        // an unambiguous key is still found by value
        let single = Value::map(Type::ptr(Type::I64), Type::I64, [(p, 1_i64.into())]);
        assert!(single.get(&q).is_some());
    }

    #[test]
    fn test_identity_shared_by_clones() {
        let s = Value::slice(Type::I8, [1_i8.into()]);
        assert_eq!(s.identity(), s.clone().identity());
        let other = Value::slice(Type::I8, [1_i8.into()]);
        assert_ne!(s.identity(), other.identity());
        assert_eq!(Value::from(1_i8).identity(), None);
    }

    #[test]
    fn test_cyclic_pointer() {
        let node = Value::cyclic(Type::record("Node"), |this| {
            Record::new("Node").field("next", this.clone()).build()
        });
        let next = node.pointee().unwrap().as_record().unwrap().get("next").unwrap();
        assert_eq!(next.identity(), node.identity());
    }

    #[test]
    fn test_convert_numbers() {
        assert!(matches!(
            Value::from(42_i64).convert(&Type::Isize),
            Some(Value::Int(42, IntType::Isize))
        ));
        assert!(Value::from(300_i64).convert(&Type::U8).is_none());
        assert!(Value::from(-1_i64).convert(&Type::U32).is_none());
        assert!(matches!(
            Value::from(3.0_f64).convert(&Type::I8),
            Some(Value::Int(3, IntType::I8))
        ));
        assert!(Value::from(3.5_f64).convert(&Type::I8).is_none());
        assert!(Value::from(0.1_f64).convert(&Type::F32).is_none());
        assert!(Value::from(0.5_f64).convert(&Type::F32).is_some());
        assert!(Value::from(i64::MAX).convert(&Type::F64).is_none());
    }

    #[test]
    fn test_convert_bytes() {
        let bytes = Value::from("hi").convert(&Type::slice(Type::U8)).unwrap();
        assert_eq!(bytes.len(), Some(2));
        let back = bytes.convert(&Type::Str).unwrap();
        assert_eq!(back.as_str(), Some("hi"));
    }

    #[test]
    fn test_sort_cmp() {
        assert_eq!(Value::from(1_i64).sort_cmp(&2_i64.into()), Ordering::Less);
        assert_eq!(
            Value::boxed("b".into()).sort_cmp(&"a".into()),
            Ordering::Greater
        );
        // kinds rank before values
        assert_eq!(Value::from(true).sort_cmp(&0_i64.into()), Ordering::Less);
    }

    #[test]
    fn test_zero_value() {
        assert!(matches!(zero_value(&Type::I32), Some(Value::Int(0, IntType::I32))));
        assert!(zero_value(&Type::slice(Type::Str)).unwrap().is_nil());
        assert_eq!(zero_value(&Type::array(Type::Bool, 3)).unwrap().len(), Some(3));
        assert!(zero_value(&Type::record("R")).is_none());
    }

    #[test]
    fn test_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
    }
}
