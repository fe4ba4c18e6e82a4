//! deepmatch - structural value matching for test assertions
//!
//! Compares an *actual* value against an *expected* value by walking both
//! in lockstep. Anywhere in the expected value, an [`Operator`] may stand in
//! for a literal and take over the comparison of that subtree.
//!
//! # Architecture
//!
//! - [`Value`] — Runtime value handle (scalars, containers, records, pointers,
//!   custom host values, operators)
//! - [`Reflect`] — Converts ordinary Rust data into [`Value`]s
//! - [`Context`] — Where we are (a [`Path`]), how we report ([`Mode`]), and the
//!   hook/anchor tables of the call
//! - [`Operator`] — Pluggable comparison logic living on the expected side
//! - [`Report`] — Structured mismatch: path, got/expected, summary, origin chain
//!
//! # Key Design Insights
//!
//! 1. **One algorithm, two modes**: [`matches`] and [`explain`] run the same
//!    engine. Boolean mode returns a cheap sentinel instead of building
//!    reports, so `matches(..)` is true if and only if `explain(..)` is `None`.
//!
//! 2. **Absent is not nil**: a missing actual value only matches operators
//!    that declare they handle it (e.g. [`ops::nil`]).
//!
//! 3. **Cycles terminate**: pairs of shared containers already under
//!    comparison are treated as equal when met again.
//!
//! # Example
//!
//! ```
//! use deepmatch::prelude::*;
//!
//! let actual = Record::new("User")
//!     .field("name", "ada")
//!     .field("age", 36_i64)
//!     .field("tags", reflect(&vec!["admin", "ops"]))
//!     .build();
//! let expected = Record::new("User")
//!     .field("name", ops::re("^[a-z]+$"))
//!     .field("age", ops::between(18_i64, 65_i64))
//!     .field("tags", ops::contains("admin"))
//!     .build();
//! assert!(matches(&actual, &expected));
//!
//! let report = explain(&actual, &Record::new("User")
//!     .field("name", "ada")
//!     .field("age", 37_i64)
//!     .field("tags", reflect(&vec!["admin", "ops"]))
//!     .build())
//! .unwrap();
//! assert_eq!(report.path, "DATA.age");
//! ```
//!
//! # Extensions
//!
//! - [`ops`] — Reference operators
//! - [`deepmatch-test`](https://docs.rs/deepmatch-test) — YAML conformance fixtures (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod anchors;
mod config;
mod context;
mod engine;
mod hooks;
mod operator;
mod path;
mod reflect;
mod render;
mod report;
mod types;
mod value;

#[cfg(feature = "json")]
mod json;

pub mod ops;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Values and types
pub use types::{CustomType, FloatType, IntType, Kind, Type};
pub use value::{zero_value, CustomValue, Field, Handle, Record, Slot, Value};

// Conversion from Rust data
pub use reflect::{reflect, Reflect};

// Matching
pub use context::{Context, Mode};
pub use engine::{explain, explain_with, matches, matches_with};
pub use path::{Path, Segment};

// Operators
pub use operator::{type_hint_of, Base, Operator};

// Reporting
pub use report::{Attribution, MatchResult, Mismatch, Report, Shown, Summary, SummaryItem};

// Configuration
pub use anchors::Anchors;
pub use config::{Config, ConfigBuilder};
pub use hooks::{Hooks, HooksBuilder};

#[cfg(feature = "serde")]
pub use config::Settings;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use deepmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ops;
    pub use crate::{
        explain,
        explain_with,
        matches,
        matches_with,
        reflect,
        // Configuration
        Anchors,
        Config,
        ConfigBuilder,
        // Values
        CustomValue,
        HooksBuilder,
        // Operators
        Operator,
        Record,
        Reflect,
        // Reporting
        Report,
        Type,
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Name of the root of every [`Path`] unless [`ConfigBuilder::root_name`]
/// says otherwise.
pub const DEFAULT_ROOT_NAME: &str = "DATA";

/// Maximum number of children of a composite operator ([`ops::all`],
/// [`ops::any`], [`ops::none`]).
///
/// Width-based protection: larger lists are rejected at construction and
/// surface as a "bad usage" mismatch.
pub const MAX_COMPOSITE_CHILDREN: usize = 256;

/// Maximum length for non-regex string patterns (prefix, suffix, contains).
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter limit than [`MAX_PATTERN_LENGTH`] because regex compilation cost
/// scales faster than literal matching.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

/// Maximum number of smuggle hooks applied in a row to a single value.
pub const MAX_SMUGGLE_CHAIN: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from operator construction.
///
/// Operators never fail when built: the error is stored in their [`Base`] and
/// reported as a "bad usage" mismatch the first time they are used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    /// An argument is out of the operator's domain.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What is wrong with it.
        reason: String,
    },
    /// A regular expression failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
    /// A pattern exceeds [`MAX_PATTERN_LENGTH`] or [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A composite operator has more than [`MAX_COMPOSITE_CHILDREN`] children.
    #[error("composite operator has {count} children, but maximum allowed is {max}")]
    TooManyChildren {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
}

/// Errors from [`Anchors`] registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    /// No placeholder can be generated for, or bound to, this type.
    #[error("cannot anchor values of type {ty}")]
    Unsupported {
        /// Rendering of the offending type.
        ty: String,
    },
    /// The placeholder already stands for another operator.
    #[error("placeholder {placeholder} is already bound")]
    AlreadyBound {
        /// Rendering of the placeholder.
        placeholder: String,
    },
    /// Only operators can be anchored.
    #[error("anchored value must be an operator, got {got}")]
    NotAnOperator {
        /// Rendering of the value given instead.
        got: String,
    },
    /// Every placeholder of this type has been handed out.
    #[error("no placeholder left for type {ty}")]
    Exhausted {
        /// Rendering of the type.
        ty: String,
    },
    /// [`Anchors::anchor_op`] needs the operator to know its type.
    #[error("operator {operator} has no expected type, use Anchors::anchor")]
    NoTypeHint {
        /// Rendering of the operator.
        operator: String,
    },
}
