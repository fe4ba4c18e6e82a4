//! deepmatch-test: YAML conformance fixtures for the deepmatch engine
//!
//! A fixture is a list of cases, each comparing an `actual` document against
//! an `expected` document. Expected documents may embed operators as
//! single-key maps whose key starts with `$`:
//!
//! ```yaml
//! expected:
//!   age: {$between: [18, 65]}
//!   name: {$re: "^[a-z]+$"}
//!   tags: {$contains: admin}
//! ```
//!
//! See [`expected`] for the full list.
//!
//! # Example
//!
//! ```
//! use deepmatch_test::prelude::*;
//!
//! let fixture = Fixture::from_yaml(r#"
//! name: ages
//! description: numeric ranges
//! cases:
//!   - name: in range
//!     actual: {age: 30}
//!     expected: {age: {$between: [18, 65]}}
//!     matches: true
//!   - name: too old
//!     actual: {age: 90}
//!     expected: {age: {$between: [18, 65]}}
//!     matches: false
//!     path: 'DATA["age"]'
//! "#).unwrap();
//! fixture.run_and_assert();
//! ```

pub mod expected;
pub mod fixture;

/// Errors from loading fixtures.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The YAML document does not describe a fixture.
    #[error("invalid fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A `$name` key names no known operator.
    #[error("unknown operator ${name}")]
    UnknownOperator {
        /// Operator name, without the `$`.
        name: String,
    },
    /// An operator's arguments have the wrong shape.
    #[error("bad arguments for ${operator}: {reason}")]
    BadArguments {
        /// Operator name, without the `$`.
        operator: String,
        /// What is wrong with them.
        reason: String,
    },
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::expected::build_expected;
    pub use crate::fixture::{Case, CaseResult, Fixture};
    pub use crate::FixtureError;
}
