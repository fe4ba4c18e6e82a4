//! Comparison configuration.
//!
//! [`Config`] is assembled once through [`ConfigBuilder`] and is immutable
//! afterwards; every comparison call reads it, none mutates it.
//!
//! With the `serde` feature, the plain-flag part of a config can be loaded
//! from data as [`Settings`] and applied with [`ConfigBuilder::settings`].
//!
//! # Example
//!
//! ```
//! use deepmatch::{explain_with, Config};
//!
//! let config = Config::builder().root_name("RESP").max_errors(0).build();
//! let report = explain_with(&config, &vec![1_i64, 2, 3], &vec![0_i64, 2, 0]).unwrap();
//! assert_eq!(report.count(), 2);
//! assert_eq!(report.path, "RESP[0]");
//! ```

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{Anchors, Hooks, DEFAULT_ROOT_NAME};

/// Immutable comparison configuration.
#[derive(Debug, Clone)]
pub struct Config {
    root_name: Arc<str>,
    max_errors: usize,
    lax: bool,
    ignore_private: bool,
    use_equal: bool,
    hooks: Hooks,
    anchors: Anchors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.into(),
            max_errors: 1,
            lax: false,
            ignore_private: false,
            use_equal: false,
            hooks: Hooks::default(),
            anchors: Anchors::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Name of the path root in reports.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub(crate) fn root_name_arc(&self) -> &Arc<str> {
        &self.root_name
    }

    /// Errors to collect before reporting: 1 = first error wins, 0 = all.
    #[must_use]
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Lax coercion for the whole comparison.
    #[must_use]
    pub fn lax(&self) -> bool {
        self.lax
    }

    /// Skip private record fields of every type.
    #[must_use]
    pub fn ignore_private(&self) -> bool {
        self.ignore_private
    }

    /// Use [`CustomValue::equal`](crate::CustomValue::equal) for every custom type.
    #[must_use]
    pub fn use_equal(&self) -> bool {
        self.use_equal
    }

    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    #[must_use]
    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.config.root_name = name.into();
        self
    }

    #[must_use]
    pub fn max_errors(mut self, max: usize) -> Self {
        self.config.max_errors = max;
        self
    }

    #[must_use]
    pub fn lax(mut self, lax: bool) -> Self {
        self.config.lax = lax;
        self
    }

    #[must_use]
    pub fn ignore_private(mut self, ignore: bool) -> Self {
        self.config.ignore_private = ignore;
        self
    }

    #[must_use]
    pub fn use_equal(mut self, use_equal: bool) -> Self {
        self.config.use_equal = use_equal;
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.config.hooks = hooks;
        self
    }

    #[must_use]
    pub fn anchors(mut self, anchors: Anchors) -> Self {
        self.config.anchors = anchors;
        self
    }

    /// Apply the flags set in `settings`; unset options keep their value.
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        if let Some(name) = &settings.root_name {
            self.config.root_name = name.as_str().into();
        }
        if let Some(max) = settings.max_errors {
            self.config.max_errors = max;
        }
        if let Some(lax) = settings.lax {
            self.config.lax = lax;
        }
        if let Some(ignore) = settings.ignore_private {
            self.config.ignore_private = ignore;
        }
        if let Some(use_equal) = settings.use_equal {
            self.config.use_equal = use_equal;
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

/// Plain-flag subset of [`Config`], loadable from JSON/YAML.
///
/// ```yaml
/// root_name: RESP
/// max_errors: 0
/// lax: true
/// ```
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub root_name: Option<String>,
    pub max_errors: Option<usize>,
    pub lax: Option<bool>,
    pub ignore_private: Option<bool>,
    pub use_equal: Option<bool>,
}
