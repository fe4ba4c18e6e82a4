//! `Context`: per-step state of one comparison.
//!
//! A context is derived, never mutated: descending into a field, index, key
//! or pointer returns a new context with a longer [`Path`], leaving the
//! parent untouched. What is shared across the whole call (the visited-pair
//! set and the collected errors) lives in [`Shared`], created fresh by each
//! top-level call and dropped with it.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use crate::engine;
use crate::{Attribution, Config, MatchResult, Mismatch, Path, Report, Value};

/// How mismatches are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop at the first mismatch, without building diagnostics.
    Boolean,
    /// Build a [`Report`] for every mismatch.
    Diagnostic,
}

/// Call-scoped state shared by every context of one top-level comparison.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    visited: RefCell<HashSet<(usize, usize)>>,
    errors: RefCell<Vec<Report>>,
}

impl Shared {
    pub(crate) fn take_errors(&self) -> Vec<Report> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }
}

/// Removes its pair from the visited set when dropped.
pub(crate) struct VisitGuard<'a> {
    visited: &'a RefCell<HashSet<(usize, usize)>>,
    pair: (usize, usize),
}

impl Drop for VisitGuard<'_> {
    fn drop(&mut self) {
        self.visited.borrow_mut().remove(&self.pair);
    }
}

/// State carried through every recursive step.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    config: &'a Config,
    shared: &'a Shared,
    path: Path,
    mode: Mode,
    lax: bool,
    collect: bool,
    operator: Option<Attribution>,
}

impl<'a> Context<'a> {
    pub(crate) fn root(config: &'a Config, shared: &'a Shared, mode: Mode) -> Self {
        Self {
            config,
            shared,
            path: Path::new(Arc::clone(config.root_name_arc())),
            mode,
            lax: config.lax(),
            collect: mode == Mode::Diagnostic && config.max_errors() != 1,
            operator: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.mode == Mode::Boolean
    }

    /// Whether lax coercion is enabled for this subtree.
    #[must_use]
    pub fn is_lax(&self) -> bool {
        self.lax
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The innermost operator this step runs under.
    #[must_use]
    pub fn operator(&self) -> Option<Attribution> {
        self.operator
    }

    // ── Derivation ──────────────────────────────────────────────────────────

    fn with_path(&self, path: Path) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn field(&self, name: impl Into<Arc<str>>) -> Self {
        self.with_path(self.path.field(name))
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        self.with_path(self.path.index(i))
    }

    #[must_use]
    pub fn key(&self, key: Value) -> Self {
        self.with_path(self.path.key(key))
    }

    #[must_use]
    pub fn deref(&self) -> Self {
        self.with_path(self.path.deref())
    }

    /// Append a synthetic segment explaining how the value was derived.
    #[must_use]
    pub fn label(&self, label: impl Into<Cow<'static, str>>) -> Self {
        self.with_path(self.path.label(label))
    }

    #[must_use]
    pub fn with_lax(&self, lax: bool) -> Self {
        Self {
            lax,
            ..self.clone()
        }
    }

    /// Report mismatches of this subtree straight back to the caller instead
    /// of collecting them, so an operator can wrap them as `origin`.
    #[must_use]
    pub fn without_collection(&self) -> Self {
        Self {
            collect: false,
            ..self.clone()
        }
    }

    pub(crate) fn under(&self, attribution: Attribution) -> Self {
        Self {
            operator: Some(attribution),
            ..self.clone()
        }
    }

    fn boolean(&self) -> Self {
        Self {
            mode: Mode::Boolean,
            collect: false,
            ..self.clone()
        }
    }

    // ── Comparison ──────────────────────────────────────────────────────────

    /// Compare `got` against `expected` exactly as the engine would at this
    /// point of the walk.
    ///
    /// # Errors
    ///
    /// Returns the mismatch, if any.
    pub fn deep_equal(&self, got: &Value, expected: &Value) -> MatchResult {
        engine::deep_equal(self, got, expected)
    }

    /// Boolean sub-query sharing this call's state; never reports anything.
    #[must_use]
    pub fn matches(&self, got: &Value, expected: &Value) -> bool {
        engine::deep_equal(&self.boolean(), got, expected).is_ok()
    }

    /// Raise a mismatch at the current path.
    ///
    /// In boolean mode `build` is not called. Otherwise the report gets this
    /// context's path and operator attribution, then is either returned or,
    /// when several errors are collected, stored until the configured
    /// maximum is reached (in which case everything collected so far is
    /// merged and returned).
    ///
    /// # Errors
    ///
    /// Returns the mismatch unless it was stored for later.
    pub fn fail(&self, build: impl FnOnce() -> Report) -> MatchResult {
        if self.is_boolean() {
            return Err(Mismatch::Boolean);
        }
        let mut report = build();
        report.path = self.path.to_string();
        if report.location.is_none() {
            report.location = self.operator;
        }
        if !self.collect {
            return Err(report.into());
        }
        let mut errors = self.shared.errors.borrow_mut();
        errors.push(report);
        let max = self.config.max_errors();
        if max != 0 && errors.len() >= max {
            let collected: Vec<Report> = errors.drain(..).collect();
            return Err(Report::merge(collected).map_or(Mismatch::Boolean, Mismatch::from));
        }
        Ok(())
    }

    /// Enter the `(got, expected)` identity pair; `None` if it is already
    /// being compared further up the stack.
    pub(crate) fn visit(&self, got: usize, expected: usize) -> Option<VisitGuard<'a>> {
        let pair = (got, expected);
        if !self.shared.visited.borrow_mut().insert(pair) {
            return None;
        }
        Some(VisitGuard {
            visited: &self.shared.visited,
            pair,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_keeps_parent() {
        let config = Config::default();
        let shared = Shared::default();
        let ctx = Context::root(&config, &shared, Mode::Diagnostic);
        let child = ctx.field("a").index(2);
        assert_eq!(ctx.path().to_string(), "DATA");
        assert_eq!(child.path().to_string(), "DATA.a[2]");
        assert_eq!(child.mode(), Mode::Diagnostic);
    }

    #[test]
    fn test_visit_push_pop() {
        let config = Config::default();
        let shared = Shared::default();
        let ctx = Context::root(&config, &shared, Mode::Boolean);
        {
            let guard = ctx.visit(1, 2);
            assert!(guard.is_some());
            assert!(ctx.visit(1, 2).is_none());
        }
        assert!(ctx.visit(1, 2).is_some());
    }

    #[test]
    fn test_fail_boolean_skips_build() {
        let config = Config::default();
        let shared = Shared::default();
        let ctx = Context::root(&config, &shared, Mode::Boolean);
        let res = ctx.fail(|| panic!("must not build in boolean mode"));
        assert!(matches!(res, Err(Mismatch::Boolean)));
    }

    #[test]
    fn test_fail_sets_path() {
        let config = Config::default();
        let shared = Shared::default();
        let ctx = Context::root(&config, &shared, Mode::Diagnostic).field("x");
        let report = ctx
            .fail(|| Report::new("nope"))
            .unwrap_err()
            .into_report()
            .unwrap();
        assert_eq!(report.path, "DATA.x");
    }

    #[test]
    fn test_fail_collects_up_to_max() {
        let config = Config::builder().max_errors(2).build();
        let shared = Shared::default();
        let ctx = Context::root(&config, &shared, Mode::Diagnostic);
        assert!(ctx.index(0).fail(|| Report::new("first")).is_ok());
        let merged = ctx
            .index(1)
            .fail(|| Report::new("second"))
            .unwrap_err()
            .into_report()
            .unwrap();
        assert_eq!(merged.count(), 2);
        assert_eq!(merged.path, "DATA[0]");
        assert!(shared.take_errors().is_empty());
    }
}
