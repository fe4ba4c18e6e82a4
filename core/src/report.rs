//! Mismatch reports: the diagnostic-mode result of a comparison.
//!
//! A [`Report`] says where ([`path`](Report::path)) and why
//! ([`message`](Report::message)) a comparison failed, with renderings of
//! both sides or a structured [`Summary`] for container mismatches.
//!
//! # Chains
//!
//! - `origin`: the deeper failure this one wraps (composite operators).
//! - `next`: sibling failures collected in the same call and merged with
//!   [`Report::merge`].
//!
//! Both chains are built during a single call and always terminate.
//!
//! # Example
//!
//! ```
//! use deepmatch::explain;
//!
//! let report = explain(&vec![1_i64, 2, 3], &vec![1_i64, 2]).unwrap();
//! assert_eq!(report.path, "DATA");
//! assert_eq!(report.message, "comparing slices, from index #2");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

use itertools::Itertools;

use crate::Value;

/// Result of one comparison step: `Ok(())` means "matches".
pub type MatchResult = Result<(), Mismatch>;

/// A failed comparison.
#[derive(Debug, thiserror::Error)]
pub enum Mismatch {
    /// Boolean mode sentinel; carries no diagnostics.
    #[error("values do not match")]
    Boolean,
    /// Diagnostic mode report.
    #[error(transparent)]
    Report(Box<Report>),
}

impl Mismatch {
    /// The report, if this mismatch carries one.
    #[must_use]
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Boolean => None,
            Self::Report(r) => Some(r),
        }
    }

    /// Consume into the report, if any.
    #[must_use]
    pub fn into_report(self) -> Option<Report> {
        match self {
            Self::Boolean => None,
            Self::Report(r) => Some(*r),
        }
    }
}

impl From<Report> for Mismatch {
    fn from(report: Report) -> Self {
        Self::Report(Box::new(report))
    }
}

/// How one side of a mismatch is shown.
#[derive(Debug, Clone)]
pub enum Shown {
    Value(Value),
    /// Preformatted text (type names, operator renderings).
    Raw(Cow<'static, str>),
}

impl Shown {
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Raw(text.into())
    }
}

impl fmt::Display for Shown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<Value> for Shown {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// One labelled finding of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub label: String,
    pub value: String,
    pub explanation: Option<String>,
}

impl SummaryItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            explanation: None,
        }
    }

    #[must_use]
    pub fn explain(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// Structured findings of a container mismatch, replacing `got`/`expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Text(String),
    Items(Vec<SummaryItem>),
}

impl Summary {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// "Missing N items" / "Extra N items" findings of a set comparison.
    ///
    /// `noun` is the singular name of the compared things (`"item"`,
    /// `"key"`). Values are listed in the order given; callers sort them
    /// when the container has no order of its own.
    #[must_use]
    pub fn set_diff(noun: &str, missing: &[Value], extra: &[Value]) -> Self {
        let mut items = Vec::with_capacity(2);
        for (label, values) in [("Missing", missing), ("Extra", extra)] {
            if values.is_empty() {
                continue;
            }
            let plural = if values.len() == 1 { "" } else { "s" };
            items.push(SummaryItem::new(
                format!("{label} {} {noun}{plural}", values.len()),
                format!("({})", values.iter().join(", ")),
            ));
        }
        Self::Items(items)
    }

    /// Items of an `Items` summary.
    #[must_use]
    pub fn items(&self) -> &[SummaryItem] {
        match self {
            Self::Text(_) => &[],
            Self::Items(items) => items,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => indent(f, text, "\t"),
            Self::Items(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "\t{}: {}", item.label, item.value)?;
                    if let Some(explanation) = &item.explanation {
                        write!(f, "\n\t  {explanation}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Which operator a report is attributed to, and where it was built.
#[derive(Debug, Clone, Copy)]
pub struct Attribution {
    pub operator: &'static str,
    pub location: &'static Location<'static>,
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "under operator {} at {}:{}:{}",
            self.operator,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )
    }
}

/// A structured mismatch.
///
/// Built with [`Report::new`] and the chained setters; the engine fills in
/// `path` and `location` when the report is raised through a
/// [`Context`](crate::Context).
#[derive(Debug, Clone)]
pub struct Report {
    pub message: Cow<'static, str>,
    pub path: String,
    pub got: Option<Shown>,
    pub expected: Option<Shown>,
    pub summary: Option<Summary>,
    pub location: Option<Attribution>,
    pub origin: Option<Box<Report>>,
    pub next: Option<Box<Report>>,
}

impl Report {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            path: String::new(),
            got: None,
            expected: None,
            summary: None,
            location: None,
            origin: None,
            next: None,
        }
    }

    /// "values differ" with both sides shown.
    #[must_use]
    pub fn differ(got: impl Into<Shown>, expected: impl Into<Shown>) -> Self {
        Self::new("values differ").got(got).expected(expected)
    }

    #[must_use]
    pub fn got(mut self, got: impl Into<Shown>) -> Self {
        self.got = Some(got.into());
        self
    }

    #[must_use]
    pub fn expected(mut self, expected: impl Into<Shown>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: Summary) -> Self {
        self.summary = Some(summary);
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: Report) -> Self {
        self.origin = Some(Box::new(origin));
        self
    }

    /// Link reports into one `next` chain, in order.
    ///
    /// Returns `None` for an empty iterator.
    pub fn merge(reports: impl IntoIterator<Item = Report>) -> Option<Report> {
        let mut reports: Vec<Report> = reports.into_iter().collect();
        let mut merged: Option<Report> = None;
        while let Some(mut report) = reports.pop() {
            // reports may already carry a chain of their own
            if let Some(tail) = merged.take() {
                report.append(tail);
            }
            merged = Some(report);
        }
        merged
    }

    fn append(&mut self, tail: Report) {
        match self.next.as_deref_mut() {
            Some(next) => next.append(tail),
            None => self.next = Some(Box::new(tail)),
        }
    }

    /// This report followed by its merged siblings.
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        std::iter::successors(Some(self), |r| r.next.as_deref())
    }

    /// Number of reports in the `next` chain, this one included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// The deepest report of the `origin` chain.
    #[must_use]
    pub fn root_cause(&self) -> &Report {
        let mut report = self;
        while let Some(origin) = report.origin.as_deref() {
            report = origin;
        }
        report
    }

    fn fmt_one(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(summary) = &self.summary {
            write!(f, "\n{summary}")?;
        } else {
            if let Some(got) = &self.got {
                f.write_str("\n\t     got: ")?;
                indent_after_first(f, &got.to_string(), "\t          ")?;
            }
            if let Some(expected) = &self.expected {
                f.write_str("\n\texpected: ")?;
                indent_after_first(f, &expected.to_string(), "\t          ")?;
            }
        }
        if let Some(location) = &self.location {
            write!(f, "\n[{location}]")?;
        }
        if let Some(origin) = &self.origin {
            f.write_str("\nOriginates from following error:\n")?;
            indent(f, &origin.to_string(), "\t")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            report.fmt_one(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

fn indent(f: &mut fmt::Formatter<'_>, text: &str, prefix: &str) -> fmt::Result {
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{prefix}{line}")?;
    }
    Ok(())
}

fn indent_after_first(f: &mut fmt::Formatter<'_>, text: &str, prefix: &str) -> fmt::Result {
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            write!(f, "\n{prefix}")?;
        }
        f.write_str(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(path: &str, report: Report) -> Report {
        Report {
            path: path.to_string(),
            ..report
        }
    }

    #[test]
    fn test_display_got_expected() {
        let report = at(
            "DATA.a",
            Report::differ(Value::from(2_i64), Value::from(9_i64)),
        );
        assert_eq!(
            report.to_string(),
            "DATA.a: values differ\n\t     got: 2\n\texpected: 9"
        );
    }

    #[test]
    fn test_display_summary() {
        let report = at(
            "DATA",
            Report::new("comparing slices, from index #2")
                .summary(Summary::set_diff("item", &[], &[3_i64.into()])),
        );
        assert_eq!(
            report.to_string(),
            "DATA: comparing slices, from index #2\n\tExtra 1 item: (3)"
        );
    }

    #[test]
    fn test_display_origin() {
        let inner = at("DATA", Report::differ(Value::from(1_i64), Shown::raw("2")));
        let outer = at("DATA", Report::new("compared (part 1 of 2)").origin(inner));
        assert_eq!(
            outer.to_string(),
            "DATA: compared (part 1 of 2)\nOriginates from following error:\n\
             \tDATA: values differ\n\t\t     got: 1\n\t\texpected: 2"
        );
        assert_eq!(outer.root_cause().message, "values differ");
    }

    #[test]
    fn test_set_diff_labels() {
        let summary = Summary::set_diff(
            "key",
            &["a".into(), "b".into()],
            &["z".into()],
        );
        assert_eq!(
            summary.items(),
            &[
                SummaryItem::new("Missing 2 keys", "(\"a\", \"b\")"),
                SummaryItem::new("Extra 1 key", "(\"z\")"),
            ]
        );
    }

    #[test]
    fn test_merge() {
        assert!(Report::merge(Vec::new()).is_none());
        let merged = Report::merge([
            at("DATA[0]", Report::new("one")),
            at("DATA[1]", Report::new("two")),
            at("DATA[2]", Report::new("three")),
        ])
        .unwrap();
        assert_eq!(merged.count(), 3);
        let paths: Vec<_> = merged.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["DATA[0]", "DATA[1]", "DATA[2]"]);
        assert_eq!(
            merged.to_string(),
            "DATA[0]: one\nDATA[1]: two\nDATA[2]: three"
        );
    }

    #[test]
    fn test_mismatch_conversions() {
        assert!(Mismatch::Boolean.report().is_none());
        let m = Mismatch::from(Report::new("boom"));
        assert_eq!(m.to_string(), ": boom");
        assert_eq!(m.into_report().unwrap().message, "boom");
    }
}
