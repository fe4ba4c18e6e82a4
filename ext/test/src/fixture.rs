//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the deepmatch engine.

use deepmatch::{explain_with, matches_with, Config, Settings, Value};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::expected::build_expected;
use crate::FixtureError;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cases: Vec<Case>,
}

/// One comparison and its expected outcome.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    /// Omitted means absent.
    #[serde(default)]
    pub actual: Json,
    #[serde(default)]
    pub expected: Json,
    #[serde(default)]
    pub settings: Settings,
    pub matches: bool,
    /// Path of the mismatch, when `matches` is false.
    #[serde(default)]
    pub path: Option<String>,
    /// Message of the mismatch, when `matches` is false.
    #[serde(default)]
    pub message: Option<String>,
    /// Number of merged reports, when `matches` is false.
    #[serde(default)]
    pub errors: Option<usize>,
}

/// Result of running a single case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    /// Why the case failed, if it did.
    pub failure: Option<String>,
}

impl Case {
    /// Run this case.
    ///
    /// # Errors
    ///
    /// If `expected` does not describe a valid expected value.
    pub fn run(&self) -> Result<CaseResult, FixtureError> {
        let config = Config::builder().settings(&self.settings).build();
        let actual = Value::from(&self.actual);
        let expected = build_expected(&self.expected)?;

        let matched = matches_with(&config, &actual, &expected);
        let report = explain_with(&config, &actual, &expected);

        let mut failures = Vec::new();
        if matched != report.is_none() {
            failures.push(format!(
                "matches() says {matched} but explain() says {:?}",
                report.as_ref().map(ToString::to_string)
            ));
        }
        if matched != self.matches {
            failures.push(format!(
                "expected matches = {}, got {matched}{}",
                self.matches,
                report
                    .as_ref()
                    .map(|r| format!("\n{r}"))
                    .unwrap_or_default()
            ));
        }
        if let Some(report) = &report {
            if let Some(path) = &self.path {
                if &report.path != path {
                    failures.push(format!("expected path {path}, got {}", report.path));
                }
            }
            if let Some(message) = &self.message {
                if report.message != message.as_str() {
                    failures.push(format!("expected message {message:?}, got {:?}", report.message));
                }
            }
            if let Some(errors) = self.errors {
                if report.count() != errors {
                    failures.push(format!("expected {errors} errors, got {}", report.count()));
                }
            }
        }

        Ok(CaseResult {
            case_name: self.name.clone(),
            passed: failures.is_empty(),
            failure: (!failures.is_empty()).then(|| failures.join("\n")),
        })
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    ///
    /// # Errors
    ///
    /// If the document is not a fixture.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    ///
    /// # Errors
    ///
    /// If any document is not a fixture.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, FixtureError> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    ///
    /// # Errors
    ///
    /// If a case's expected document is invalid.
    pub fn run(&self) -> Result<Vec<CaseResult>, FixtureError> {
        self.cases.iter().map(Case::run).collect()
    }

    /// Run all test cases and panic on first failure
    ///
    /// # Panics
    ///
    /// On an invalid case or a failed case.
    pub fn run_and_assert(&self) {
        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' is invalid: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: {}",
                self.name,
                result.case_name,
                result.failure.unwrap_or_default()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_outcomes() {
        let fixture = Fixture::from_yaml(
            r#"
name: smoke
cases:
  - name: equal
    actual: [1, 2]
    expected: [1, 2]
    matches: true
  - name: wrong path claimed
    actual: [1, 2]
    expected: [1, 3]
    matches: false
    path: "DATA[0]"
"#,
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(
            results[1].failure.as_deref(),
            Some("expected path DATA[0], got DATA[1]")
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Fixture::from_yaml(
            "name: x\ncases:\n  - name: y\n    matches: true\n    expect: 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, FixtureError::Yaml(_)));
    }

    #[test]
    fn test_absent_by_default() {
        let fixture = Fixture::from_yaml(
            "name: x\ncases:\n  - name: both absent\n    matches: true\n",
        )
        .unwrap();
        fixture.run_and_assert();
    }
}
