//! Test suite and aggregated test document models.
//!
//! The same serialized form is used for the stored record and for the
//! payload pushed to the tracking service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// One logical test suite decoded from a report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestSuite {
    /// Suite name as written in the report
    pub name: String,
    /// Number of test cases in the suite
    #[serde(default)]
    pub total: i64,
    /// Number of failed test cases
    #[serde(default)]
    pub failures: i64,
    /// Number of skipped test cases
    #[serde(default)]
    pub skipped: i64,
}

impl TestSuite {
    /// Create a new suite.
    pub fn new(name: impl Into<String>, total: i64, failures: i64, skipped: i64) -> Self {
        TestSuite {
            name: name.into(),
            total,
            failures,
            skipped,
        }
    }

    /// Tests counted as OK for this suite (skipped tests included).
    pub fn ok(&self) -> i64 {
        self.total - self.failures
    }
}

/// Aggregated test results of one build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestDocument {
    #[serde(rename = "testsuites", default)]
    pub suites: Vec<TestSuite>,
    #[serde(default)]
    pub total: i64,
    #[serde(rename = "totalOK", default)]
    pub total_ok: i64,
    #[serde(rename = "totalKO", default)]
    pub total_ko: i64,
    #[serde(rename = "totalSkipped", default)]
    pub total_skipped: i64,
}

impl TestDocument {
    /// Fold an ordered sequence of suites into a document.
    ///
    /// Suite order is kept as given. Fails with [`AppError::Decode`] when a
    /// sum does not fit in an `i64`.
    pub fn from_suites(suites: Vec<TestSuite>) -> AppResult<Self> {
        let mut doc = TestDocument {
            suites,
            ..Default::default()
        };

        for suite in &doc.suites {
            let overflow = || {
                AppError::Decode(format!("test counts of suite {} overflow the totals", suite.name))
            };
            let ok = suite.total.checked_sub(suite.failures).ok_or_else(overflow)?;

            doc.total = doc.total.checked_add(suite.total).ok_or_else(overflow)?;
            doc.total_ok = doc.total_ok.checked_add(ok).ok_or_else(overflow)?;
            doc.total_ko = doc.total_ko.checked_add(suite.failures).ok_or_else(overflow)?;
            doc.total_skipped = doc
                .total_skipped
                .checked_add(suite.skipped)
                .ok_or_else(overflow)?;
        }

        Ok(doc)
    }

    /// Whether the document holds no suites at all.
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Suites that reported at least one failure.
    pub fn failing_suites(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.iter().filter(|s| s.failures > 0)
    }
}
