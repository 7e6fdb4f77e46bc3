//! Step verdict from aggregated test results.

use crate::models::{StepStatus, TestDocument};

use super::build_log::BuildLog;

/// Decide the step status of an aggregated document.
///
/// Every failing suite is reported to the build log. A document without any
/// test fails the step.
pub fn determine_status(tests: &TestDocument, log: &dyn BuildLog) -> StepStatus {
    let mut status = StepStatus::Success;

    for suite in tests.failing_suites() {
        log.send(&format!(
            "JUnit parser: {} has {} failed tests",
            suite.name, suite.failures
        ));
        status = StepStatus::Fail;
    }

    if tests.total == 0 {
        log.send("JUnit parser: No tests");
        status = StepStatus::Fail;
    }

    status
}
