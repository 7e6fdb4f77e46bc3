//! The JUnit parsing build step.
//!
//! Runs report discovery, parsing, aggregation and the verdict, then pushes
//! the aggregate to the tracking service. Every fatal condition ends the step
//! with [`StepStatus::Fail`] and a line in the build log; nothing panics or
//! exits the worker.

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{BuildRef, StepStatus, TestDocument};

use super::build_log::BuildLog;
use super::junit::parse_report_files;
use super::locator::locate_reports;
use super::reporter::TrackingClient;
use super::status::determine_status;

pub const PARAM_PATH: &str = "path";
pub const PARAM_PROJECT: &str = "cds.project";
pub const PARAM_APPLICATION: &str = "cds.application";
pub const PARAM_PIPELINE: &str = "cds.pipeline";
pub const PARAM_BUILD_NUMBER: &str = "cds.buildNumber";
pub const PARAM_ENVIRONMENT: &str = "cds.environment";

/// Validated step input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    /// Report path glob
    pub path: String,
    /// Build the results are reported for
    pub build: BuildRef,
}

impl StepConfig {
    /// Build the configuration from `name=value` action parameters.
    ///
    /// The first occurrence of a name wins; unknown names are ignored.
    pub fn from_params<'a, I>(params: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut path = None;
        let mut project = None;
        let mut application = None;
        let mut pipeline = None;
        let mut build_number = None;
        let mut environment = None;

        for (name, value) in params {
            let slot = match name {
                PARAM_PATH => &mut path,
                PARAM_PROJECT => &mut project,
                PARAM_APPLICATION => &mut application,
                PARAM_PIPELINE => &mut pipeline,
                PARAM_BUILD_NUMBER => &mut build_number,
                PARAM_ENVIRONMENT => &mut environment,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        let path = path.filter(|p| !p.is_empty()).ok_or_else(|| {
            AppError::Configuration("UnitTest parser: path not provided".to_string())
        })?;

        let build_number = required(PARAM_BUILD_NUMBER, build_number)?;
        let build_number = build_number.trim().parse::<i64>().map_err(|_| {
            AppError::Configuration(format!(
                "UnitTest parser: {} must be an integer, got '{}'",
                PARAM_BUILD_NUMBER, build_number
            ))
        })?;

        Ok(StepConfig {
            path,
            build: BuildRef {
                project_key: required(PARAM_PROJECT, project)?,
                application_name: required(PARAM_APPLICATION, application)?,
                pipeline_name: required(PARAM_PIPELINE, pipeline)?,
                build_number,
                environment_name: environment.unwrap_or_default(),
            },
        })
    }
}

fn required(name: &str, value: Option<String>) -> AppResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Configuration(format!("UnitTest parser: {} not provided", name)))
}

/// Result of one step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub status: StepStatus,
    /// Aggregated document; `None` when the step stopped before aggregation
    pub tests: Option<TestDocument>,
}

impl StepOutcome {
    fn failed() -> Self {
        StepOutcome {
            status: StepStatus::Fail,
            tests: None,
        }
    }
}

/// Parse raw action parameters and run the step.
pub async fn execute<'a, I>(params: I, client: &TrackingClient, log: &dyn BuildLog) -> StepOutcome
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    match StepConfig::from_params(params) {
        Ok(config) => run(&config, client, log).await,
        Err(e) => {
            log_failure(log, &e);
            StepOutcome::failed()
        }
    }
}

/// Run the step for a validated configuration.
pub async fn run(config: &StepConfig, client: &TrackingClient, log: &dyn BuildLog) -> StepOutcome {
    let files = match locate_reports(&config.path) {
        Ok(files) => files,
        Err(e) => {
            debug!("Report pattern rejected: {}", e);
            log_failure(log, &e);
            return StepOutcome::failed();
        }
    };

    debug!("Found {} report file(s) for {}", files.len(), config.path);

    let suites = match parse_report_files(&files).await {
        Ok(suites) => suites,
        Err(e) => {
            log_failure(log, &e);
            return StepOutcome::failed();
        }
    };

    let tests = match TestDocument::from_suites(suites) {
        Ok(tests) => tests,
        Err(e) => {
            log_failure(log, &e);
            return StepOutcome::failed();
        }
    };
    let mut status = determine_status(&tests, log);

    if let Err(e) = client.send_test_results(&config.build, &tests).await {
        log_failure(log, &e);
        status = StepStatus::Fail;
    }

    StepOutcome {
        status,
        tests: Some(tests),
    }
}

fn log_failure(log: &dyn BuildLog, error: &AppError) {
    let message = match error {
        AppError::Configuration(detail) => detail.clone(),
        AppError::InvalidPattern(_) => {
            "UnitTest parser: Cannot find requested files, invalid pattern".to_string()
        }
        AppError::Io { .. } => format!("UnitTest parser: {}", error),
        AppError::Decode(detail) => format!("UnitTest parser: {}", detail),
        AppError::Reporting(detail) => {
            format!("JUnit parse: failed to send tests details: {}", detail)
        }
        other => format!("JUnit parse: {}", other),
    };
    log.send(&message);
}
