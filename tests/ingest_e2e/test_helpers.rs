//! Shared test helpers for ingestion E2E tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_web::{App, dev::ServiceResponse, test, web};
use btr_lib::config::{DatabaseSettings, TrackerSettings};
use btr_lib::db::DbPool;
use btr_lib::db::pipeline_builds::NewPipelineBuild;
use btr_lib::middleware::RequestLogger;
use btr_lib::models::{BuildRef, TestDocument, TestSuite};
use btr_lib::services::{BuildLog, TrackingClient};
use tempfile::TempDir;

/// Report with two JUnit suites: 12 tests, 1 failure, 1 skipped.
pub const JUNIT_TWO_SUITES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="api" tests="7" failures="1" skipped="0">
    <testcase classname="api" name="create"><failure message="expected 201"/></testcase>
  </testsuite>
  <testsuite name="db" tests="5" failures="0" skipped="1"/>
</testsuites>"#;

/// Unit suite: 10 tests, 1 skipped.
pub const JUNIT_UNIT: &str = r#"<testsuites>
  <testsuite name="unit" tests="10" failures="0" skipped="1"/>
</testsuites>"#;

/// Integration suite: 5 tests, 2 failures.
pub const JUNIT_INTEGRATION: &str = r#"<testsuites>
  <testsuite name="integration" tests="5" failures="2" skipped="0"/>
</testsuites>"#;

/// All-green nosetests report.
pub const NOSETESTS_GREEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="nosetests" tests="3" errors="0" failures="0" skip="1">
  <testcase classname="tests.test_api" name="test_ok" time="0.010"/>
</testsuite>"#;

/// Fresh SQLite database with migrations applied.
///
/// Keep the returned directory alive for the duration of the test.
pub async fn create_test_pool() -> (DbPool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("btr.db").display());

    let mut settings = DatabaseSettings::with_url(url);
    settings.max_connections = 1;
    settings.min_connections = 1;

    let pool = DbPool::connect(&settings)
        .await
        .expect("Failed to connect to database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");

    (pool, dir)
}

/// Build reference used across tests.
pub fn build_ref(build_number: i64, environment: &str) -> BuildRef {
    BuildRef {
        project_key: "PRJ".to_string(),
        application_name: "app".to_string(),
        pipeline_name: "build".to_string(),
        build_number,
        environment_name: environment.to_string(),
    }
}

/// Insert a pipeline build and return its id.
pub async fn seed_build(pool: &DbPool, pipeline_id: i64, build: &BuildRef) -> i64 {
    pool.insert_pipeline_build(NewPipelineBuild {
        id: None,
        pipeline_id,
        project_key: build.project_key.clone(),
        application_name: build.application_name.clone(),
        pipeline_name: build.pipeline_name.clone(),
        environment_name: build.environment_name.clone(),
        build_number: build.build_number,
    })
    .await
    .expect("Failed to insert pipeline build")
    .id
}

/// Insert a pipeline build with an explicit id.
pub async fn seed_build_with_id(pool: &DbPool, id: i64, pipeline_id: i64) -> i64 {
    let build = build_ref(id, "");
    pool.insert_pipeline_build(NewPipelineBuild {
        id: Some(id),
        pipeline_id,
        project_key: build.project_key,
        application_name: build.application_name,
        pipeline_name: build.pipeline_name,
        environment_name: build.environment_name,
        build_number: build.build_number,
    })
    .await
    .expect("Failed to insert pipeline build")
    .id
}

/// Document with the given suites.
pub fn document(suites: &[(&str, i64, i64, i64)]) -> TestDocument {
    let suites = suites
        .iter()
        .map(|(name, total, failures, skipped)| TestSuite::new(*name, *total, *failures, *skipped))
        .collect();
    TestDocument::from_suites(suites).expect("Failed to aggregate suites")
}

/// Write a report fixture and return its path.
pub fn write_report(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create report dir");
    }
    std::fs::write(&path, content).expect("Failed to write report");
    path
}

/// Tracking client pointed at a mock server.
pub fn tracking_client(base_url: &str, api_key: Option<&str>) -> TrackingClient {
    let mut settings = TrackerSettings::new(base_url);
    settings.api_key = api_key.map(|k| k.to_string().into());
    TrackingClient::new(&settings).expect("Failed to build tracking client")
}

/// Reporting endpoint path of [`build_ref`].
pub fn test_results_path(build_number: i64) -> String {
    format!(
        "/project/PRJ/application/app/pipeline/build/build/{}/test",
        build_number
    )
}

/// Build log keeping every message in memory.
#[derive(Default)]
pub struct MemoryBuildLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryBuildLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl BuildLog for MemoryBuildLog {
    fn send(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

/// Create a test app serving the health and test results routes.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .configure(btr_lib::api::configure_health_routes)
            .configure(btr_lib::api::configure_test_results_routes),
    )
    .await
}
