//! Build test results API handlers.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::db::DbPool;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{BuildRef, TestDocument};

use super::localize;

/// Path segments addressing one build.
#[derive(Debug, Deserialize)]
pub struct BuildPath {
    pub project: String,
    pub application: String,
    pub pipeline: String,
    /// Kept as text so a non-integer yields `INVALID_ID`
    pub build_number: String,
}

/// Query parameters of the test results endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnvironmentQuery {
    /// Environment the build ran in; empty when none.
    #[serde(rename = "envName", default)]
    pub env_name: String,
}

fn build_ref(path: BuildPath, query: EnvironmentQuery) -> AppResult<BuildRef> {
    let build_number = path.build_number.trim().parse::<i64>().map_err(|_| {
        AppError::InvalidId(format!("build number '{}' is not an integer", path.build_number))
    })?;

    Ok(BuildRef {
        project_key: path.project,
        application_name: path.application,
        pipeline_name: path.pipeline,
        build_number,
        environment_name: query.env_name,
    })
}

async fn resolve_build_id(pool: &DbPool, build: &BuildRef) -> AppResult<i64> {
    pool.find_pipeline_build(build)
        .await?
        .map(|b| b.id)
        .ok_or_else(|| AppError::NoPipelineBuild(build.to_string()))
}

async fn store_test_results(
    pool: &DbPool,
    build: BuildRef,
    body: &[u8],
) -> AppResult<TestDocument> {
    let tests: TestDocument = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("invalid test results: {}", e)))?;

    let build_id = resolve_build_id(pool, &build).await?;
    pool.replace_test_results(build_id, &tests).await?;

    info!(
        pipeline_build_id = build_id,
        total = tests.total,
        total_ko = tests.total_ko,
        "Stored test results of {}",
        build
    );

    Ok(tests)
}

async fn fetch_test_results(pool: &DbPool, build: BuildRef) -> AppResult<TestDocument> {
    let build_id = resolve_build_id(pool, &build).await?;
    pool.load_test_results(build_id).await
}

/// Store the test results of a build, replacing any previous results.
#[utoipa::path(
    post,
    path = "/project/{project}/application/{application}/pipeline/{pipeline}/build/{build_number}/test",
    tag = "Test Results",
    params(
        ("project" = String, Path, description = "Project key"),
        ("application" = String, Path, description = "Application name"),
        ("pipeline" = String, Path, description = "Pipeline name"),
        ("build_number" = i64, Path, description = "Build number"),
        EnvironmentQuery
    ),
    request_body = TestDocument,
    responses(
        (status = 200, description = "Stored test results", body = TestDocument),
        (status = 400, description = "Invalid build number or body", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown pipeline build", body = crate::error::ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[post("/project/{project}/application/{application}/pipeline/{pipeline}/build/{build_number}/test")]
pub async fn post_test_results(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    path: web::Path<BuildPath>,
    query: web::Query<EnvironmentQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let result = match build_ref(path.into_inner(), query.into_inner()) {
        Ok(build) => store_test_results(&pool, build, &body).await,
        Err(e) => Err(e),
    };

    result
        .map(|tests| HttpResponse::Ok().json(tests))
        .map_err(|e| localize(&req, e))
}

/// Get the test results of a build.
#[utoipa::path(
    get,
    path = "/project/{project}/application/{application}/pipeline/{pipeline}/build/{build_number}/test",
    tag = "Test Results",
    params(
        ("project" = String, Path, description = "Project key"),
        ("application" = String, Path, description = "Application name"),
        ("pipeline" = String, Path, description = "Pipeline name"),
        ("build_number" = i64, Path, description = "Build number"),
        EnvironmentQuery
    ),
    responses(
        (status = 200, description = "Stored test results, empty when none", body = TestDocument),
        (status = 400, description = "Invalid build number", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown pipeline build", body = crate::error::ErrorResponse)
    )
)]
#[get("/project/{project}/application/{application}/pipeline/{pipeline}/build/{build_number}/test")]
pub async fn get_test_results(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    path: web::Path<BuildPath>,
    query: web::Query<EnvironmentQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = match build_ref(path.into_inner(), query.into_inner()) {
        Ok(build) => fetch_test_results(&pool, build).await,
        Err(e) => Err(e),
    };

    result
        .map(|tests| HttpResponse::Ok().json(tests))
        .map_err(|e| localize(&req, e))
}

/// Configure test results routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(post_test_results).service(get_test_results);
}
