//! Request logging middleware.
//!
//! One line per API call under the `api` target, tagged with the build the
//! route addresses. Health endpoints only log at debug level.

use std::fmt;
use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Path, Service, ServiceRequest, ServiceResponse, Transform, Url, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

const QUIET_PATHS: &[&str] = &["/health", "/ready"];

/// Build addressed by a matched route, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildTag {
    pub project: Option<String>,
    pub application: Option<String>,
    pub pipeline: Option<String>,
    pub build_number: Option<String>,
}

impl BuildTag {
    /// Read the build segments of a matched route.
    pub fn from_match_info(info: &Path<Url>) -> Self {
        let segment = |name: &str| info.get(name).map(str::to_string);
        BuildTag {
            project: segment("project"),
            application: segment("application"),
            pipeline: segment("pipeline"),
            build_number: segment("build_number"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == BuildTag::default()
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "{}/{}/{}#{}",
            part(&self.project),
            part(&self.application),
            part(&self.pipeline),
            part(&self.build_number)
        )
    }
}

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let environment = req
            .query_string()
            .split('&')
            .find_map(|pair| pair.strip_prefix("envName="))
            .unwrap_or_default()
            .to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            // Match info is only filled once the router has run
            let build = BuildTag::from_match_info(res.request().match_info());

            log_completion(&CompletedRequest {
                method: &method,
                path: &path,
                environment: &environment,
                build: &build,
                status: res.status(),
                duration_ms: start.elapsed().as_millis(),
            });

            Ok(res)
        })
    }
}

struct CompletedRequest<'a> {
    method: &'a str,
    path: &'a str,
    environment: &'a str,
    build: &'a BuildTag,
    status: StatusCode,
    duration_ms: u128,
}

fn log_completion(req: &CompletedRequest<'_>) {
    let status = req.status.as_u16();

    if QUIET_PATHS.contains(&req.path) && req.status.is_success() {
        debug!(target: "api", path = %req.path, status, "Health check answered");
        return;
    }

    macro_rules! emit {
        ($level:ident, $msg:literal) => {
            $level!(
                target: "api",
                method = %req.method,
                path = %req.path,
                build = %req.build,
                env = %req.environment,
                status,
                duration_ms = %req.duration_ms,
                $msg
            )
        };
    }

    if req.status.is_server_error() {
        emit!(error, "Server error");
    } else if req.status.is_client_error() {
        emit!(warn, "Request rejected");
    } else {
        emit!(info, "Request completed");
    }
}
