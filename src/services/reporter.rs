//! Client pushing aggregated test results to the tracking service.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::{API_KEY_HEADER, TrackerSettings};
use crate::error::{AppError, AppResult};
use crate::models::{BuildRef, TestDocument};

/// HTTP client for the tracking service reporting endpoint.
#[derive(Clone)]
pub struct TrackingClient {
    base_url: String,
    api_key: Option<SecretString>,
    http_client: reqwest::Client,
}

impl TrackingClient {
    /// Create a client from tracking service settings.
    pub fn new(settings: &TrackerSettings) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            http_client,
        })
    }

    /// Reporting endpoint of one build.
    pub fn test_results_url(&self, build: &BuildRef) -> String {
        format!(
            "{}/project/{}/application/{}/pipeline/{}/build/{}/test?envName={}",
            self.base_url,
            urlencoding::encode(&build.project_key),
            urlencoding::encode(&build.application_name),
            urlencoding::encode(&build.pipeline_name),
            build.build_number,
            urlencoding::encode(&build.environment_name),
        )
    }

    /// POST the document to the build's reporting endpoint.
    ///
    /// A transport error or a status code above 300 is a
    /// [`AppError::Reporting`]. There is no retry.
    pub async fn send_test_results(&self, build: &BuildRef, tests: &TestDocument) -> AppResult<()> {
        let url = self.test_results_url(build);

        let mut request = self.http_client.post(&url).json(tests);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            warn!("Failed to reach tracking service for {}: {}", build, e);
            AppError::Reporting(e.to_string())
        })?;

        let status = response.status();
        if status.as_u16() > 300 {
            warn!("Tracking service rejected test results of {}: HTTP {}", build, status);
            return Err(AppError::Reporting(format!("HTTP {}", status.as_u16())));
        }

        debug!(
            suites = tests.suites.len(),
            status = status.as_u16(),
            "Sent test results of {}",
            build
        );

        Ok(())
    }
}
