//! JUnit parsing build step.
//!
//! Usage: `parse-junit path=<glob> cds.project=<key> cds.application=<name>
//! cds.pipeline=<name> cds.buildNumber=<n> [cds.environment=<name>]`
//!
//! Parses the matching reports, pushes the aggregate to the tracking service
//! configured through `BTR_API_URL` and exits with status 1 on a failed step.

use std::process::ExitCode;

use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use btr_lib::config::TrackerSettings;
use btr_lib::services::step;
use btr_lib::services::{TracingBuildLog, TrackingClient};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut params = Vec::with_capacity(args.len());
    for arg in &args {
        match arg.split_once('=') {
            Some(pair) => params.push(pair),
            None => {
                error!("Invalid parameter '{}', expected name=value", arg);
                return ExitCode::from(2);
            }
        }
    }

    let settings = match TrackerSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load tracking service settings: {}", e);
            return ExitCode::from(2);
        }
    };

    let client = match TrackingClient::new(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let action_build_id = std::env::var("BTR_ACTION_BUILD_ID")
        .ok()
        .and_then(|id| id.trim().parse::<i64>().ok());
    let log = TracingBuildLog::new(action_build_id);

    let outcome = step::execute(params, &client, &log).await;

    if let Some(ref tests) = outcome.tests {
        info!(
            total = tests.total,
            total_ok = tests.total_ok,
            total_ko = tests.total_ko,
            total_skipped = tests.total_skipped,
            "Step finished: {}",
            outcome.status
        );
    } else {
        info!("Step finished: {}", outcome.status);
    }

    if outcome.status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
