//! Test-result ingestion services.

pub mod build_log;
pub mod junit;
pub mod locator;
pub mod reporter;
pub mod status;
pub mod step;

pub use build_log::{BuildLog, TracingBuildLog};
pub use junit::{parse_report, parse_report_files};
pub use locator::locate_reports;
pub use reporter::TrackingClient;
pub use status::determine_status;
pub use step::{StepConfig, StepOutcome};
