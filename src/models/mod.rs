//! Domain models for build test results.

pub mod build_ref;
pub mod step_status;
pub mod test_document;

pub use build_ref::BuildRef;
pub use step_status::StepStatus;
pub use test_document::{TestDocument, TestSuite};
