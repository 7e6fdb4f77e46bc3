//! Build log sink for step messages.

use tracing::info;

/// Destination for human-readable step messages shown in the build log.
pub trait BuildLog: Send + Sync {
    fn send(&self, message: &str);
}

/// Build log that emits every message as a tracing event.
#[derive(Debug, Clone, Default)]
pub struct TracingBuildLog {
    action_build_id: Option<i64>,
}

impl TracingBuildLog {
    pub fn new(action_build_id: Option<i64>) -> Self {
        TracingBuildLog { action_build_id }
    }
}

impl BuildLog for TracingBuildLog {
    fn send(&self, message: &str) {
        match self.action_build_id {
            Some(id) => info!(action_build_id = id, "{}", message),
            None => info!("{}", message),
        }
    }
}
