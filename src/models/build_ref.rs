//! Addressing of one pipeline build on the reporting endpoint.

/// Path components addressing one build on the reporting endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
    pub project_key: String,
    pub application_name: String,
    pub pipeline_name: String,
    pub build_number: i64,
    /// Empty when the build has no environment
    pub environment_name: String,
}

impl std::fmt::Display for BuildRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{} #{}",
            self.project_key, self.application_name, self.pipeline_name, self.build_number
        )?;
        if !self.environment_name.is_empty() {
            write!(f, " ({})", self.environment_name)?;
        }
        Ok(())
    }
}
