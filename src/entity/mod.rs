//! SeaORM entity definitions.

pub mod pipeline_build;
