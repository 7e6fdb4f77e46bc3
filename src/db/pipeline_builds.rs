//! Database queries for pipeline builds.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use crate::entity::pipeline_build::{self, ActiveModel, Entity as PipelineBuild};
use crate::error::{AppError, AppResult};
use crate::models::BuildRef;

use super::DbPool;

/// Represents a pipeline build to be inserted.
#[derive(Debug, Clone)]
pub struct NewPipelineBuild {
    /// Explicit build id; generated when `None`
    pub id: Option<i64>,
    pub pipeline_id: i64,
    pub project_key: String,
    pub application_name: String,
    pub pipeline_name: String,
    pub environment_name: String,
    pub build_number: i64,
}

impl DbPool {
    /// Insert a new pipeline build.
    pub async fn insert_pipeline_build(
        &self,
        build: NewPipelineBuild,
    ) -> AppResult<pipeline_build::Model> {
        let model = ActiveModel {
            id: build.id.map(Set).unwrap_or(NotSet),
            pipeline_id: Set(build.pipeline_id),
            project_key: Set(build.project_key),
            application_name: Set(build.application_name),
            pipeline_name: Set(build.pipeline_name),
            environment_name: Set(build.environment_name),
            build_number: Set(build.build_number),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert pipeline build: {}", e)))?;

        Ok(result)
    }

    /// Resolve a build from its reporting path components.
    ///
    /// The most recent row wins if the build system recorded duplicates.
    pub async fn find_pipeline_build(
        &self,
        build: &BuildRef,
    ) -> AppResult<Option<pipeline_build::Model>> {
        let result = PipelineBuild::find()
            .filter(pipeline_build::Column::ProjectKey.eq(build.project_key.as_str()))
            .filter(pipeline_build::Column::ApplicationName.eq(build.application_name.as_str()))
            .filter(pipeline_build::Column::PipelineName.eq(build.pipeline_name.as_str()))
            .filter(pipeline_build::Column::BuildNumber.eq(build.build_number))
            .filter(pipeline_build::Column::EnvironmentName.eq(build.environment_name.as_str()))
            .order_by_desc(pipeline_build::Column::Id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find pipeline build: {}", e)))?;

        Ok(result)
    }

    /// Delete a pipeline build; its stored test results cascade.
    pub async fn delete_pipeline_build(&self, id: i64) -> AppResult<u64> {
        let result = PipelineBuild::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete pipeline build: {}", e)))?;

        Ok(result.rows_affected)
    }
}
