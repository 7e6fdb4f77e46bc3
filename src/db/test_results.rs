//! Database queries for stored build test results.
//!
//! A build owns at most one serialized [`TestDocument`]. Absence of a record
//! reads as the empty document; writes go through [`DbPool::replace_test_results`],
//! which deletes and inserts inside one transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::debug;

use crate::entity::pipeline_build;
use crate::entity::pipeline_build_test::{self, ActiveModel, Entity as PipelineBuildTest};
use crate::error::{AppError, AppResult};
use crate::models::TestDocument;

use super::DbPool;

/// Insert a test document for a build on any connection or transaction.
///
/// The caller must make sure no record exists yet for the build.
pub async fn insert_test_results_with<C>(
    conn: &C,
    pipeline_build_id: i64,
    tests: &TestDocument,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let data = serde_json::to_string(tests)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize test results: {}", e)))?;

    let model = ActiveModel {
        pipeline_build_id: Set(pipeline_build_id),
        tests: Set(data),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test results: {}", e)))?;

    Ok(())
}

async fn delete_test_results_with<C>(conn: &C, pipeline_build_id: i64) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = PipelineBuildTest::delete_many()
        .filter(pipeline_build_test::Column::PipelineBuildId.eq(pipeline_build_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete test results: {}", e)))?;

    Ok(result.rows_affected)
}

impl DbPool {
    /// Load the test results of a build.
    ///
    /// Returns the empty document when nothing was stored for the build.
    pub async fn load_test_results(&self, pipeline_build_id: i64) -> AppResult<TestDocument> {
        let record = PipelineBuildTest::find()
            .filter(pipeline_build_test::Column::PipelineBuildId.eq(pipeline_build_id))
            .order_by_desc(pipeline_build_test::Column::Id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test results: {}", e)))?;

        let Some(record) = record else {
            return Ok(TestDocument::default());
        };

        serde_json::from_str(&record.tests).map_err(|e| {
            AppError::Decode(format!(
                "Failed to decode test results of build {}: {}",
                pipeline_build_id, e
            ))
        })
    }

    /// Insert the test results of a build.
    pub async fn insert_test_results(
        &self,
        pipeline_build_id: i64,
        tests: &TestDocument,
    ) -> AppResult<()> {
        insert_test_results_with(self.connection(), pipeline_build_id, tests).await
    }

    /// Replace whatever is stored for a build with `tests`.
    ///
    /// Delete and insert run in one transaction; on failure the previous
    /// record is left untouched. Concurrent replaces of one build are
    /// last-commit-wins.
    pub async fn replace_test_results(
        &self,
        pipeline_build_id: i64,
        tests: &TestDocument,
    ) -> AppResult<()> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Dropping txn without commit rolls it back
        let removed = delete_test_results_with(&txn, pipeline_build_id).await?;
        insert_test_results_with(&txn, pipeline_build_id, tests).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit test results: {}", e)))?;

        debug!(
            pipeline_build_id,
            removed,
            suites = tests.suites.len(),
            "Replaced test results"
        );

        Ok(())
    }

    /// Delete the test results of a build.
    pub async fn delete_test_results(&self, pipeline_build_id: i64) -> AppResult<u64> {
        delete_test_results_with(self.connection(), pipeline_build_id).await
    }

    /// Delete the test results of every build of a pipeline in one statement.
    pub async fn delete_pipeline_test_results(&self, pipeline_id: i64) -> AppResult<u64> {
        let builds = pipeline_build::Entity::find()
            .select_only()
            .column(pipeline_build::Column::Id)
            .filter(pipeline_build::Column::PipelineId.eq(pipeline_id))
            .into_query();

        let result = PipelineBuildTest::delete_many()
            .filter(pipeline_build_test::Column::PipelineBuildId.in_subquery(builds))
            .exec(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to delete pipeline test results: {}", e))
            })?;

        Ok(result.rows_affected)
    }

    /// Number of stored records for a build.
    pub async fn count_test_results(&self, pipeline_build_id: i64) -> AppResult<u64> {
        let count = PipelineBuildTest::find()
            .filter(pipeline_build_test::Column::PipelineBuildId.eq(pipeline_build_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test results: {}", e)))?;

        Ok(count)
    }
}
