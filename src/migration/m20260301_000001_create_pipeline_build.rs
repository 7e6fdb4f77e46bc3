//! Create pipeline_build table.
//!
//! Builds are owned by the build system; the table is the foreign-key
//! target for stored test results and resolves reporting paths to a build id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PipelineBuild::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelineBuild::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PipelineBuild::PipelineId).big_integer().not_null())
                    .col(ColumnDef::new(PipelineBuild::ProjectKey).string().not_null())
                    .col(ColumnDef::new(PipelineBuild::ApplicationName).string().not_null())
                    .col(ColumnDef::new(PipelineBuild::PipelineName).string().not_null())
                    .col(
                        ColumnDef::new(PipelineBuild::EnvironmentName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(PipelineBuild::BuildNumber).big_integer().not_null())
                    .col(
                        ColumnDef::new(PipelineBuild::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Pipeline-wide deletes select builds by pipeline
        manager
            .create_index(
                Index::create()
                    .name("idx_pipeline_build_pipeline_id")
                    .table(PipelineBuild::Table)
                    .col(PipelineBuild::PipelineId)
                    .to_owned(),
            )
            .await?;

        // Reporting path lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_pipeline_build_lookup")
                    .table(PipelineBuild::Table)
                    .col(PipelineBuild::ProjectKey)
                    .col(PipelineBuild::ApplicationName)
                    .col(PipelineBuild::PipelineName)
                    .col(PipelineBuild::BuildNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PipelineBuild::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PipelineBuild {
    Table,
    Id,
    PipelineId,
    ProjectKey,
    ApplicationName,
    PipelineName,
    EnvironmentName,
    BuildNumber,
    CreatedAt,
}
