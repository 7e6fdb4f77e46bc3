//! Pipeline build entity (owned by the build system, read here).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pipeline_build")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pipeline_id: i64,
    pub project_key: String,
    pub application_name: String,
    pub pipeline_name: String,
    /// Empty for pipelines that run without an environment.
    pub environment_name: String,
    pub build_number: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pipeline_build_test::Entity")]
    TestResults,
}

impl Related<super::pipeline_build_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
