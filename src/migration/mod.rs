//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_pipeline_build;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_pipeline_build::Migration),
            Box::new(m20260301_000002_create_pipeline_build_test::Migration),
        ]
    }
}
