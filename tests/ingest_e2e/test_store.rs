//! E2E tests: result store semantics.

use btr_lib::entity::pipeline_build_test;
use btr_lib::error::AppError;
use btr_lib::models::TestDocument;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use super::test_helpers::*;

/// Replace then load returns the document; an unwritten build reads empty.
#[actix_rt::test]
async fn test_replace_then_load() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 42, 1).await;
    seed_build_with_id(&pool, 43, 1).await;

    let doc = document(&[("unit", 10, 0, 1), ("integration", 5, 2, 0)]);
    pool.replace_test_results(build_id, &doc).await.unwrap();

    assert_eq!(pool.load_test_results(42).await.unwrap(), doc);
    assert_eq!(pool.load_test_results(43).await.unwrap(), TestDocument::default());
}

/// Loading a build id that does not exist at all is not an error.
#[actix_rt::test]
async fn test_load_unknown_build_is_empty() {
    let (pool, _dir) = create_test_pool().await;

    let doc = pool.load_test_results(999).await.unwrap();
    assert!(doc.is_empty());
    assert_eq!(doc.total, 0);
}

/// A second replace leaves exactly one record, equal to the second document.
#[actix_rt::test]
async fn test_replace_keeps_latest_only() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 42, 1).await;

    let first = document(&[("unit", 10, 0, 0)]);
    let second = document(&[("unit", 12, 1, 0), ("e2e", 3, 0, 3)]);

    pool.replace_test_results(build_id, &first).await.unwrap();
    pool.replace_test_results(build_id, &second).await.unwrap();

    assert_eq!(pool.count_test_results(build_id).await.unwrap(), 1);
    assert_eq!(pool.load_test_results(build_id).await.unwrap(), second);
}

/// Replace after a plain insert still converges to one record.
#[actix_rt::test]
async fn test_insert_then_replace() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 7, 1).await;

    pool.insert_test_results(build_id, &document(&[("old", 1, 1, 0)]))
        .await
        .unwrap();
    let doc = document(&[("new", 4, 0, 0)]);
    pool.replace_test_results(build_id, &doc).await.unwrap();

    assert_eq!(pool.count_test_results(build_id).await.unwrap(), 1);
    assert_eq!(pool.load_test_results(build_id).await.unwrap(), doc);
}

/// A failed replace stores nothing.
#[actix_rt::test]
async fn test_replace_for_missing_build_fails_and_stores_nothing() {
    let (pool, _dir) = create_test_pool().await;

    let err = pool
        .replace_test_results(404, &document(&[("unit", 1, 0, 0)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)), "{:?}", err);
    assert_eq!(pool.count_test_results(404).await.unwrap(), 0);
}

/// A replace that fails on insert keeps the previously stored document.
#[actix_rt::test]
async fn test_failed_replace_keeps_previous_results() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 42, 1).await;

    let stored = document(&[("unit", 10, 0, 1)]);
    pool.replace_test_results(build_id, &stored).await.unwrap();

    pool.connection()
        .execute_unprepared(
            "CREATE TRIGGER reject_marked_results BEFORE INSERT ON pipeline_build_test \
             WHEN NEW.tests LIKE '%rejected-suite%' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .await
        .unwrap();

    let err = pool
        .replace_test_results(build_id, &document(&[("rejected-suite", 3, 1, 0)]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)), "{:?}", err);
    assert_eq!(pool.count_test_results(build_id).await.unwrap(), 1);
    assert_eq!(pool.load_test_results(build_id).await.unwrap(), stored);
}

/// Deleting one build's results leaves other builds alone.
#[actix_rt::test]
async fn test_delete_for_build() {
    let (pool, _dir) = create_test_pool().await;
    let a = seed_build_with_id(&pool, 1, 10).await;
    let b = seed_build_with_id(&pool, 2, 10).await;

    pool.replace_test_results(a, &document(&[("a", 1, 0, 0)])).await.unwrap();
    pool.replace_test_results(b, &document(&[("b", 1, 0, 0)])).await.unwrap();

    assert_eq!(pool.delete_test_results(a).await.unwrap(), 1);
    assert_eq!(pool.delete_test_results(a).await.unwrap(), 0);

    assert!(pool.load_test_results(a).await.unwrap().is_empty());
    assert_eq!(pool.count_test_results(b).await.unwrap(), 1);
}

/// Deleting a pipeline's results removes every build of that pipeline only.
#[actix_rt::test]
async fn test_delete_for_pipeline() {
    let (pool, _dir) = create_test_pool().await;
    let a = seed_build_with_id(&pool, 1, 10).await;
    let b = seed_build_with_id(&pool, 2, 10).await;
    let other = seed_build_with_id(&pool, 3, 20).await;

    for id in [a, b, other] {
        pool.replace_test_results(id, &document(&[("suite", 2, 0, 0)]))
            .await
            .unwrap();
    }

    assert_eq!(pool.delete_pipeline_test_results(10).await.unwrap(), 2);

    assert_eq!(pool.count_test_results(a).await.unwrap(), 0);
    assert_eq!(pool.count_test_results(b).await.unwrap(), 0);
    assert_eq!(pool.count_test_results(other).await.unwrap(), 1);
}

/// Deleting the owning build cascades to its stored results.
#[actix_rt::test]
async fn test_delete_build_cascades() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 5, 1).await;
    pool.replace_test_results(build_id, &document(&[("unit", 3, 0, 0)]))
        .await
        .unwrap();

    assert_eq!(pool.delete_pipeline_build(build_id).await.unwrap(), 1);
    assert_eq!(pool.count_test_results(build_id).await.unwrap(), 0);
}

/// A stored blob that is not a test document surfaces as a decode error.
#[actix_rt::test]
async fn test_load_corrupt_record() {
    let (pool, _dir) = create_test_pool().await;
    let build_id = seed_build_with_id(&pool, 6, 1).await;

    pipeline_build_test::ActiveModel {
        pipeline_build_id: Set(build_id),
        tests: Set("{not json".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap();

    let err = pool.load_test_results(build_id).await.unwrap_err();
    assert!(matches!(err, AppError::Decode(_)), "{:?}", err);
}

/// Builds resolve by their reporting path, environment included.
#[actix_rt::test]
async fn test_find_pipeline_build() {
    let (pool, _dir) = create_test_pool().await;
    let prod = seed_build(&pool, 1, &build_ref(12, "prod")).await;
    let bare = seed_build(&pool, 1, &build_ref(12, "")).await;

    let found = pool.find_pipeline_build(&build_ref(12, "prod")).await.unwrap();
    assert_eq!(found.map(|b| b.id), Some(prod));

    let found = pool.find_pipeline_build(&build_ref(12, "")).await.unwrap();
    assert_eq!(found.map(|b| b.id), Some(bare));

    assert!(pool
        .find_pipeline_build(&build_ref(13, "prod"))
        .await
        .unwrap()
        .is_none());
}
