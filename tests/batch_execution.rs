//! Batch Execution Tests
//!
//! End-to-end through builder → engine → reconciler:
//! - completion order never changes the result
//! - one failing unit fails the whole batch
//! - fan-out SUM vs Oracle OVERWRITE
//! - worker panic and timeout surface as a single failure

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::thread_rng;

use shardbatch::batch::{
    BatchErrorCode, BatchExecutor, BatchStatement, BatchUnitsBuilder, ExecutionUnit,
    StatementError,
};
use shardbatch::engine::{EngineConfig, ExecutorEngine};
use shardbatch::observability::MetricsRegistry;
use shardbatch::types::{DatabaseType, SqlType, SUCCESS_NO_INFO};

/// Shard statement with scripted behavior
enum Shard {
    Ok { results: Vec<i32>, delay_ms: u64 },
    Fail { delay_ms: u64 },
    Panic,
}

impl BatchStatement for Shard {
    fn execute_batch(&self) -> Result<Vec<i32>, StatementError> {
        match self {
            Shard::Ok { results, delay_ms } => {
                std::thread::sleep(Duration::from_millis(*delay_ms));
                Ok(results.clone())
            }
            Shard::Fail { delay_ms } => {
                std::thread::sleep(Duration::from_millis(*delay_ms));
                Err(StatementError::Driver("Duplicate entry '7' for key 'PRIMARY'".into()))
            }
            Shard::Panic => panic!("driver crashed"),
        }
    }
}

fn target(ds: usize) -> ExecutionUnit {
    ExecutionUnit::new(format!("ds_{}", ds), "INSERT INTO t_order (order_id, user_id) VALUES (?, ?)")
}

/// Builds an executor: `shards[i]` backs `ds_i`, `calls[j]` lists the
/// data sources logical call `j` routes to.
fn executor(
    database_type: DatabaseType,
    shards: Vec<Shard>,
    calls: &[&[usize]],
    config: EngineConfig,
) -> BatchExecutor<Shard> {
    let shards: Vec<Arc<Shard>> = shards.into_iter().map(Arc::new).collect();
    let mut builder = BatchUnitsBuilder::new();
    for routes in calls {
        let targets: Vec<_> = routes.iter().map(|ds| target(*ds)).collect();
        builder
            .add_batch(&targets, |unit| {
                let ds: usize = unit.data_source["ds_".len()..].parse().unwrap();
                Ok(Arc::clone(&shards[ds]))
            })
            .unwrap();
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let engine = ExecutorEngine::new(config).unwrap().with_metrics(Arc::clone(&metrics));
    BatchExecutor::new(Arc::new(engine), database_type, SqlType::Dml, builder.build())
        .with_metrics(metrics)
}

fn ok(results: Vec<i32>, delay_ms: u64) -> Shard {
    Shard::Ok { results, delay_ms }
}

// =============================================================================
// Completion Order Independence
// =============================================================================

/// Random per-shard delays never change the reconciled result.
#[tokio::test]
async fn test_completion_order_independence() {
    let calls: &[&[usize]] = &[&[0], &[1], &[2, 3], &[0], &[3], &[1, 2]];
    let expected = vec![1, 10, 200 + 1000, 2, 2000, 20 + 100];

    let mut delays = vec![0u64, 15, 30, 45];
    let mut rng = thread_rng();
    for _ in 0..5 {
        delays.shuffle(&mut rng);
        let shards = vec![
            ok(vec![1, 2], delays[0]),
            ok(vec![10, 20], delays[1]),
            ok(vec![200, 100], delays[2]),
            ok(vec![1000, 2000], delays[3]),
        ];
        let executor = executor(DatabaseType::MySql, shards, calls, EngineConfig::with_concurrency(4));

        assert_eq!(executor.execute_batch().await.unwrap(), expected);
    }
}

/// Serial execution (one permit) gives the same answer as parallel.
#[tokio::test]
async fn test_serial_and_parallel_agree() {
    let calls: &[&[usize]] = &[&[0, 1], &[1], &[0]];
    let build = |concurrency| {
        executor(
            DatabaseType::PostgreSql,
            vec![ok(vec![3, 4], 20), ok(vec![5, 6], 0)],
            calls,
            EngineConfig::with_concurrency(concurrency),
        )
    };

    let serial = build(1).execute_batch().await.unwrap();
    let parallel = build(8).execute_batch().await.unwrap();

    assert_eq!(serial, parallel);
    assert_eq!(serial, vec![8, 6, 4]);
}

// =============================================================================
// Merge Policy by Database
// =============================================================================

/// Broadcast update on MySQL totals affected rows across shards.
#[tokio::test]
async fn test_broadcast_sums_affected_rows() {
    let executor = executor(
        DatabaseType::MySql,
        vec![ok(vec![3], 0), ok(vec![4], 0), ok(vec![0], 0)],
        &[&[0, 1, 2]],
        EngineConfig::with_concurrency(3),
    );

    assert_eq!(executor.execute_batch().await.unwrap(), vec![7]);
}

/// Oracle reports sentinels; broadcast keeps the last unit's status.
#[tokio::test]
async fn test_oracle_broadcast_keeps_sentinel() {
    let executor = executor(
        DatabaseType::Oracle,
        vec![
            ok(vec![SUCCESS_NO_INFO, SUCCESS_NO_INFO], 10),
            ok(vec![SUCCESS_NO_INFO], 0),
        ],
        &[&[0, 1], &[0]],
        EngineConfig::with_concurrency(2),
    );

    assert_eq!(
        executor.execute_batch().await.unwrap(),
        vec![SUCCESS_NO_INFO, SUCCESS_NO_INFO]
    );
}

// =============================================================================
// Failure
// =============================================================================

/// Unit B fails: one execution failure, no result.
#[tokio::test]
async fn test_failing_unit_fails_batch() {
    let executor = executor(
        DatabaseType::MySql,
        vec![ok(vec![1], 30), Shard::Fail { delay_ms: 0 }],
        &[&[0], &[1]],
        EngineConfig::with_concurrency(2),
    );

    let err = executor.execute_batch().await.unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::ShardExecutionFailed);
    assert_eq!(err.data_source(), Some("ds_1"));
    assert!(err.statement_error().is_some());

    let snapshot = executor.metrics().snapshot();
    assert_eq!(snapshot.batches_failed, 1);
    assert_eq!(snapshot.batches_executed, 0);
}

/// A panicking driver surfaces as a fatal worker failure.
#[tokio::test]
async fn test_panicking_unit_fails_batch() {
    let executor = executor(
        DatabaseType::H2,
        vec![ok(vec![1], 0), Shard::Panic],
        &[&[0], &[1]],
        EngineConfig::with_concurrency(2),
    );

    let err = executor.execute_batch().await.unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::ShardWorkerPanicked);
    assert!(err.is_fatal());
}

/// Exceeding the batch deadline fails the whole batch.
#[tokio::test]
async fn test_timeout_fails_batch() {
    let executor = executor(
        DatabaseType::MySql,
        vec![ok(vec![1], 0), ok(vec![1], 400)],
        &[&[0], &[1]],
        EngineConfig::with_concurrency(2).with_timeout_ms(50),
    );

    let err = executor.execute_batch().await.unwrap_err();
    assert_eq!(err.code(), BatchErrorCode::ShardExecutionTimeout);
}

// =============================================================================
// Degradation
// =============================================================================

/// A call routed nowhere yields 0 and is counted, not rejected.
#[tokio::test]
async fn test_unrouted_call_zero_filled() {
    let executor = executor(
        DatabaseType::MySql,
        vec![ok(vec![1, 1], 0)],
        &[&[0], &[], &[0]],
        EngineConfig::with_concurrency(1),
    );

    assert_eq!(executor.execute_batch().await.unwrap(), vec![1, 0, 1]);
    assert_eq!(executor.metrics().snapshot().unregistered_calls, 1);
}

/// A driver returning fewer counts than calls degrades to zero.
#[tokio::test]
async fn test_short_driver_result_zero_filled() {
    let executor = executor(
        DatabaseType::MySql,
        vec![ok(vec![1], 0)],
        &[&[0], &[0]],
        EngineConfig::with_concurrency(1),
    );

    assert_eq!(executor.execute_batch().await.unwrap(), vec![1, 0]);
    assert_eq!(executor.metrics().snapshot().missing_outcomes, 1);
}
