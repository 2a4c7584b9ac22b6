//! Tokio-backed execution engine
//!
//! Each unit runs on the blocking pool (statement execution is blocking
//! I/O); a semaphore bounds how many run at once. Join handles are kept in
//! submission order and joined positionally, so completion order never
//! leaks into the result.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::batch::{BatchError, BatchResult};
use crate::observability::{Event, Logger, MetricsRegistry};

use super::config::EngineConfig;
use super::{EngineFuture, ExecuteCallback, ExecutionEngine, ExecutionTarget};

/// Default [`ExecutionEngine`] implementation.
pub struct ExecutorEngine {
    config: EngineConfig,
    permits: Arc<Semaphore>,
    metrics: Arc<MetricsRegistry>,
}

impl ExecutorEngine {
    /// Creates an engine after validating its configuration
    pub fn new(config: EngineConfig) -> BatchResult<Self> {
        config.validate()?;
        Ok(Self {
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    /// Shares a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }
}

impl ExecutionEngine for ExecutorEngine {
    fn execute<U, C>(&self, units: Arc<[U]>, callback: Arc<C>) -> EngineFuture<'_, C::Output>
    where
        U: ExecutionTarget + Send + Sync + 'static,
        C: ExecuteCallback<U> + 'static,
    {
        let timeout_ms = self.config.timeout_ms;
        let permits = Arc::clone(&self.permits);
        let metrics = Arc::clone(&self.metrics);

        Box::pin(async move {
            let execution_id = Uuid::new_v4().to_string();

            let mut handles = Vec::with_capacity(units.len());
            for position in 0..units.len() {
                let units = Arc::clone(&units);
                let callback = Arc::clone(&callback);
                let permits = Arc::clone(&permits);
                let metrics = Arc::clone(&metrics);
                let execution_id = execution_id.clone();

                handles.push(tokio::spawn(async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return Err(BatchError::execution_failed("Execution engine closed")),
                    };
                    let worker = tokio::task::spawn_blocking(move || {
                        run_unit(&units[position], callback.as_ref(), &execution_id, &metrics)
                    });
                    match worker.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(join_failure(e, &format!("unit {}", position))),
                    }
                }));
            }

            let outcomes = {
                let joined = try_join_all(handles.iter_mut().enumerate().map(
                    |(position, handle)| async move {
                        match handle.await {
                            Ok(outcome) => outcome.map(Some),
                            Err(e) => Err(join_failure(e, &format!("unit {}", position))),
                        }
                    },
                ));

                match timeout_ms {
                    Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), joined).await {
                        Ok(result) => result,
                        Err(_) => Err(BatchError::timeout(ms)),
                    },
                    None => joined.await,
                }
            };

            // Units still queued behind the semaphore never start. Units
            // already on the blocking pool run to completion and are ignored.
            if outcomes.is_err() {
                for handle in &handles {
                    handle.abort();
                }
            }
            outcomes
        })
    }
}

fn run_unit<U, C>(
    unit: &U,
    callback: &C,
    execution_id: &str,
    metrics: &MetricsRegistry,
) -> BatchResult<C::Output>
where
    U: ExecutionTarget,
    C: ExecuteCallback<U> + ?Sized,
{
    let sql_type = callback.sql_type();
    let fields = [
        ("data_source", unit.data_source()),
        ("execution_id", execution_id),
        ("sql", unit.sql()),
        ("sql_type", sql_type.as_str()),
    ];

    Logger::trace(Event::UnitExecuteBegin.as_str(), &fields);
    metrics.increment_units_dispatched();

    match callback.execute(unit) {
        Ok(output) => {
            Logger::trace(Event::UnitExecuteSuccess.as_str(), &fields);
            metrics.increment_units_succeeded();
            Ok(output)
        }
        Err(e) => {
            let reason = e.to_string();
            let mut failure_fields = fields.to_vec();
            failure_fields.push(("reason", reason.as_str()));
            Logger::warn(Event::UnitExecuteFailure.as_str(), &failure_fields);
            metrics.increment_units_failed();
            Err(BatchError::statement_failed(unit.data_source(), e))
        }
    }
}

fn join_failure(e: JoinError, what: &str) -> BatchError {
    if e.is_panic() {
        Logger::fatal(Event::WorkerPanicked.as_str(), &[("unit", what)]);
        BatchError::worker_panicked(format!("Worker for {} panicked", what))
    } else {
        BatchError::execution_failed(format!("Worker for {} was cancelled", what))
    }
}
