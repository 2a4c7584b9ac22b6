//! Batch dispatcher
//!
//! The driver-facing `execute_batch`: hand every unit to the engine once,
//! then reconcile the ordered outcomes into logical call order.

use std::sync::Arc;

use crate::engine::{ExecuteCallback, ExecutionEngine, ExecutorEngine};
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope};
use crate::types::{DatabaseType, SqlType};

use super::errors::{BatchResult, StatementError};
use super::reconciler::{reconcile_with_report, MergePolicy, ReconcileReport, Reconciled};
use super::unit::{BatchStatement, BatchUnit};
use super::units::BatchUnits;

/// Per-unit strategy: run the unit's native batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchCallback {
    sql_type: SqlType,
}

impl BatchCallback {
    pub fn new(sql_type: SqlType) -> Self {
        Self { sql_type }
    }
}

impl<S: BatchStatement> ExecuteCallback<BatchUnit<S>> for BatchCallback {
    type Output = Vec<i32>;

    fn execute(&self, unit: &BatchUnit<S>) -> Result<Vec<i32>, StatementError> {
        unit.statement().execute_batch()
    }

    fn sql_type(&self) -> SqlType {
        self.sql_type
    }
}

/// Executes one frozen set of Batch Units and reconciles the results.
pub struct BatchExecutor<S, E = ExecutorEngine> {
    engine: Arc<E>,
    database_type: DatabaseType,
    sql_type: SqlType,
    units: BatchUnits<S>,
    metrics: Arc<MetricsRegistry>,
}

impl<S, E> BatchExecutor<S, E>
where
    S: BatchStatement + 'static,
    E: ExecutionEngine,
{
    pub fn new(
        engine: Arc<E>,
        database_type: DatabaseType,
        sql_type: SqlType,
        units: BatchUnits<S>,
    ) -> Self {
        Self {
            engine,
            database_type,
            sql_type,
            units,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Policy used for every reconciliation of this executor
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy::for_database(self.database_type)
    }

    pub fn batch_count(&self) -> usize {
        self.units.batch_count()
    }

    pub fn units(&self) -> &BatchUnits<S> {
        &self.units
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Executes every unit's batch and returns one value per logical call.
    ///
    /// Any unit failure fails the whole call; no partial result is
    /// produced. Missing outcomes and unrouted calls degrade to zero and
    /// are logged.
    pub async fn execute_batch(&self) -> BatchResult<Vec<i32>> {
        let batch_count = self.units.batch_count().to_string();
        let unit_count = self.units.len().to_string();
        let scope = ObservationScope::with_fields(
            "BATCH_EXECUTE",
            &[
                ("batch_count", batch_count.as_str()),
                ("database_type", self.database_type.as_str()),
                ("sql_type", self.sql_type.as_str()),
                ("units", unit_count.as_str()),
            ],
        );

        let callback = Arc::new(BatchCallback::new(self.sql_type));
        let outcomes = match self.engine.execute(self.units.shared(), callback).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                self.metrics.increment_batches_failed();
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        let policy = self.merge_policy();
        let Reconciled { values, report } = reconcile_with_report(
            self.units.units(),
            &outcomes,
            self.units.batch_count(),
            policy,
        );
        self.record_degradations(&report);

        self.metrics.increment_batches_executed();
        scope.complete_with_fields(&[("policy", policy.as_str())]);
        Ok(values)
    }

    fn record_degradations(&self, report: &ReconcileReport) {
        for position in &report.missing_outcomes {
            let unit = &self.units.units()[*position];
            let position = position.to_string();
            Logger::warn(
                Event::OutcomeMissing.as_str(),
                &[
                    ("data_source", unit.execution_unit().data_source.as_str()),
                    ("unit", position.as_str()),
                ],
            );
        }

        for (position, local) in &report.short_outcomes {
            let unit = &self.units.units()[*position];
            let position = position.to_string();
            let local = local.to_string();
            Logger::warn(
                Event::OutcomeShort.as_str(),
                &[
                    ("data_source", unit.execution_unit().data_source.as_str()),
                    ("local_index", local.as_str()),
                    ("unit", position.as_str()),
                ],
            );
        }

        if !report.unregistered.is_empty() {
            let indexes = report
                .unregistered
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let count = report.unregistered.len().to_string();
            Logger::warn(
                Event::CallsUnregistered.as_str(),
                &[("count", count.as_str()), ("logical_indexes", indexes.as_str())],
            );
        }

        let missing = report.missing_outcomes.len() + report.short_outcomes.len();
        self.metrics.add_missing_outcomes(missing as u64);
        self.metrics
            .add_unregistered_calls(report.unregistered.len() as u64);
    }
}
