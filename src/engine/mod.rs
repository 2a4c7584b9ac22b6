//! Parallel execution engine
//!
//! Runs one callback per unit concurrently and hands back outcomes in
//! submission order.
//!
//! # Ordering contract
//!
//! `outcomes[i]` always belongs to `units[i]`, whatever order the units
//! finished in. Reconciliation correlates positionally and has no other
//! way to attribute an outcome to its unit.
//!
//! # Failure
//!
//! The first unit failure, a worker panic, or the batch timeout fails the
//! whole call. No partial outcomes are returned.

mod config;
mod executor;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::batch::{BatchResult, StatementError};
use crate::types::SqlType;

pub use config::EngineConfig;
pub use executor::ExecutorEngine;

/// What the engine needs to know about a unit for event reporting.
pub trait ExecutionTarget {
    fn data_source(&self) -> &str;
    fn sql(&self) -> &str;
}

/// Per-unit strategy handed to the engine once per batch.
pub trait ExecuteCallback<U>: Send + Sync {
    type Output: Send + 'static;

    /// Run the unit's native operation
    fn execute(&self, unit: &U) -> Result<Self::Output, StatementError>;

    /// Statement category, passed through for observability
    fn sql_type(&self) -> SqlType;
}

/// Future returned by [`ExecutionEngine::execute`]
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = BatchResult<Vec<Option<T>>>> + Send + 'a>>;

/// Concurrent per-unit dispatch with submission-ordered results.
///
/// An engine may report `None` (or nothing at all) for a unit it has no
/// outcome for; callers treat that as all-zero contributions.
pub trait ExecutionEngine: Send + Sync {
    fn execute<U, C>(&self, units: Arc<[U]>, callback: Arc<C>) -> EngineFuture<'_, C::Output>
    where
        U: ExecutionTarget + Send + Sync + 'static,
        C: ExecuteCallback<U> + 'static;
}
