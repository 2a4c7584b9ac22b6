//! Sharded batch execution and reconciliation
//!
//! A client's logical batch is split across physical targets by the routing
//! layer. Each target gets one `BatchUnit` recording which logical calls it
//! received and at what local position.
//!
//! # Flow
//!
//! 1. Routing registers logical calls (`BatchUnitsBuilder::add_batch`)
//! 2. Units are frozen in submission order (`build`)
//! 3. `BatchExecutor::execute_batch` runs all units through the engine
//! 4. Outcomes, aligned with units by position, are reconciled into
//!    logical call order under the database's `MergePolicy`
//!
//! # Guarantees
//!
//! - Result length always equals the logical call count
//! - Result is independent of unit completion order
//! - Either a full result or a single error, never a partial result

mod dispatcher;
mod errors;
mod reconciler;
mod unit;
mod units;

pub use dispatcher::{BatchCallback, BatchExecutor};
pub use errors::{BatchError, BatchErrorCode, BatchResult, Severity, StatementError};
pub use reconciler::{reconcile, reconcile_with_report, MergePolicy, ReconcileReport, Reconciled};
pub use unit::{BatchStatement, BatchUnit, ExecutionUnit};
pub use units::{BatchUnits, BatchUnitsBuilder};
