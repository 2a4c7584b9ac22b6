//! Shared vocabulary for batch execution
//!
//! - `DatabaseType`: driver identity, selects the merge policy
//! - `SqlType`: statement category passed through to the engine
//! - Driver status sentinels reported by `executeBatch`-style APIs

mod database;
mod sql;

pub use database::DatabaseType;
pub use sql::SqlType;

/// Statement succeeded but the driver reports no affected-row count.
pub const SUCCESS_NO_INFO: i32 = -2;

/// Statement failed but the driver continued with the rest of the batch.
pub const EXECUTE_FAILED: i32 = -3;
