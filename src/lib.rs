//! shardbatch - Deterministic reconciliation of sharded batch writes
//!
//! A logical batch split across shards runs concurrently, one unit per
//! physical target; per-unit outcomes are merged back into a result array
//! indexed exactly like the caller's original batch.

pub mod batch;
pub mod cli;
pub mod engine;
pub mod observability;
pub mod types;
