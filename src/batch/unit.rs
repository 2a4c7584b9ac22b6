//! Batch Unit: one physical target participating in a batch
//!
//! A unit pairs a statement handle with the mapping from logical call index
//! to the position that call occupies in the unit's own local batch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::StatementError;
use crate::engine::ExecutionTarget;

/// Statement handle owned by the connection layer.
///
/// Each unit's handle is driven by exactly one worker during execution.
pub trait BatchStatement: Send + Sync {
    /// Execute the locally accumulated batch, returning one status per
    /// local call in local order.
    fn execute_batch(&self) -> Result<Vec<i32>, StatementError>;
}

/// Physical execution target: a data source and the SQL routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionUnit {
    pub data_source: String,
    pub sql: String,
}

impl ExecutionUnit {
    pub fn new(data_source: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            sql: sql.into(),
        }
    }
}

impl fmt::Display for ExecutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.data_source, self.sql)
    }
}

/// Per-target record of which logical calls it received and where.
pub struct BatchUnit<S> {
    execution_unit: ExecutionUnit,
    statement: Arc<S>,
    /// logical call index -> unit-local index
    call_map: BTreeMap<usize, usize>,
}

impl<S> BatchUnit<S> {
    /// Creates a unit with an empty mapping
    pub fn new(execution_unit: ExecutionUnit, statement: Arc<S>) -> Self {
        Self {
            execution_unit,
            statement,
            call_map: BTreeMap::new(),
        }
    }

    /// Registers a logical call on this unit and returns its local index.
    ///
    /// Local indices are assigned densely in registration order. A logical
    /// index already present keeps its original local index.
    pub fn map_call(&mut self, logical_index: usize) -> usize {
        let next = self.call_map.len();
        *self.call_map.entry(logical_index).or_insert(next)
    }

    pub fn execution_unit(&self) -> &ExecutionUnit {
        &self.execution_unit
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    /// Iterates `(logical, local)` pairs in logical order
    pub fn calls(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.call_map.iter().map(|(logical, local)| (*logical, *local))
    }

    /// Returns the local index of a logical call, if routed here
    pub fn local_index(&self, logical_index: usize) -> Option<usize> {
        self.call_map.get(&logical_index).copied()
    }

    /// Number of calls in this unit's local batch
    pub fn local_count(&self) -> usize {
        self.call_map.len()
    }
}

impl<S> ExecutionTarget for BatchUnit<S> {
    fn data_source(&self) -> &str {
        &self.execution_unit.data_source
    }

    fn sql(&self) -> &str {
        &self.execution_unit.sql
    }
}

impl<S> fmt::Debug for BatchUnit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchUnit")
            .field("execution_unit", &self.execution_unit)
            .field("call_map", &self.call_map)
            .finish()
    }
}
