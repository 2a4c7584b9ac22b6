//! Routing-facing registration of logical calls into Batch Units
//!
//! The builder is the only place units are mutated. `build()` freezes the
//! collection; from then on units are shared read-only between the
//! dispatcher and the reconciler in one fixed submission order.

use std::sync::Arc;

use super::errors::StatementError;
use super::unit::{BatchUnit, ExecutionUnit};

/// Accumulates logical calls while the client issues them.
pub struct BatchUnitsBuilder<S> {
    units: Vec<BatchUnit<S>>,
    batch_count: usize,
}

impl<S> BatchUnitsBuilder<S> {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            batch_count: 0,
        }
    }

    /// Registers the next logical call against its routed targets.
    ///
    /// Targets equal to an already known execution unit collapse into that
    /// unit's local batch; new targets get a statement from `open`, which
    /// is supplied by the connection layer. Returns the logical index.
    ///
    /// A call with no targets still consumes a logical index.
    pub fn add_batch<F>(
        &mut self,
        targets: &[ExecutionUnit],
        mut open: F,
    ) -> Result<usize, StatementError>
    where
        F: FnMut(&ExecutionUnit) -> Result<Arc<S>, StatementError>,
    {
        let logical_index = self.batch_count;

        // Open every missing statement before touching any mapping so a
        // failed open leaves the builder unchanged.
        let mut positions = Vec::with_capacity(targets.len());
        let mut opened = Vec::new();
        for target in targets {
            match self.position_of(target) {
                Some(pos) => positions.push(pos),
                None => {
                    if let Some(offset) = opened.iter().position(|u: &BatchUnit<S>| u.execution_unit() == target) {
                        positions.push(self.units.len() + offset);
                    } else {
                        let statement = open(target)?;
                        positions.push(self.units.len() + opened.len());
                        opened.push(BatchUnit::new(target.clone(), statement));
                    }
                }
            }
        }

        self.units.extend(opened);
        for pos in positions {
            self.units[pos].map_call(logical_index);
        }
        self.batch_count += 1;
        Ok(logical_index)
    }

    /// Appends a pre-populated unit.
    ///
    /// Logical indices it references extend `batch_count` as needed.
    pub fn push_unit(&mut self, unit: BatchUnit<S>) {
        if let Some(max) = unit.calls().map(|(logical, _)| logical).max() {
            self.batch_count = self.batch_count.max(max + 1);
        }
        self.units.push(unit);
    }

    /// Raises the logical call count to at least `batch_count`.
    ///
    /// Logical indices no unit maps are zero-filled at reconciliation.
    pub fn with_batch_count(mut self, batch_count: usize) -> Self {
        self.batch_count = self.batch_count.max(batch_count);
        self
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Freezes the units in submission order
    pub fn build(self) -> BatchUnits<S> {
        BatchUnits {
            units: self.units.into(),
            batch_count: self.batch_count,
        }
    }

    fn position_of(&self, target: &ExecutionUnit) -> Option<usize> {
        self.units
            .iter()
            .position(|unit| unit.execution_unit() == target)
    }
}

impl<S> Default for BatchUnitsBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, submission-ordered Batch Units plus the logical call count.
pub struct BatchUnits<S> {
    units: Arc<[BatchUnit<S>]>,
    batch_count: usize,
}

impl<S> BatchUnits<S> {
    pub fn units(&self) -> &[BatchUnit<S>] {
        &self.units
    }

    /// Shared handle for handing to the execution engine
    pub fn shared(&self) -> Arc<[BatchUnit<S>]> {
        Arc::clone(&self.units)
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<S> Clone for BatchUnits<S> {
    fn clone(&self) -> Self {
        Self {
            units: Arc::clone(&self.units),
            batch_count: self.batch_count,
        }
    }
}
