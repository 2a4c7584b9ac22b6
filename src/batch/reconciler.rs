//! Result reconciliation
//!
//! Merges per-unit outcomes back into one array indexed by logical call.
//!
//! # Correlation
//!
//! `outcomes[p]` belongs to `units[p]`. Nothing inside an outcome
//! identifies its unit, so the engine must return outcomes in submission
//! order. Given that, the result depends only on units, mappings, outcomes
//! and policy, never on the order units completed in.
//!
//! # Degradation
//!
//! - absent outcome for a unit: every value it contributes is 0
//! - local index past the end of a short outcome: contributes 0
//! - logical index with no contributor: stays 0
//!
//! None of these fail; they are listed in the `ReconcileReport`.

use serde::{Deserialize, Serialize};

use crate::types::DatabaseType;

use super::unit::BatchUnit;

/// Rule for combining several units' values for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MergePolicy {
    /// Accumulate affected-row counts across units
    Sum,
    /// Keep the value of the last unit in submission order
    Overwrite,
}

impl MergePolicy {
    /// Selects the policy for a driver.
    ///
    /// Drivers whose batch API returns a status sentinel instead of a
    /// per-call count get `Overwrite`; summing sentinels is meaningless.
    pub fn for_database(database_type: DatabaseType) -> Self {
        if database_type.reports_update_counts() {
            MergePolicy::Sum
        } else {
            MergePolicy::Overwrite
        }
    }

    /// Combines the value accumulated so far with an incoming one
    pub fn merge(&self, existing: i32, incoming: i32) -> i32 {
        match self {
            MergePolicy::Sum => existing.saturating_add(incoming),
            MergePolicy::Overwrite => incoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Sum => "SUM",
            MergePolicy::Overwrite => "OVERWRITE",
        }
    }
}

/// Degradations observed while reconciling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Unit positions that had no outcome
    pub missing_outcomes: Vec<usize>,
    /// `(unit position, local index)` pairs beyond a short outcome
    pub short_outcomes: Vec<(usize, usize)>,
    /// Logical indices no unit contributed to
    pub unregistered: Vec<usize>,
}

impl ReconcileReport {
    /// True when every logical call got a real value from every unit it
    /// was routed to.
    pub fn is_clean(&self) -> bool {
        self.missing_outcomes.is_empty()
            && self.short_outcomes.is_empty()
            && self.unregistered.is_empty()
    }
}

/// Logical-order result plus the report of how it was derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub values: Vec<i32>,
    pub report: ReconcileReport,
}

/// Merges `outcomes` (positionally aligned with `units`) into a result of
/// length `batch_count`.
pub fn reconcile<S>(
    units: &[BatchUnit<S>],
    outcomes: &[Option<Vec<i32>>],
    batch_count: usize,
    policy: MergePolicy,
) -> Vec<i32> {
    reconcile_with_report(units, outcomes, batch_count, policy).values
}

/// As [`reconcile`], also reporting degraded contributions.
pub fn reconcile_with_report<S>(
    units: &[BatchUnit<S>],
    outcomes: &[Option<Vec<i32>>],
    batch_count: usize,
    policy: MergePolicy,
) -> Reconciled {
    let mut values = vec![0i32; batch_count];
    let mut contributed = vec![false; batch_count];
    let mut report = ReconcileReport::default();

    for (position, unit) in units.iter().enumerate() {
        let outcome = outcomes.get(position).and_then(Option::as_deref);
        if outcome.is_none() && unit.local_count() > 0 {
            report.missing_outcomes.push(position);
        }

        for (logical, local) in unit.calls() {
            // Out-of-range logical indices cannot be represented in the result.
            if logical >= batch_count {
                continue;
            }
            let value = match outcome {
                Some(local_values) => match local_values.get(local) {
                    Some(v) => *v,
                    None => {
                        report.short_outcomes.push((position, local));
                        0
                    }
                },
                None => 0,
            };
            values[logical] = policy.merge(values[logical], value);
            contributed[logical] = true;
        }
    }

    report.unregistered = contributed
        .iter()
        .enumerate()
        .filter(|(_, seen)| !**seen)
        .map(|(logical, _)| logical)
        .collect();

    Reconciled { values, report }
}
