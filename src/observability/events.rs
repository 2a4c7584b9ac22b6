//! Observable events of the batch path

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Engine, one per unit
    /// Unit handed to a worker
    UnitExecuteBegin,
    /// Unit returned an outcome
    UnitExecuteSuccess,
    /// Unit raised a failure
    UnitExecuteFailure,
    /// Unit worker panicked (FATAL)
    WorkerPanicked,

    // Reconciliation degradations
    /// Engine reported no outcome for a unit
    OutcomeMissing,
    /// Outcome shorter than the unit's local batch
    OutcomeShort,
    /// Logical calls that no unit contributed to
    CallsUnregistered,

    // Configuration
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::UnitExecuteBegin => "EXECUTE_BEGIN",
            Event::UnitExecuteSuccess => "EXECUTE_SUCCESS",
            Event::UnitExecuteFailure => "EXECUTE_FAILURE",
            Event::WorkerPanicked => "WORKER_PANICKED",
            Event::OutcomeMissing => "BATCH_OUTCOME_MISSING",
            Event::OutcomeShort => "BATCH_OUTCOME_SHORT",
            Event::CallsUnregistered => "BATCH_CALLS_UNREGISTERED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::WorkerPanicked)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_panic_is_fatal() {
        assert!(Event::WorkerPanicked.is_fatal());
        assert!(!Event::UnitExecuteFailure.is_fatal());
        assert!(!Event::OutcomeMissing.is_fatal());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(Event::UnitExecuteBegin.to_string(), "EXECUTE_BEGIN");
        assert_eq!(Event::CallsUnregistered.as_str(), "BATCH_CALLS_UNREGISTERED");
    }
}
