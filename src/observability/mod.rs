//! Observability for batch execution
//!
//! - Structured JSON-lines logging
//! - Typed events
//! - Monotonic counters
//! - Begin/complete scopes
//!
//! Observability is read-only: nothing here changes a batch result, and a
//! failed log write is dropped.
//!
//! # Usage
//!
//! ```ignore
//! use shardbatch::observability::{Logger, Event, MetricsRegistry};
//!
//! Logger::warn(Event::OutcomeMissing.as_str(), &[("unit", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_batches_executed();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;
