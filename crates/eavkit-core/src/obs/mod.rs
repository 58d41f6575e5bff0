//! Observability: query-composition counters and the sink they flow through.
//!
//! Builders and engines never touch `metrics` directly; they emit a
//! [`MetricsEvent`] and the active [`MetricsSink`] decides what to do with it.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, FamilyCounters, FamilySummary};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
