//! Metrics sink boundary.
//!
//! Builders and engines MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{db::query::CompareOp, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    BuilderCreated {
        family: &'a str,
    },
    JoinRegistered {
        family: &'a str,
        alias: &'a str,
    },
    LeafBuilt {
        family: &'a str,
        op: CompareOp,
    },
    BuildFailed {
        family: &'a str,
        kind: &'static str,
    },
    Applied {
        family: &'a str,
        joins: u64,
        leaves: u64,
    },
    RowsScanned {
        family: &'a str,
        scanned: u64,
        matched: u64,
    },
    FormPlanned {
        family: &'a str,
        fields: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink: thread-local counters plus a tracing event.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::BuilderCreated { family } => {
                metrics::with_family_mut(family, |ops, f| {
                    ops.builders_created = ops.builders_created.saturating_add(1);
                    f.builders_created = f.builders_created.saturating_add(1);
                });
            }

            MetricsEvent::JoinRegistered { family, alias } => {
                tracing::trace!(family, alias, "join registered");
                metrics::with_family_mut(family, |ops, f| {
                    ops.joins_registered = ops.joins_registered.saturating_add(1);
                    f.joins_registered = f.joins_registered.saturating_add(1);
                });
            }

            MetricsEvent::LeafBuilt { family, op } => {
                tracing::trace!(family, %op, "leaf built");
                metrics::with_family_mut(family, |ops, f| {
                    ops.leaves_built = ops.leaves_built.saturating_add(1);
                    f.leaves_built = f.leaves_built.saturating_add(1);
                });
            }

            MetricsEvent::BuildFailed { family, kind } => {
                tracing::warn!(family, kind, "query composition failed");
                metrics::with_family_mut(family, |ops, f| {
                    ops.build_failures = ops.build_failures.saturating_add(1);
                    f.build_failures = f.build_failures.saturating_add(1);
                });
            }

            MetricsEvent::Applied {
                family,
                joins,
                leaves,
            } => {
                tracing::debug!(family, joins, leaves, "query applied");
                metrics::with_family_mut(family, |ops, f| {
                    ops.applies = ops.applies.saturating_add(1);
                    ops.applied_joins = ops.applied_joins.saturating_add(joins);
                    ops.applied_leaves = ops.applied_leaves.saturating_add(leaves);
                    f.applies = f.applies.saturating_add(1);
                    f.applied_leaves = f.applied_leaves.saturating_add(leaves);
                });
            }

            MetricsEvent::RowsScanned {
                family,
                scanned,
                matched,
            } => {
                tracing::debug!(family, scanned, matched, "rows scanned");
                metrics::with_family_mut(family, |ops, f| {
                    ops.rows_scanned = ops.rows_scanned.saturating_add(scanned);
                    ops.rows_matched = ops.rows_matched.saturating_add(matched);
                    f.rows_scanned = f.rows_scanned.saturating_add(scanned);
                    f.rows_matched = f.rows_matched.saturating_add(matched);
                });
            }

            MetricsEvent::FormPlanned { family, fields } => {
                tracing::debug!(family, fields, "form planned");
                metrics::with_family_mut(family, |ops, f| {
                    ops.forms_planned = ops.forms_planned.saturating_add(1);
                    ops.form_fields = ops.form_fields.saturating_add(fields);
                    f.forms_planned = f.forms_planned.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the borrow used to
        //   install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current counters.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    const EVENT: MetricsEvent<'static> = MetricsEvent::BuilderCreated { family: "product" };

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        with_metrics_sink(&outer, || {
            record(EVENT);
            with_metrics_sink(&inner, || record(EVENT));
            record(EVENT);
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(EVENT);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn global_sink_accumulates_per_family() {
        metrics_reset_all();

        record(MetricsEvent::Applied {
            family: "product",
            joins: 2,
            leaves: 3,
        });
        record(MetricsEvent::RowsScanned {
            family: "product",
            scanned: 4,
            matched: 1,
        });
        record(MetricsEvent::BuildFailed {
            family: "book",
            kind: "type_mismatch",
        });

        let counters = metrics_report(None).counters.unwrap();
        assert_eq!(counters.ops.applied_joins, 2);
        assert_eq!(counters.ops.applied_leaves, 3);
        assert_eq!(counters.ops.build_failures, 1);
        assert_eq!(counters.families["product"].rows_matched, 1);
        assert_eq!(counters.families["book"].build_failures, 1);
    }

    #[test]
    fn report_after_window_start_is_empty() {
        metrics_reset_all();
        record(EVENT);

        let start = metrics::with_state(|m| m.window_start_ms);
        assert!(metrics_report(Some(start)).counters.is_some());
        assert!(metrics_report(Some(start + 1)).counters.is_none());
    }
}
