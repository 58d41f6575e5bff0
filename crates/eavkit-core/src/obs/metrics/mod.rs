use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// ephemeral, in-memory counters for query composition and execution
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub families: BTreeMap<String, FamilyCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            families: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Composition
    pub builders_created: u64,
    pub joins_registered: u64,
    pub leaves_built: u64,
    pub build_failures: u64,

    // Translation
    pub applies: u64,
    pub applied_joins: u64,
    pub applied_leaves: u64,

    // In-memory execution
    pub rows_scanned: u64,
    pub rows_matched: u64,

    // Forms
    pub forms_planned: u64,
    pub form_fields: u64,
}

///
/// FamilyCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FamilyCounters {
    pub builders_created: u64,
    pub joins_registered: u64,
    pub leaves_built: u64,
    pub build_failures: u64,
    pub applies: u64,
    pub applied_leaves: u64,
    pub rows_scanned: u64,
    pub rows_matched: u64,
    pub forms_planned: u64,
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Counters since `window_start_ms`.
    pub counters: Option<EventState>,
    /// Per-family counters and averages.
    pub family_counters: Vec<FamilySummary>,
}

///
/// FamilySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FamilySummary {
    pub family: String,
    pub applies: u64,
    pub avg_leaves_per_apply: f64,
    pub rows_scanned: u64,
    pub rows_matched: u64,
    pub match_rate: f64,
    pub build_failures: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(millis).unwrap_or_default()
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Borrow one family's counters mutably, creating them on first use.
pub(crate) fn with_family_mut<R>(
    family: &str,
    f: impl FnOnce(&mut EventOps, &mut FamilyCounters) -> R,
) -> R {
    with_state_mut(|m| {
        let entry = m.families.entry(family.to_string()).or_default();
        f(&mut m.ops, entry)
    })
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[allow(clippy::cast_precision_loss)]
fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Snapshot the counters. A window start later than the current window
/// yields an empty report, since nothing is known about that range alone.
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);

    if window_start_ms.is_some_and(|start| start > snap.window_start_ms) {
        return EventReport::default();
    }

    let family_counters = snap
        .families
        .iter()
        .map(|(family, c)| FamilySummary {
            family: family.clone(),
            applies: c.applies,
            avg_leaves_per_apply: ratio(c.applied_leaves, c.applies),
            rows_scanned: c.rows_scanned,
            rows_matched: c.rows_matched,
            match_rate: ratio(c.rows_matched, c.rows_scanned),
            build_failures: c.build_failures,
        })
        .collect();

    EventReport {
        counters: Some(snap),
        family_counters,
    }
}

///
/// TESTS
///
