use chrono::Duration;

use crate::models::Order;

/// Predicate deciding whether a candidate order is economically redundant
/// against the in-memory book. Pure: no side effects, no mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateGuard {
    /// When set, an active (instrument, direction) match only counts as a
    /// duplicate if the candidate's open time falls within this window of
    /// the existing order's. When unset, one active position per
    /// (instrument, direction) is allowed, full stop.
    pub window: Option<Duration>,
}

impl DuplicateGuard {
    pub fn new(window: Option<Duration>) -> Self {
        Self { window }
    }

    pub fn is_already_open(&self, existing: &[Order], candidate: &Order) -> bool {
        existing.iter().any(|order| {
            order.is_active()
                && order.instrument == candidate.instrument
                && order.direction == candidate.direction
                && match self.window {
                    Some(window) => (candidate.time - order.time).abs() <= window,
                    None => true,
                }
        })
    }
}
