// src/core/tracker.rs
use crate::types::PositionSnapshot;
use rust_decimal::Decimal;

/// Tracks the last observed position size so the engine can tell a DCA fill
/// (growth) apart from the first sighting of a fresh position.
///
/// Fill detection deliberately keys off position size rather than the order
/// history endpoint, whose filled-order semantics proved unreliable.
#[derive(Debug, Default)]
pub struct PositionTracker {
    last_observed_size: Decimal,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the snapshot is strictly larger than the baseline *and* a
    /// baseline exists. The first non-zero observation never counts as
    /// growth; it only establishes the baseline.
    pub fn has_grown(&self, snapshot: &PositionSnapshot) -> bool {
        self.last_observed_size > Decimal::ZERO && snapshot.size > self.last_observed_size
    }

    /// Updates the baseline unconditionally after every poll. Recording zero
    /// resets it, so a reopened position starts a fresh baseline.
    pub fn record(&mut self, size: Decimal) {
        self.last_observed_size = size;
    }

    pub fn last_observed_size(&self) -> Decimal {
        self.last_observed_size
    }
}
