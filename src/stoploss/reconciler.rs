use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::filter::{filter_records, symbols_changed};
use super::observer::{NoopObserver, ReconcileObserver};
use crate::models::StopLossRecord;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    /// Recompute armed; fires once `deadline` passes, using `symbols`
    PendingRecompute {
        deadline: Instant,
        symbols: HashSet<String>,
    },
}

/// Outcome of feeding a new open-symbol set to the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> PendingRecompute
    Armed,
    /// PendingRecompute -> PendingRecompute with a fresh deadline
    Rearmed,
    /// Set matches the last reconciled one; stayed Idle
    Unchanged,
    /// Set reverted to the last reconciled one; pending recompute dropped
    Cancelled,
}

/// Filters adaptive stop-loss records against open positions for one trader
/// session, debouncing recomputes when the open-symbol set changes.
///
/// Only the trailing edge fires: every qualifying change replaces the pending
/// deadline, so a burst of changes inside the debounce window produces a
/// single recompute with the last set. The reconciler is not `Sync`-guarded;
/// confine it to one task (see [`spawn_reconciler`](super::spawn_reconciler))
/// or wrap it in a mutex.
pub struct StopLossReconciler<C = SystemClock, O = NoopObserver> {
    trader_id: String,
    delay: Duration,
    last_symbols: HashSet<String>,
    state: ReconcilerState,
    clock: C,
    observer: O,
}

impl StopLossReconciler {
    pub fn new(trader_id: impl Into<String>) -> Self {
        Self::with_parts(trader_id, DEFAULT_DEBOUNCE, SystemClock, NoopObserver)
    }
}

impl<C: Clock, O: ReconcileObserver> StopLossReconciler<C, O> {
    pub fn with_parts(trader_id: impl Into<String>, delay: Duration, clock: C, observer: O) -> Self {
        Self {
            trader_id: trader_id.into(),
            delay,
            last_symbols: HashSet::new(),
            state: ReconcilerState::Idle,
            clock,
            observer,
        }
    }

    pub fn trader_id(&self) -> &str {
        &self.trader_id
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    /// Symbol set of the last completed reconcile
    pub fn last_symbols(&self) -> &HashSet<String> {
        &self.last_symbols
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ReconcilerState::PendingRecompute { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            ReconcilerState::PendingRecompute { deadline, .. } => Some(*deadline),
            ReconcilerState::Idle => None,
        }
    }

    /// Filter `records` against `open_symbols` and remember the set.
    ///
    /// An empty set returns every record (fail open).
    pub fn reconcile(
        &mut self,
        records: &[StopLossRecord],
        open_symbols: &HashSet<String>,
    ) -> Vec<StopLossRecord> {
        let kept = filter_records(records, open_symbols);
        self.observer
            .on_filtered(records.len(), kept.len(), open_symbols.len());

        self.last_symbols = open_symbols.clone();
        kept
    }

    pub fn should_recompute(&self, new_symbols: &HashSet<String>) -> bool {
        symbols_changed(&self.last_symbols, new_symbols)
    }

    /// Feed the current open-symbol set.
    ///
    /// Any pending deadline is discarded first. If the set differs from the
    /// last reconciled one a new deadline is armed `delay` from now.
    pub fn observe_symbols(&mut self, new_symbols: &HashSet<String>) -> Transition {
        let was_pending = self.is_pending();
        self.state = ReconcilerState::Idle;

        if !self.should_recompute(new_symbols) {
            if was_pending {
                self.observer.on_cancelled();
                return Transition::Cancelled;
            }
            return Transition::Unchanged;
        }

        self.state = ReconcilerState::PendingRecompute {
            deadline: self.clock.now() + self.delay,
            symbols: new_symbols.clone(),
        };
        self.observer.on_armed(new_symbols, self.delay, was_pending);

        if was_pending {
            Transition::Rearmed
        } else {
            Transition::Armed
        }
    }

    /// If the pending deadline has passed, go Idle and return the symbol set
    /// to recompute against.
    pub fn poll(&mut self) -> Option<HashSet<String>> {
        let due = self.deadline().is_some_and(|d| self.clock.now() >= d);
        if !due {
            return None;
        }

        match std::mem::replace(&mut self.state, ReconcilerState::Idle) {
            ReconcilerState::PendingRecompute { symbols, .. } => {
                self.observer.on_recompute(&symbols);
                Some(symbols)
            }
            ReconcilerState::Idle => None,
        }
    }

    /// `poll`, then reconcile `records` against the fired symbol set
    pub fn poll_reconcile(&mut self, records: &[StopLossRecord]) -> Option<Vec<StopLossRecord>> {
        let symbols = self.poll()?;
        Some(self.reconcile(records, &symbols))
    }

    /// Drop any pending recompute without firing it. Returns true if one was armed.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = ReconcilerState::Idle;
        if was_pending {
            self.observer.on_cancelled();
        }
        was_pending
    }
}
