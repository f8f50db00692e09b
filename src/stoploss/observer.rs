use std::collections::HashSet;
use std::time::Duration;

/// Hooks fired by the reconciler as it moves between states.
///
/// All methods default to no-ops; implement the ones you need.
pub trait ReconcileObserver {
    /// A recompute was scheduled; `rearmed` is true when it replaced one
    fn on_armed(&self, _symbols: &HashSet<String>, _delay: Duration, _rearmed: bool) {}

    /// A pending recompute was dropped without firing
    fn on_cancelled(&self) {}

    /// The debounce deadline passed and a recompute is running
    fn on_recompute(&self, _symbols: &HashSet<String>) {}

    /// Records were filtered against the open symbol set
    fn on_filtered(&self, _total: usize, _kept: usize, _open_symbols: usize) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {}

/// Observer that reports through `tracing`, tagged with the trader id
#[derive(Debug, Clone)]
pub struct TracingObserver {
    trader_id: String,
}

impl TracingObserver {
    pub fn new(trader_id: impl Into<String>) -> Self {
        Self {
            trader_id: trader_id.into(),
        }
    }
}

impl ReconcileObserver for TracingObserver {
    fn on_armed(&self, symbols: &HashSet<String>, delay: Duration, rearmed: bool) {
        tracing::debug!(
            trader_id = %self.trader_id,
            open_symbols = symbols.len(),
            delay_ms = delay.as_millis() as u64,
            rearmed,
            "Open symbols changed, stop-loss recompute scheduled"
        );
    }

    fn on_cancelled(&self) {
        tracing::debug!(trader_id = %self.trader_id, "Pending stop-loss recompute cancelled");
    }

    fn on_recompute(&self, symbols: &HashSet<String>) {
        tracing::info!(
            trader_id = %self.trader_id,
            open_symbols = symbols.len(),
            "Recomputing stop-loss view"
        );
    }

    fn on_filtered(&self, total: usize, kept: usize, open_symbols: usize) {
        if open_symbols == 0 {
            tracing::debug!(
                trader_id = %self.trader_id,
                total,
                "No open positions known, showing all stop-loss records"
            );
        } else {
            tracing::debug!(
                trader_id = %self.trader_id,
                total,
                kept,
                open_symbols,
                "Filtered stop-loss records by open positions"
            );
        }
    }
}

impl<T: ReconcileObserver + ?Sized> ReconcileObserver for std::sync::Arc<T> {
    fn on_armed(&self, symbols: &HashSet<String>, delay: Duration, rearmed: bool) {
        (**self).on_armed(symbols, delay, rearmed)
    }

    fn on_cancelled(&self) {
        (**self).on_cancelled()
    }

    fn on_recompute(&self, symbols: &HashSet<String>) {
        (**self).on_recompute(symbols)
    }

    fn on_filtered(&self, total: usize, kept: usize, open_symbols: usize) {
        (**self).on_filtered(total, kept, open_symbols)
    }
}
