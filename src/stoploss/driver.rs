use std::collections::HashSet;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant as TokioInstant, MissedTickBehavior};

use super::clock::TokioClock;
use super::observer::ReconcileObserver;
use super::reconciler::StopLossReconciler;
use crate::models::StopLossRecord;

/// Handle to a running reconciler task.
///
/// Dropping the handle aborts the task, so a pending recompute never fires
/// after the owning session is gone.
pub struct ReconcilerHandle {
    output: watch::Receiver<Vec<StopLossRecord>>,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    /// Filtered stop-loss records, updated after every reconcile
    pub fn output(&self) -> watch::Receiver<Vec<StopLossRecord>> {
        self.output.clone()
    }

    /// Latest filtered records
    pub fn current(&self) -> Vec<StopLossRecord> {
        self.output.borrow().clone()
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Run a reconciler on its own task.
///
/// - open-symbol changes go through the debounce state machine;
/// - a passed deadline reconciles the latest records against the fired set;
/// - a records refresh reconciles immediately against the last reconciled
///   symbols, so a set still inside its debounce window is never published.
///
/// The initial values of both channels are reconciled before returning. The
/// task ends when either input sender is dropped.
pub fn spawn_reconciler<O>(
    mut reconciler: StopLossReconciler<TokioClock, O>,
    mut symbols: watch::Receiver<HashSet<String>>,
    mut records: watch::Receiver<Vec<StopLossRecord>>,
) -> ReconcilerHandle
where
    O: ReconcileObserver + Send + 'static,
{
    let initial = {
        let current_symbols = symbols.borrow_and_update().clone();
        let current_records = records.borrow_and_update().clone();
        reconciler.reconcile(&current_records, &current_symbols)
    };
    let (tx, output) = watch::channel(initial);

    let task = tokio::spawn(async move {
        loop {
            let deadline = reconciler.deadline();

            tokio::select! {
                changed = symbols.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = symbols.borrow_and_update().clone();
                    reconciler.observe_symbols(&current);
                }
                changed = records.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = records.borrow_and_update().clone();
                    let settled = reconciler.last_symbols().clone();
                    let kept = reconciler.reconcile(&latest, &settled);
                    if tx.send(kept).is_err() {
                        break;
                    }
                }
                _ = wait_until(deadline) => {
                    let latest = records.borrow().clone();
                    if let Some(kept) = reconciler.poll_reconcile(&latest) {
                        if tx.send(kept).is_err() {
                            break;
                        }
                    }
                }
            }
        }

        reconciler.cancel();
        tracing::debug!(trader_id = %reconciler.trader_id(), "Stop-loss reconciler stopped");
    });

    ReconcilerHandle {
        output,
        task: Some(task),
    }
}

/// Re-fetch stop-loss records every `period` and publish them to `records`.
///
/// The first fetch happens one full period after spawning; the caller has
/// already published the initial snapshot. Stops once every receiver is gone.
pub fn spawn_refresher<F>(
    period: Duration,
    records: watch::Sender<Vec<StopLossRecord>>,
    mut fetch: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Vec<StopLossRecord> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(TokioInstant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let latest = fetch();
            tracing::debug!(records = latest.len(), "Refreshed stop-loss records");
            if records.send(latest).is_err() {
                break;
            }
        }
    })
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
