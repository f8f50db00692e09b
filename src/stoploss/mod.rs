// Adaptive stop-loss filtering against open positions
pub mod card;
pub mod clock;
pub mod driver;
pub mod filter;
pub mod observer;
pub mod reconciler;

pub use card::{card_for, StopLossCard, TrailMode};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use driver::{spawn_reconciler, spawn_refresher, ReconcilerHandle};
pub use filter::{filter_records, symbols_changed};
pub use observer::{NoopObserver, ReconcileObserver, TracingObserver};
pub use reconciler::{ReconcilerState, StopLossReconciler, Transition, DEFAULT_DEBOUNCE};
