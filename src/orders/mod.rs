// Pending order consolidation and lifecycle classification
pub mod classify;
pub mod display;
pub mod grouper;

pub use classify::{classify_orders, is_active, OrderBuckets, OrderCounts};
pub use display::{ConfidenceTier, Direction, ExpiresIn};
pub use grouper::{group_orders, GroupedOrders, OrderGroup};
