// Core modules
pub mod config;
pub mod error;
pub mod models;
pub mod orders;
pub mod snapshot;
pub mod stoploss;
pub mod synthetic;
pub mod view;

// Re-export commonly used types
pub use config::DeskConfig;
pub use error::DeskError;
pub use models::*;
pub use orders::{classify_orders, group_orders, GroupedOrders, OrderBuckets, OrderGroup};
pub use stoploss::{filter_records, StopLossReconciler};
pub use view::PendingOrdersView;

// Error handling
pub type Result<T> = std::result::Result<T, DeskError>;
