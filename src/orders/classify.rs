use crate::models::{Order, OrderStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle buckets over a flat order list.
///
/// The buckets are not exhaustive: a PENDING order past its expiry is not
/// active and is not cancelled either. Such orders are reported separately
/// in `stale` so nothing silently moves between the other buckets.
#[derive(Debug, Clone, Default)]
pub struct OrderBuckets<'a> {
    pub active: Vec<&'a Order>,
    pub filled: Vec<&'a Order>,
    pub cancelled: Vec<&'a Order>,
    pub stale: Vec<&'a Order>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct OrderCounts {
    pub total: usize,
    pub active: usize,
    pub filled: usize,
    pub cancelled: usize,
    pub stale: usize,
}

impl OrderBuckets<'_> {
    pub fn counts(&self) -> OrderCounts {
        OrderCounts {
            total: self.total,
            active: self.active.len(),
            filled: self.filled.len(),
            cancelled: self.cancelled.len(),
            stale: self.stale.len(),
        }
    }
}

/// Active means TRIGGERED, or PENDING with an expiry strictly after `now`
pub fn is_active(order: &Order, now: DateTime<Utc>) -> bool {
    match order.status {
        OrderStatus::Triggered => true,
        OrderStatus::Pending => order.expires_at.is_some_and(|expires| expires > now),
        _ => false,
    }
}

/// Partition orders into lifecycle buckets as of `now`
pub fn classify_orders(orders: &[Order], now: DateTime<Utc>) -> OrderBuckets<'_> {
    let mut buckets = OrderBuckets {
        total: orders.len(),
        ..Default::default()
    };

    for order in orders {
        match order.status {
            OrderStatus::Filled => buckets.filled.push(order),
            OrderStatus::Cancelled | OrderStatus::Expired => buckets.cancelled.push(order),
            OrderStatus::Triggered => buckets.active.push(order),
            OrderStatus::Pending if is_active(order, now) => buckets.active.push(order),
            OrderStatus::Pending => buckets.stale.push(order),
            OrderStatus::Unknown => {
                tracing::debug!(id = %order.id, symbol = %order.symbol, "Order with unknown status left unclassified");
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn order(id: &str, status: OrderStatus, expires_in_minutes: Option<i64>) -> Order {
        Order {
            id: id.to_string(),
            trader_id: String::new(),
            symbol: "BTC".to_string(),
            status,
            confidence: 0.5,
            created_at: Some(now() - Duration::hours(1)),
            expires_at: expires_in_minutes.map(|m| now() + Duration::minutes(m)),
            target_price: 0.0,
            trigger_price: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            position_size: 0.0,
            leverage: 1.0,
        }
    }

    #[test]
    fn test_classification_buckets() {
        let orders = vec![
            order("live", OrderStatus::Pending, Some(30)),
            order("stale", OrderStatus::Pending, Some(-30)),
            order("triggered", OrderStatus::Triggered, Some(-30)),
            order("filled", OrderStatus::Filled, Some(30)),
            order("cancelled", OrderStatus::Cancelled, None),
            order("expired", OrderStatus::Expired, Some(-5)),
            order("mystery", OrderStatus::Unknown, Some(30)),
        ];

        let buckets = classify_orders(&orders, now());
        let ids = |v: &Vec<&Order>| v.iter().map(|o| o.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(&buckets.active), ["live", "triggered"]);
        assert_eq!(ids(&buckets.filled), ["filled"]);
        assert_eq!(ids(&buckets.cancelled), ["cancelled", "expired"]);
        assert_eq!(ids(&buckets.stale), ["stale"]);
        assert_eq!(
            buckets.counts(),
            OrderCounts {
                total: 7,
                active: 2,
                filled: 1,
                cancelled: 2,
                stale: 1,
            }
        );
    }

    #[test]
    fn test_expiry_boundary_is_not_active() {
        let orders = vec![order("edge", OrderStatus::Pending, Some(0))];
        let buckets = classify_orders(&orders, now());
        assert!(buckets.active.is_empty());
        assert_eq!(buckets.stale.len(), 1);
        assert!(buckets.cancelled.is_empty());
    }

    #[test]
    fn test_pending_without_expiry_is_stale() {
        let orders = vec![order("undated", OrderStatus::Pending, None)];
        let buckets = classify_orders(&orders, now());
        assert!(buckets.active.is_empty());
        assert_eq!(buckets.stale.len(), 1);
    }

    #[test]
    fn test_filled_never_active_or_cancelled() {
        let orders = vec![order("f", OrderStatus::Filled, Some(60))];
        let buckets = classify_orders(&orders, now());
        assert!(!is_active(&orders[0], now()));
        assert!(buckets.active.is_empty());
        assert!(buckets.cancelled.is_empty());
        assert_eq!(buckets.filled.len(), 1);
    }
}
