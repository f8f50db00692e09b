use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use crate::models::{Order, StopLossRecord};
use crate::orders::{
    classify_orders, group_orders, ConfidenceTier, Direction, ExpiresIn, OrderCounts,
};
use crate::stoploss::{card_for, StopLossCard};

/// One row per symbol: the best order plus how many it stands for
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupRow {
    pub symbol: String,
    pub count: usize,
    pub best: Order,
    pub tier: ConfidenceTier,
    pub direction: Direction,
    pub expires_in: ExpiresIn,
    /// Other orders of the group, shown when the row is expanded
    pub others: Vec<Order>,
    /// Adaptive stop-loss for this symbol, if one is visible
    pub stop_loss: Option<StopLossCard>,
}

/// Everything the pending-orders screen renders
#[derive(Debug, Clone, Serialize)]
pub struct PendingOrdersView {
    pub rows: Vec<GroupRow>,
    pub counts: OrderCounts,
    pub symbol_count: usize,
    pub duplicate_symbols: usize,
    pub stop_loss: Vec<StopLossCard>,
}

impl PendingOrdersView {
    /// Build the view from already-reconciled stop-loss records
    pub fn build(orders: &[Order], stop_loss: &[StopLossRecord], now: DateTime<Utc>) -> Self {
        let grouped = group_orders(orders);
        let counts = classify_orders(orders, now).counts();

        let rows = grouped
            .iter()
            .map(|group| GroupRow {
                symbol: group.symbol.clone(),
                count: group.count,
                best: group.best.clone(),
                tier: ConfidenceTier::of(group.best.confidence),
                direction: Direction::of(group.best.stop_loss, group.best.take_profit),
                expires_in: ExpiresIn::until(group.best.expires_at, now),
                others: group.others().cloned().collect(),
                stop_loss: card_for(stop_loss, &group.symbol),
            })
            .collect();

        Self {
            rows,
            counts,
            symbol_count: grouped.len(),
            duplicate_symbols: grouped.duplicate_groups().count(),
            stop_loss: stop_loss.iter().map(StopLossCard::from_record).collect(),
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.duplicate_symbols > 0
    }

    /// Plain-text rendering for terminals
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Orders: {} total | {} active | {} filled | {} cancelled | {} stale",
            self.counts.total,
            self.counts.active,
            self.counts.filled,
            self.counts.cancelled,
            self.counts.stale
        );
        let _ = writeln!(
            out,
            "Symbols: {} ({} with duplicates)",
            self.symbol_count, self.duplicate_symbols
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12} {:>5} {:<6} {:>6} {:<7} {:>12} {:>12} {:>10} {:>5} {:>10}",
            "SYMBOL", "COUNT", "SIDE", "CONF", "TIER", "TRIGGER", "STOP", "SIZE", "LEV", "EXPIRES"
        );

        for row in &self.rows {
            let best = &row.best;
            let _ = writeln!(
                out,
                "{:<12} {:>5} {:<6} {:>5.0}% {:<7} {:>12.4} {:>12.4} {:>10.2} {:>4}x {:>10}",
                row.symbol,
                row.count,
                row.direction.to_string(),
                best.confidence * 100.0,
                format!("{:?}", row.tier),
                best.trigger_price,
                best.stop_loss,
                best.position_size,
                best.leverage,
                row.expires_in.to_string()
            );
            if let Some(card) = &row.stop_loss {
                let _ = writeln!(
                    out,
                    "  stop-loss {:.4} ({:.0}% of window, {:?})",
                    card.current_stop_loss, card.progress_pct, card.trail
                );
            }
            for other in &row.others {
                let _ = writeln!(
                    out,
                    "  - {:<8} {:>5.0}% trigger {:.4}",
                    other.id,
                    other.confidence * 100.0,
                    other.trigger_price
                );
            }
        }

        if !self.stop_loss.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Adaptive stop-loss ({} active)", self.stop_loss.len());
            for card in &self.stop_loss {
                let _ = writeln!(
                    out,
                    "{:<12} stop {:>12.4} entry {:>12.4} price {:>12.4} tp {:>12.4} progress {:>5.1}% {:>6.1}m {:?}",
                    card.symbol,
                    card.current_stop_loss,
                    card.entry_price,
                    card.current_price,
                    card.take_profit,
                    card.progress_pct,
                    card.elapsed_minutes,
                    card.trail
                );
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn order(id: &str, symbol: &str, status: OrderStatus, confidence: f64) -> Order {
        Order {
            id: id.to_string(),
            trader_id: "t".to_string(),
            symbol: symbol.to_string(),
            status,
            confidence,
            created_at: Some(now() - Duration::minutes(30)),
            expires_at: Some(now() + Duration::minutes(90)),
            target_price: 10.0,
            trigger_price: 10.1,
            stop_loss: 9.5,
            take_profit: 11.0,
            position_size: 100.0,
            leverage: 2.0,
        }
    }

    #[test]
    fn test_build_view() {
        let orders = vec![
            order("1", "BTC", OrderStatus::Pending, 0.6),
            order("2", "BTC", OrderStatus::Pending, 0.85),
            order("3", "ETH", OrderStatus::Filled, 0.5),
        ];
        let records = vec![StopLossRecord::for_symbol("BTC")];

        let view = PendingOrdersView::build(&orders, &records, now());

        assert_eq!(view.symbol_count, 2);
        assert_eq!(view.duplicate_symbols, 1);
        assert!(view.has_duplicates());
        assert_eq!(view.counts.active, 2);
        assert_eq!(view.counts.filled, 1);

        let btc = &view.rows[0];
        assert_eq!(btc.best.id, "2");
        assert_eq!(btc.tier, ConfidenceTier::High);
        assert_eq!(btc.direction, Direction::Long);
        assert_eq!(btc.expires_in, ExpiresIn::Remaining { hours: 1, minutes: 30 });
        assert_eq!(btc.others.len(), 1);
        assert_eq!(btc.others[0].id, "1");

        assert_eq!(view.stop_loss.len(), 1);
    }

    #[test]
    fn test_rows_carry_their_own_stop_loss() {
        let orders = vec![
            order("1", "BTC", OrderStatus::Pending, 0.6),
            order("2", "ETH", OrderStatus::Pending, 0.7),
        ];
        let records = vec![
            StopLossRecord {
                time_progression: 0.4,
                ..StopLossRecord::for_symbol("ETH")
            },
            StopLossRecord::for_symbol("SOL"),
        ];

        let view = PendingOrdersView::build(&orders, &records, now());

        assert!(view.rows[0].stop_loss.is_none());
        let eth = view.rows[1].stop_loss.as_ref().unwrap();
        assert_eq!(eth.symbol, "ETH");
        assert_eq!(eth.progress_pct, 40.0);
        assert_eq!(view.stop_loss.len(), 2);
        assert!(view.render_table().contains("stop-loss 0.0000 (40% of window"));
    }

    #[test]
    fn test_render_table_mentions_every_symbol() {
        let orders = vec![
            order("1", "BTC", OrderStatus::Pending, 0.6),
            order("2", "DOGE", OrderStatus::Triggered, 0.7),
        ];
        let view = PendingOrdersView::build(&orders, &[StopLossRecord::for_symbol("BTC")], now());
        let table = view.render_table();

        assert!(table.contains("BTC"));
        assert!(table.contains("DOGE"));
        assert!(table.contains("2 total"));
        assert!(table.contains("Adaptive stop-loss (1 active)"));
    }

    #[test]
    fn test_view_serializes() {
        let view = PendingOrdersView::build(&[order("1", "BTC", OrderStatus::Pending, 0.6)], &[], now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["rows"][0]["symbol"], "BTC");
        assert_eq!(json["counts"]["total"], 1);
    }
}
