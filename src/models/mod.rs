pub mod lenient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Lifecycle status of a pending order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Triggered,
    Filled,
    Cancelled,
    Expired,
    /// Missing or unrecognised status string
    #[default]
    #[serde(other)]
    Unknown,
}

/// A not-yet-filled trade instruction produced by the upstream decision process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub trader_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: OrderStatus,
    #[serde(default = "lenient::nan", deserialize_with = "lenient::f64_or_nan")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub target_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub trigger_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub stop_loss: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub take_profit: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub position_size: f64, // USDT
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub leverage: f64,
}

impl Order {
    /// Confidence as a ranking key: malformed values rank below everything
    pub fn confidence_rank(&self) -> f64 {
        if self.confidence.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.confidence
        }
    }

    /// True if this order should replace `current` as the best of its group.
    ///
    /// Higher confidence wins; on equal confidence the strictly newer order wins,
    /// so exact ties keep whichever order was seen first.
    pub fn outranks(&self, current: &Order) -> bool {
        match self
            .confidence_rank()
            .partial_cmp(&current.confidence_rank())
        {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.created_at > current.created_at,
            _ => false,
        }
    }
}

/// Adaptive trailing-stop snapshot computed by the stop-loss engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopLossRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub trader_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub position_id: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub current_stop_loss: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub initial_stop_loss: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub entry_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub take_profit: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub time_progression: f64, // 0..=1
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub elapsed_seconds: f64,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub is_in_profit: bool,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub profit_distance: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String, // ACTIVE / CLOSED
}

impl StopLossRecord {
    /// Minimal record for a symbol (used by tests and synthetic data)
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            id: format!("asl-{}", symbol),
            trader_id: String::new(),
            symbol: symbol.to_string(),
            position_id: String::new(),
            current_stop_loss: 0.0,
            initial_stop_loss: 0.0,
            entry_price: 0.0,
            current_price: 0.0,
            take_profit: 0.0,
            time_progression: 0.0,
            elapsed_seconds: 0.0,
            is_in_profit: false,
            profit_distance: 0.0,
            status: "ACTIVE".to_string(),
        }
    }
}

/// Response wrapper of the adaptive stop-loss endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopLossResponse {
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub exists: bool,
    #[serde(default)]
    pub records: Option<Vec<StopLossRecord>>,
}

impl StopLossResponse {
    /// Usable records: empty unless the engine reported state for this trader
    pub fn into_records(self) -> Vec<StopLossRecord> {
        match (self.exists, self.records) {
            (true, Some(records)) => records,
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Live position as reported by the positions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub side: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub entry_price: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: PositionStatus,
}

/// Symbols that currently have an OPEN position
pub fn open_symbols(positions: &[Position]) -> HashSet<String> {
    positions
        .iter()
        .filter(|p| p.status == PositionStatus::Open)
        .map(|p| p.symbol.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_backend_json() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "po-1",
                "trader_id": "trader-a",
                "symbol": "BTCUSDT",
                "status": "TRIGGERED",
                "confidence": 0.82,
                "created_at": "2024-05-01T10:00:00Z",
                "expires_at": "2024-05-02T10:00:00Z",
                "target_price": 64000.0,
                "trigger_price": 63950.5,
                "stop_loss": 62000,
                "take_profit": 68000,
                "position_size": 250.0,
                "leverage": 5
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Triggered);
        assert_eq!(order.symbol, "BTCUSDT");
        assert_eq!(order.leverage, 5.0);
        assert!(order.expires_at > order.created_at);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let order: Order =
            serde_json::from_str(r#"{"id":"x","symbol":"ETH","status":"ARCHIVED"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(order.confidence.is_nan());

        let order: Order = serde_json::from_str(r#"{"id":"y","status":null}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.confidence_rank(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_outranks_on_confidence_then_recency() {
        let older: Order = serde_json::from_str(
            r#"{"id":"a","symbol":"SOL","confidence":0.7,"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let newer = Order {
            id: "b".to_string(),
            created_at: older.created_at.map(|t| t + chrono::Duration::minutes(5)),
            ..older.clone()
        };
        let stronger = Order {
            id: "c".to_string(),
            confidence: 0.9,
            created_at: None,
            ..older.clone()
        };

        assert!(newer.outranks(&older));
        assert!(!older.outranks(&newer));
        assert!(stronger.outranks(&newer));
        // Exact tie keeps the incumbent
        assert!(!older.clone().outranks(&older));
    }

    #[test]
    fn test_stop_loss_response_without_state() {
        let response: StopLossResponse =
            serde_json::from_str(r#"{"exists":false,"records":null}"#).unwrap();
        assert!(response.into_records().is_empty());

        let response: StopLossResponse =
            serde_json::from_str(r#"{"exists":true,"records":[{"symbol":"BTC"}]}"#).unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "BTC");
    }

    #[test]
    fn test_open_symbols_only_counts_open_positions() {
        let positions: Vec<Position> = serde_json::from_str(
            r#"[
                {"id":"1","symbol":"BTC","status":"OPEN"},
                {"id":"2","symbol":"ETH","status":"CLOSED"},
                {"id":"3","symbol":"SOL","status":"OPEN"},
                {"id":"4","symbol":"BTC","status":"OPEN"}
            ]"#,
        )
        .unwrap();

        let symbols = open_symbols(&positions);
        assert_eq!(symbols.len(), 2);
        assert!(symbols.contains("BTC"));
        assert!(symbols.contains("SOL"));
        assert!(!symbols.contains("ETH"));
    }
}
