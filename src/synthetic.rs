use crate::models::{Order, OrderStatus, Position, PositionStatus, StopLossRecord};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Symbols used for generated data, with a rough reference price
const UNIVERSE: &[(&str, f64)] = &[
    ("BTCUSDT", 64_000.0),
    ("ETHUSDT", 3_200.0),
    ("SOLUSDT", 150.0),
    ("BNBUSDT", 580.0),
    ("XRPUSDT", 0.52),
    ("DOGEUSDT", 0.15),
    ("ADAUSDT", 0.45),
    ("AVAXUSDT", 35.0),
];

/// Generates reproducible desk snapshots (orders, positions, stop-loss state)
pub struct SyntheticDeskGenerator {
    rng: StdRng,
    trader_id: String,
}

impl SyntheticDeskGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64, trader_id: impl Into<String>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            trader_id: trader_id.into(),
        }
    }

    pub fn universe() -> impl Iterator<Item = &'static str> {
        UNIVERSE.iter().map(|(s, _)| *s)
    }

    /// Generate `count` orders over the first `symbols` symbols of the universe.
    ///
    /// Confidence is quantised to 0.05 steps so exact ties actually occur.
    pub fn orders(&mut self, count: usize, symbols: usize, now: DateTime<Utc>) -> Vec<Order> {
        let symbols = symbols.clamp(1, UNIVERSE.len());

        (0..count)
            .map(|i| {
                let (symbol, price) = UNIVERSE[self.rng.gen_range(0..symbols)];
                let long = self.rng.gen_bool(0.5);
                let trigger = price * (1.0 + self.rng.gen_range(-0.02..0.02));
                let (stop_loss, take_profit) = if long {
                    (trigger * 0.97, trigger * 1.06)
                } else {
                    (trigger * 1.03, trigger * 0.94)
                };
                let age_minutes = self.rng.gen_range(0..24 * 60);
                let created_at = now - Duration::minutes(age_minutes);

                Order {
                    id: format!("po-{:04}", i),
                    trader_id: self.trader_id.clone(),
                    symbol: symbol.to_string(),
                    status: self.status(),
                    confidence: (self.rng.gen_range(8..=19) as f64) * 0.05,
                    created_at: Some(created_at),
                    expires_at: Some(created_at + Duration::hours(24)),
                    target_price: price,
                    trigger_price: trigger,
                    stop_loss,
                    take_profit,
                    position_size: self.rng.gen_range(20.0..500.0),
                    leverage: self.rng.gen_range(1..=10) as f64,
                }
            })
            .collect()
    }

    fn status(&mut self) -> OrderStatus {
        match self.rng.gen_range(0..100) {
            0..=59 => OrderStatus::Pending,
            60..=74 => OrderStatus::Triggered,
            75..=84 => OrderStatus::Filled,
            85..=94 => OrderStatus::Cancelled,
            _ => OrderStatus::Expired,
        }
    }

    /// Open positions on a random subset of `symbols` (plus a closed one)
    pub fn positions(&mut self, symbols: &[&str]) -> Vec<Position> {
        let mut chosen: Vec<&str> = symbols.to_vec();
        chosen.shuffle(&mut self.rng);
        let open = self.rng.gen_range(1..=chosen.len().max(1));

        chosen
            .iter()
            .enumerate()
            .map(|(i, symbol)| Position {
                id: format!("pos-{}", i),
                symbol: symbol.to_string(),
                side: if self.rng.gen_bool(0.5) { "LONG" } else { "SHORT" }.to_string(),
                entry_price: self.rng.gen_range(1.0..100.0),
                quantity: self.rng.gen_range(0.1..10.0),
                status: if i < open {
                    PositionStatus::Open
                } else {
                    PositionStatus::Closed
                },
            })
            .collect()
    }

    /// One adaptive stop-loss record per symbol
    pub fn stop_loss_records(&mut self, symbols: &[&str]) -> Vec<StopLossRecord> {
        symbols
            .iter()
            .map(|symbol| {
                let entry = self.rng.gen_range(1.0..100.0);
                let current = entry * (1.0 + self.rng.gen_range(-0.03..0.05));
                let progression: f64 = self.rng.gen_range(0.0..1.2);
                StopLossRecord {
                    trader_id: self.trader_id.clone(),
                    position_id: format!("pos-{}", symbol),
                    current_stop_loss: entry * 0.97,
                    initial_stop_loss: entry * 0.95,
                    entry_price: entry,
                    current_price: current,
                    take_profit: entry * 1.08,
                    time_progression: progression.min(1.0),
                    elapsed_seconds: (progression * 3600.0).round(),
                    is_in_profit: current > entry,
                    profit_distance: (current - entry).max(0.0),
                    ..StopLossRecord::for_symbol(symbol)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_orders() {
        let now = Utc::now();
        let a = SyntheticDeskGenerator::new(7, "t").orders(50, 4, now);
        let b = SyntheticDeskGenerator::new(7, "t").orders(50, 4, now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_orders_stay_within_requested_symbols() {
        let now = Utc::now();
        let orders = SyntheticDeskGenerator::new(1, "t").orders(200, 3, now);
        let allowed: Vec<_> = SyntheticDeskGenerator::universe().take(3).collect();

        assert_eq!(orders.len(), 200);
        assert!(orders.iter().all(|o| allowed.contains(&o.symbol.as_str())));
        assert!(orders.iter().all(|o| (0.0..=1.0).contains(&o.confidence)));
    }

    #[test]
    fn test_positions_have_at_least_one_open() {
        let positions = SyntheticDeskGenerator::new(3, "t").positions(&["BTCUSDT", "ETHUSDT"]);
        assert_eq!(positions.len(), 2);
        assert!(positions.iter().any(|p| p.status == PositionStatus::Open));
    }

    #[test]
    fn test_stop_loss_records_per_symbol() {
        let records = SyntheticDeskGenerator::new(3, "t").stop_loss_records(&["BTCUSDT", "SOLUSDT"]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.time_progression <= 1.0));
        assert!(records.iter().all(|r| r.is_in_profit == (r.profit_distance > 0.0)));
    }
}
