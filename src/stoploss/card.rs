use crate::models::StopLossRecord;
use serde::Serialize;

/// Which way the adaptive stop is trailing
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TrailMode {
    /// In profit: stop follows price to lock gains
    ProfitTracking,
    /// Not in profit: stop converges back toward the entry price over time
    ReturningToEntry,
}

/// Display-ready summary of one adaptive stop-loss record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StopLossCard {
    pub symbol: String,
    pub current_stop_loss: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub take_profit: f64,
    pub progress_pct: f64,
    pub elapsed_minutes: f64,
    pub is_moving: bool,
    pub trail: TrailMode,
    /// Only reported while in profit
    pub profit_distance: Option<f64>,
}

impl StopLossCard {
    pub fn from_record(record: &StopLossRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            current_stop_loss: record.current_stop_loss,
            entry_price: record.entry_price,
            current_price: record.current_price,
            take_profit: record.take_profit,
            progress_pct: record.time_progression * 100.0,
            elapsed_minutes: record.elapsed_seconds / 60.0,
            is_moving: record.time_progression < 1.0 || record.is_in_profit,
            trail: if record.is_in_profit {
                TrailMode::ProfitTracking
            } else {
                TrailMode::ReturningToEntry
            },
            profit_distance: record.is_in_profit.then_some(record.profit_distance),
        }
    }
}

/// Card for the first record of `symbol`, if any
pub fn card_for(records: &[StopLossRecord], symbol: &str) -> Option<StopLossCard> {
    records
        .iter()
        .find(|r| r.symbol == symbol)
        .map(StopLossCard::from_record)
}
