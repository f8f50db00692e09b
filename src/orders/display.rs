use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Trade direction implied by the protective levels of an order
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Long when take-profit sits above stop-loss, short otherwise
    pub fn of(stop_loss: f64, take_profit: f64) -> Self {
        if take_profit > stop_loss {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceTier::High
        } else if confidence >= 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Time left before an order expires
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ExpiresIn {
    Expired,
    Remaining { hours: i64, minutes: i64 },
}

impl ExpiresIn {
    /// Unknown expiry counts as expired
    pub fn until(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(expires_at) = expires_at else {
            return ExpiresIn::Expired;
        };

        let diff = expires_at - now;
        if diff < chrono::Duration::zero() {
            return ExpiresIn::Expired;
        }

        ExpiresIn::Remaining {
            hours: diff.num_hours(),
            minutes: diff.num_minutes() % 60,
        }
    }
}

impl fmt::Display for ExpiresIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiresIn::Expired => write!(f, "expired"),
            ExpiresIn::Remaining { hours, minutes } if *hours > 0 => {
                write!(f, "{}h {}m", hours, minutes)
            }
            ExpiresIn::Remaining { minutes, .. } => write!(f, "{}m", minutes),
        }
    }
}
