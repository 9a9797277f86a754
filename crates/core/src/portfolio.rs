//! Ranking and allocation records produced by one strategy run.

use crate::config::CashInstrument;
use crate::instrument::InstrumentRef;
use crate::metrics::MomentumMetrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An instrument with its metrics and its position in the score ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedInstrument {
    pub instrument: InstrumentRef,
    pub metrics: MomentumMetrics,
    /// 0 is the best score.
    pub rank: usize,
}

impl RankedInstrument {
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.instrument.ticker
    }

    #[must_use]
    pub const fn score(&self) -> f64 {
        self.metrics.score
    }

    #[must_use]
    pub const fn is_uptrend(&self) -> bool {
        self.metrics.is_uptrend
    }
}

/// What to do with an allocation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotAction {
    /// Keep an existing position.
    Hold,
    /// Open a new position.
    Buy,
    /// Park the slot in the cash instrument.
    Fallback,
}

impl std::fmt::Display for SlotAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "HOLD"),
            Self::Buy => write!(f, "BUY"),
            Self::Fallback => write!(f, "FALLBACK"),
        }
    }
}

/// One equal-weight slot of the target portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AllocationSlot {
    Position {
        action: SlotAction,
        ranked: RankedInstrument,
    },
    /// Cash placeholder: score 0, uptrend by definition, no group.
    Cash(CashInstrument),
}

impl AllocationSlot {
    #[must_use]
    pub fn ticker(&self) -> &str {
        match self {
            Self::Position { ranked, .. } => ranked.ticker(),
            Self::Cash(cash) => &cash.ticker,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Position { ranked, .. } => &ranked.instrument.name,
            Self::Cash(cash) => &cash.name,
        }
    }

    #[must_use]
    pub fn isin(&self) -> &str {
        match self {
            Self::Position { ranked, .. } => ranked.instrument.isin_or_empty(),
            Self::Cash(cash) => &cash.isin,
        }
    }

    #[must_use]
    pub const fn action(&self) -> SlotAction {
        match self {
            Self::Position { action, .. } => *action,
            Self::Cash(_) => SlotAction::Fallback,
        }
    }

    #[must_use]
    pub const fn score(&self) -> f64 {
        match self {
            Self::Position { ranked, .. } => ranked.score(),
            Self::Cash(_) => 0.0,
        }
    }

    #[must_use]
    pub const fn is_uptrend(&self) -> bool {
        match self {
            Self::Position { ranked, .. } => ranked.is_uptrend(),
            Self::Cash(_) => true,
        }
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Position { ranked, .. } => ranked.instrument.group(),
            Self::Cash(_) => None,
        }
    }

    #[must_use]
    pub const fn is_cash(&self) -> bool {
        matches!(self, Self::Cash(_))
    }
}

/// The final target portfolio, ordered by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub slots: Vec<AllocationSlot>,
}

impl Allocation {
    /// Number of slots held in real instruments.
    #[must_use]
    pub fn invested_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_cash()).count()
    }

    #[must_use]
    pub fn cash_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_cash()).count()
    }

    /// Every slot is parked in cash.
    #[must_use]
    pub fn is_fully_defensive(&self) -> bool {
        !self.slots.is_empty() && self.invested_count() == 0
    }

    /// Tickers of invested slots in allocation order.
    #[must_use]
    pub fn invested_tickers(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| !s.is_cash())
            .map(AllocationSlot::ticker)
            .collect()
    }
}

/// Trades needed to move from the current holdings to a new allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnoverReport {
    pub current: Vec<String>,
    pub target: Vec<String>,
    pub sells: Vec<String>,
    pub buys: Vec<String>,
    pub trade_count: usize,
    pub estimated_cost: Decimal,
}

impl TurnoverReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }
}
