//! Constrained allocation of the fixed-size target portfolio.
//!
//! Greedy and deterministic:
//! 1. **Retention**: current holdings found in the stability buffer with an
//!    uptrend verdict are kept as `HOLD`, in the order the holdings were given.
//! 2. **Primary fill**: the full ranking is walked by descending score and
//!    uptrending instruments are added as `BUY`.
//! 3. **Defensive padding**: remaining slots are parked in the cash instrument.
//! 4. Slots are re-sorted by descending score.
//!
//! Every non-blank constraint group occupies at most one slot.

use crate::ranker::Ranking;
use satellite_core::{
    Allocation, AllocationSlot, RankedInstrument, SlotAction, StrategyConfig,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Slots consumed per constraint group during a single allocation run.
#[derive(Debug, Default)]
pub struct GroupUsage {
    counts: HashMap<String, usize>,
}

impl GroupUsage {
    #[must_use]
    pub fn count(&self, group: &str) -> usize {
        self.counts.get(group).copied().unwrap_or(0)
    }

    /// Unconstrained instruments never occupy a group.
    #[must_use]
    pub fn is_occupied(&self, group: Option<&str>) -> bool {
        group.is_some_and(|g| self.count(g) >= 1)
    }

    pub fn record(&mut self, group: Option<&str>) {
        if let Some(g) = group {
            *self.counts.entry(g.to_string()).or_insert(0) += 1;
        }
    }
}

/// Outcome of offering an instrument to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Added,
    Full,
    AlreadyAllocated,
    /// The ticker is the configured cash instrument, which only fills padding slots.
    CashTicker,
    NotUptrend,
    GroupOccupied(String),
}

/// Owns the slot list and group usage of one allocation run.
pub struct AllocationBuilder<'a> {
    config: &'a StrategyConfig,
    slots: Vec<AllocationSlot>,
    groups: GroupUsage,
}

impl<'a> AllocationBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a StrategyConfig) -> Self {
        Self {
            config,
            slots: Vec::with_capacity(config.portfolio_slots),
            groups: GroupUsage::default(),
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.config.portfolio_slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        self.slots.iter().any(|s| s.ticker() == ticker)
    }

    /// Adds `ranked` under `action` if it passes every admission rule.
    pub fn try_add(&mut self, ranked: &RankedInstrument, action: SlotAction) -> Admission {
        if self.is_full() {
            return Admission::Full;
        }
        if self.contains(ranked.ticker()) {
            return Admission::AlreadyAllocated;
        }
        if ranked.ticker() == self.config.cash.ticker {
            return Admission::CashTicker;
        }
        if !ranked.is_uptrend() {
            return Admission::NotUptrend;
        }
        let group = ranked.instrument.group();
        if self.groups.is_occupied(group) {
            return Admission::GroupOccupied(group.unwrap_or_default().to_string());
        }

        self.groups.record(group);
        self.slots.push(AllocationSlot::Position {
            action,
            ranked: ranked.clone(),
        });
        Admission::Added
    }

    /// Pads with cash up to the slot count and orders by descending score.
    #[must_use]
    pub fn finish(mut self) -> Allocation {
        let invested = self.slots.len();
        let missing = self.config.portfolio_slots.saturating_sub(invested);

        if missing == self.config.portfolio_slots {
            warn!("Zero assets passed momentum constraints, activating full defensive mode");
        } else if missing > 0 {
            warn!(
                "Only {} assets in confirmed uptrend, padding {} slot(s) with {}",
                invested, missing, self.config.cash.ticker
            );
        }

        for _ in 0..missing {
            self.slots.push(AllocationSlot::Cash(self.config.cash.clone()));
        }

        self.slots.sort_by(|a, b| b.score().total_cmp(&a.score()));
        Allocation { slots: self.slots }
    }
}

/// Deduplicates holdings while keeping their first-seen order.
#[must_use]
pub fn dedup_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Selects the target portfolio from a ranking and the current holdings.
///
/// Never fails: with no qualifying instrument every slot is cash.
#[must_use]
pub fn allocate<S: AsRef<str>>(
    ranking: &Ranking,
    holdings: &[S],
    config: &StrategyConfig,
) -> Allocation {
    let holdings = dedup_tickers(holdings);
    let mut builder = AllocationBuilder::new(config);

    for ticker in &holdings {
        if builder.is_full() {
            break;
        }
        if *ticker == config.cash.ticker {
            continue;
        }
        match ranking.buffer_entry(ticker) {
            Some(entry) => match builder.try_add(entry, SlotAction::Hold) {
                Admission::Added => info!("Retaining {} (rank {})", ticker, entry.rank + 1),
                other => debug!("Not retaining {}: {:?}", ticker, other),
            },
            None => debug!(
                "Not retaining {}: outside top {} stability buffer",
                ticker, config.stability_buffer
            ),
        }
    }

    for entry in ranking.entries() {
        if builder.is_full() {
            break;
        }
        // a holding re-selected here stays a HOLD, so turnover and actions agree
        let action = if holdings.iter().any(|h| h == entry.ticker()) {
            SlotAction::Hold
        } else {
            SlotAction::Buy
        };
        match builder.try_add(entry, action) {
            Admission::GroupOccupied(group) => {
                debug!("Skipped {} (constraint limit reached for: {})", entry.ticker(), group);
            }
            Admission::Added => debug!("Selected {} as {}", entry.ticker(), action),
            _ => {}
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use satellite_core::{HorizonValues, InstrumentRef, MomentumMetrics};

    fn metrics(score: f64, uptrend: bool) -> MomentumMetrics {
        let flat = HorizonValues::from_fn(|_| score);
        MomentumMetrics {
            reference_price: 100.0,
            reference_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            trend_baseline: Some(90.0),
            score,
            lookback_prices: flat,
            returns: flat,
            is_uptrend: uptrend,
            ten_month_approximated: false,
        }
    }

    fn ranking(items: &[(&str, f64, bool, &str)], buffer: usize) -> Ranking {
        Ranking::new(
            items
                .iter()
                .map(|(t, s, up, g)| (InstrumentRef::new(*t).with_group(*g), metrics(*s, *up)))
                .collect(),
            buffer,
        )
    }

    fn tickers(allocation: &Allocation) -> Vec<&str> {
        allocation.slots.iter().map(AllocationSlot::ticker).collect()
    }

    fn actions(allocation: &Allocation) -> Vec<SlotAction> {
        allocation.slots.iter().map(AllocationSlot::action).collect()
    }

    #[test]
    fn test_group_usage() {
        let mut usage = GroupUsage::default();
        assert!(!usage.is_occupied(Some("equity")));
        usage.record(Some("equity"));
        usage.record(None);
        assert!(usage.is_occupied(Some("equity")));
        assert!(!usage.is_occupied(None));
        assert_eq!(usage.count("equity"), 1);
    }

    #[test]
    fn test_builder_admission_rules() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("A", 0.3, true, "eq"),
                ("B", 0.2, true, "eq"),
                ("C", 0.1, false, ""),
            ],
            5,
        );
        let entries = ranking.entries();
        let mut builder = AllocationBuilder::new(&config);

        assert_eq!(builder.try_add(&entries[0], SlotAction::Buy), Admission::Added);
        assert_eq!(
            builder.try_add(&entries[0], SlotAction::Buy),
            Admission::AlreadyAllocated
        );
        assert_eq!(
            builder.try_add(&entries[1], SlotAction::Buy),
            Admission::GroupOccupied("eq".to_string())
        );
        assert_eq!(builder.try_add(&entries[2], SlotAction::Buy), Admission::NotUptrend);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_builder_rejects_cash_ticker() {
        let config = StrategyConfig::default();
        let ranking = ranking(&[("YCAA.XETRA", 0.01, true, "")], 5);
        let mut builder = AllocationBuilder::new(&config);
        assert_eq!(
            builder.try_add(&ranking.entries()[0], SlotAction::Buy),
            Admission::CashTicker
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn test_cash_ticker_in_universe_is_not_bought() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("SWDA.LSE", 0.05, true, ""),
                ("YCAA.XETRA", 0.002, true, ""),
                ("IBTM.LSE", -0.01, false, ""),
            ],
            5,
        );
        let allocation = allocate::<&str>(&ranking, &[], &config);
        assert_eq!(tickers(&allocation), vec!["SWDA.LSE", "YCAA.XETRA", "YCAA.XETRA"]);
        assert_eq!(
            actions(&allocation),
            vec![SlotAction::Buy, SlotAction::Fallback, SlotAction::Fallback]
        );
        assert_eq!(allocation.cash_count(), 2);
    }

    #[test]
    fn test_builder_reports_full() {
        let config = StrategyConfig {
            portfolio_slots: 1,
            ..StrategyConfig::default()
        };
        let ranking = ranking(&[("A", 0.3, true, ""), ("B", 0.2, true, "")], 5);
        let mut builder = AllocationBuilder::new(&config);
        assert_eq!(builder.try_add(&ranking.entries()[0], SlotAction::Buy), Admission::Added);
        assert_eq!(builder.try_add(&ranking.entries()[1], SlotAction::Buy), Admission::Full);
    }

    #[test]
    fn test_fills_top_uptrending_instruments() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("A", 0.05, true, ""),
                ("B", 0.09, true, ""),
                ("C", 0.07, false, ""),
                ("D", 0.03, true, ""),
                ("E", 0.01, true, ""),
            ],
            5,
        );
        let allocation = allocate::<&str>(&ranking, &[], &config);
        assert_eq!(tickers(&allocation), vec!["B", "A", "D"]);
        assert!(actions(&allocation).iter().all(|a| *a == SlotAction::Buy));
    }

    #[test]
    fn test_empty_universe_is_all_cash() {
        let config = StrategyConfig::default();
        let allocation = allocate(&ranking(&[], 5), &["A"], &config);
        assert_eq!(allocation.slots.len(), 3);
        assert!(allocation.is_fully_defensive());
        assert!(allocation
            .slots
            .iter()
            .all(|s| s.ticker() == "YCAA.XETRA" && s.action() == SlotAction::Fallback));
    }

    #[test]
    fn test_retained_holding_beats_better_candidate() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("A", 0.09, true, "eq"),
                ("B", 0.08, true, "bonds"),
                ("C", 0.07, true, "gold"),
                ("D", 0.06, true, "eq"),
            ],
            5,
        );
        let allocation = allocate(&ranking, &["D"], &config);
        // D holds the "eq" group, so A is skipped
        assert_eq!(tickers(&allocation), vec!["B", "C", "D"]);
        assert_eq!(
            actions(&allocation),
            vec![SlotAction::Buy, SlotAction::Buy, SlotAction::Hold]
        );
    }

    #[test]
    fn test_holding_outside_buffer_is_replaced() {
        let config = StrategyConfig {
            stability_buffer: 2,
            ..StrategyConfig::default()
        };
        let ranking = ranking(
            &[
                ("A", 0.09, true, "x"),
                ("B", 0.08, true, "y"),
                ("C", 0.07, true, "z"),
                ("D", 0.06, true, "x"),
            ],
            2,
        );
        let allocation = allocate(&ranking, &["D"], &config);
        assert_eq!(tickers(&allocation), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_holding_without_uptrend_is_not_retained() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[("A", 0.09, true, ""), ("H", 0.08, false, ""), ("B", 0.02, true, "")],
            5,
        );
        let allocation = allocate(&ranking, &["H"], &config);
        assert_eq!(tickers(&allocation), vec!["A", "B", "YCAA.XETRA"]);
        assert_eq!(allocation.cash_count(), 1);
    }

    #[test]
    fn test_retention_respects_group_between_holdings() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("A", 0.09, true, "eq"),
                ("B", 0.08, true, "eq"),
                ("C", 0.07, true, ""),
            ],
            5,
        );
        // B comes first in the holdings, so A cannot be retained in the same group
        let allocation = allocate(&ranking, &["B", "A"], &config);
        assert_eq!(tickers(&allocation), vec!["B", "C", "YCAA.XETRA"]);
        assert_eq!(allocation.slots[0].action(), SlotAction::Hold);
    }

    #[test]
    fn test_duplicate_holdings_and_cash_ticker_are_ignored() {
        let config = StrategyConfig::default();
        let ranking = ranking(&[("A", 0.09, true, ""), ("B", 0.05, true, "")], 5);
        let allocation = allocate(&ranking, &["A", "A", "YCAA.XETRA", " "], &config);
        assert_eq!(tickers(&allocation), vec!["A", "B", "YCAA.XETRA"]);
        assert_eq!(
            actions(&allocation),
            vec![SlotAction::Hold, SlotAction::Buy, SlotAction::Fallback]
        );
    }

    #[test]
    fn test_at_most_one_slot_per_group() {
        let config = StrategyConfig::default();
        let ranking = ranking(
            &[
                ("A", 0.09, true, "eq"),
                ("B", 0.08, true, " eq "),
                ("C", 0.07, true, "eq"),
                ("D", 0.06, true, "bonds"),
            ],
            5,
        );
        let allocation = allocate::<&str>(&ranking, &[], &config);
        assert_eq!(tickers(&allocation), vec!["A", "D", "YCAA.XETRA"]);
    }

    #[test]
    fn test_slot_count_follows_config() {
        let config = StrategyConfig {
            portfolio_slots: 5,
            ..StrategyConfig::default()
        };
        let ranking = ranking(&[("A", 0.09, true, "")], 5);
        let allocation = allocate::<&str>(&ranking, &[], &config);
        assert_eq!(allocation.slots.len(), 5);
        assert_eq!(allocation.invested_count(), 1);
    }

    #[test]
    fn test_dedup_tickers_keeps_order() {
        assert_eq!(
            dedup_tickers(&["B", " A", "B", "", "A "]),
            vec!["B".to_string(), "A".to_string()]
        );
    }
}
