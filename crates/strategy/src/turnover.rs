//! Trades and estimated cost between current holdings and a target allocation.

use crate::allocation::dedup_tickers;
use rust_decimal::Decimal;
use satellite_core::{Allocation, StrategyConfig, TurnoverReport};

/// Diffs current holdings against the invested tickers of a new allocation.
///
/// Reporting only. The cash ticker is never bought or sold.
#[must_use]
pub fn compute_turnover<S: AsRef<str>>(
    holdings: &[S],
    allocation: &Allocation,
    config: &StrategyConfig,
) -> TurnoverReport {
    let cash = config.cash.ticker.as_str();
    let current = dedup_tickers(holdings);
    let target = dedup_tickers(&allocation.invested_tickers());

    let sells: Vec<String> = current
        .iter()
        .filter(|t| t.as_str() != cash && !target.contains(t))
        .cloned()
        .collect();
    let buys: Vec<String> = target
        .iter()
        .filter(|t| t.as_str() != cash && !current.contains(t))
        .cloned()
        .collect();

    let trade_count = sells.len() + buys.len();
    let estimated_cost = config.trade_cost_estimate * Decimal::from(trade_count);

    TurnoverReport {
        current,
        target,
        sells,
        buys,
        trade_count,
        estimated_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use satellite_core::{
        AllocationSlot, CashInstrument, HorizonValues, InstrumentRef, MomentumMetrics,
        RankedInstrument, SlotAction,
    };

    fn slot(ticker: &str, action: SlotAction) -> AllocationSlot {
        let flat = HorizonValues::from_fn(|_| 0.1);
        AllocationSlot::Position {
            action,
            ranked: RankedInstrument {
                instrument: InstrumentRef::new(ticker),
                metrics: MomentumMetrics {
                    reference_price: 10.0,
                    reference_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
                    trend_baseline: Some(9.0),
                    score: 0.1,
                    lookback_prices: flat,
                    returns: flat,
                    is_uptrend: true,
                    ten_month_approximated: false,
                },
                rank: 0,
            },
        }
    }

    #[test]
    fn test_buys_and_sells() {
        let allocation = Allocation {
            slots: vec![
                slot("A", SlotAction::Hold),
                slot("C", SlotAction::Buy),
                AllocationSlot::Cash(CashInstrument::default()),
            ],
        };
        let report = compute_turnover(&["A", "B", "B"], &allocation, &StrategyConfig::default());

        assert_eq!(report.current, vec!["A", "B"]);
        assert_eq!(report.target, vec!["A", "C"]);
        assert_eq!(report.sells, vec!["B"]);
        assert_eq!(report.buys, vec!["C"]);
        assert_eq!(report.trade_count, 2);
        assert_eq!(report.estimated_cost, dec!(11.80));
    }

    #[test]
    fn test_cash_holding_is_never_sold() {
        let allocation = Allocation {
            slots: vec![AllocationSlot::Cash(CashInstrument::default()); 3],
        };
        let report = compute_turnover(
            &["YCAA.XETRA", "A"],
            &allocation,
            &StrategyConfig::default(),
        );
        assert_eq!(report.sells, vec!["A"]);
        assert!(report.buys.is_empty());
        assert_eq!(report.trade_count, 1);
    }

    #[test]
    fn test_no_trades_when_unchanged() {
        let allocation = Allocation {
            slots: vec![slot("A", SlotAction::Hold), slot("B", SlotAction::Hold)],
        };
        let report = compute_turnover(&["B", "A"], &allocation, &StrategyConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.estimated_cost, Decimal::ZERO);
    }
}
