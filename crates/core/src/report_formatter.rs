#![allow(clippy::format_push_string)]

use crate::error::Exclusion;
use crate::portfolio::{Allocation, RankedInstrument, TurnoverReport};
use rust_decimal::Decimal;

const RULE: &str = "────────────────────────────────────────────────────────────────────────────";

/// Formats a ratio as an Austrian-style percentage: `0.1234` -> `12,34 %`.
#[must_use]
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2} %", ratio * 100.0).replace('.', ",")
}

/// Formats an amount with decimal comma and euro sign: `11.8` -> `11,80 €`.
#[must_use]
pub fn format_euro(amount: Decimal) -> String {
    format!("{:.2} €", amount.round_dp(2)).replace('.', ",")
}

pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders the stability-buffer ranking table.
    #[must_use]
    pub fn format_ranking(buffer: &[RankedInstrument]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nALGORITHMIC RANKING (Top {} - Rank Stability Buffer)\n",
            buffer.len()
        ));
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "{:<4} {:<14} {:<14} {:<30} {:>10} {:>8}\n",
            "#", "Ticker", "ISIN", "Name", "Score", "Uptrend"
        ));

        for entry in buffer {
            let mut score = format_percent(entry.score());
            if entry.metrics.ten_month_approximated {
                score.push('*');
            }
            output.push_str(&format!(
                "{:<4} {:<14} {:<14} {:<30} {:>10} {:>8}\n",
                entry.rank + 1,
                entry.ticker(),
                entry.instrument.isin_or_empty(),
                truncate(&entry.instrument.name, 30),
                score,
                if entry.is_uptrend() { "yes" } else { "no" }
            ));
        }

        if buffer.iter().any(|e| e.metrics.ten_month_approximated) {
            output.push_str("* 10M lookback approximated with the oldest daily price\n");
        }

        output
    }

    /// Renders the allocation directive, including defensive-mode warnings.
    #[must_use]
    pub fn format_allocation(allocation: &Allocation) -> String {
        let mut output = String::new();

        let cash_slots = allocation.cash_count();
        if allocation.is_fully_defensive() {
            output.push_str(
                "\n[WARNING] Zero assets passed momentum constraints. Full defensive mode (100 % cash/money market).\n",
            );
        } else if cash_slots > 0 {
            output.push_str(&format!(
                "\n[WARNING] Only {} assets in confirmed uptrend. Padding remaining {} slot(s) with cash/money market.\n",
                allocation.invested_count(),
                cash_slots
            ));
        }

        output.push_str("\nFINAL ALLOCATION DIRECTIVE\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "{:<4} {:<9} {:<14} {:<14} {}\n",
            "Pos", "Action", "Ticker", "ISIN", "Name"
        ));

        for (idx, slot) in allocation.slots.iter().enumerate() {
            output.push_str(&format!(
                "{:<4} {:<9} {:<14} {:<14} {}\n",
                idx + 1,
                slot.action().to_string(),
                slot.ticker(),
                slot.isin(),
                slot.name()
            ));
        }

        output
    }

    #[must_use]
    pub fn format_exclusions(exclusions: &[Exclusion]) -> String {
        if exclusions.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        output.push_str(&format!("\nEXCLUDED INSTRUMENTS ({})\n", exclusions.len()));
        output.push_str(RULE);
        output.push('\n');
        for exclusion in exclusions {
            output.push_str(&format!(
                "{:<14} [{}] {}\n",
                exclusion.ticker,
                exclusion.reason.code(),
                exclusion.reason
            ));
        }
        output
    }

    #[must_use]
    pub fn format_turnover(turnover: &TurnoverReport) -> String {
        let mut output = String::new();

        output.push_str("\nTURNOVER & COST ANALYSIS\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!("Current Holdings:      {:?}\n", turnover.current));
        output.push_str(&format!("Target Positions:      {:?}\n", turnover.target));
        output.push_str(&format!("Required Sales:        {:?}\n", turnover.sells));
        output.push_str(&format!("Required Buys:         {:?}\n", turnover.buys));
        output.push_str(&format!("Total Trades:          {}\n", turnover.trade_count));
        output.push_str(&format!(
            "Estimated Cost:        ~{}\n",
            format_euro(turnover.estimated_cost)
        ));

        output
    }

    /// Renders the full console report of one run.
    #[must_use]
    pub fn format(
        buffer: &[RankedInstrument],
        allocation: &Allocation,
        exclusions: &[Exclusion],
        turnover: Option<&TurnoverReport>,
    ) -> String {
        let mut output = Self::format_ranking(buffer);
        output.push_str(&Self::format_allocation(allocation));
        output.push_str(&Self::format_exclusions(exclusions));
        if let Some(turnover) = turnover {
            output.push_str(&Self::format_turnover(turnover));
        }
        output
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(max_chars - 1).collect();
        cut.push('…');
        cut
    }
}
