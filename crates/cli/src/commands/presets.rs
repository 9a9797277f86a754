use satellite_core::{report_formatter::format_euro, StrategyConfig, StrategyPreset};

/// Table of every named preset and its parameters.
#[must_use]
pub fn format_presets() -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<14} {:<14} {:>8} {:>8} {:>8} {:>6} {:>12} {:>10}\n",
        "Preset", "Weights", "Monthly", "Buffer", "Slots", "SMA", "10M fallback", "Cost"
    ));
    output.push_str(&format!("{}\n", "-".repeat(88)));

    for preset in StrategyPreset::ALL {
        let c = StrategyConfig::preset(preset);
        let w = c.weights;
        output.push_str(&format!(
            "{:<14} {:<14} {:>8} {:>8} {:>8} {:>6} {:>12} {:>10}\n",
            preset.name(),
            format!(
                "{}/{}/{}/{}",
                w.one_month, w.three_months, w.six_months, w.ten_months
            ),
            c.min_monthly_points,
            c.stability_buffer,
            c.portfolio_slots,
            c.trend_window,
            if c.ten_month_fallback { "yes" } else { "no" },
            format_euro(c.trade_cost_estimate),
        ));
    }

    output
}

pub fn print_presets() {
    println!("\nStrategy presets (weights are 1M/3M/6M/10M)\n");
    print!("{}", format_presets());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_preset() {
        let table = format_presets();
        assert!(table.contains("standard       4/5/3/2"));
        assert!(table.contains("short-window   2/5/4/3"));
        assert_eq!(table.lines().count(), 2 + StrategyPreset::ALL.len());
    }
}
