//! Descending score ranking and the rank-stability buffer.

use satellite_core::{InstrumentRef, MomentumMetrics, RankedInstrument};

/// Instruments ordered by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    entries: Vec<RankedInstrument>,
    buffer_size: usize,
}

impl Ranking {
    /// Sorts scored instruments by descending score. The sort is stable, so equal
    /// scores keep their input order.
    #[must_use]
    pub fn new(scored: Vec<(InstrumentRef, MomentumMetrics)>, buffer_size: usize) -> Self {
        let mut scored = scored;
        scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (instrument, metrics))| RankedInstrument {
                instrument,
                metrics,
                rank,
            })
            .collect();

        Self {
            entries,
            buffer_size,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RankedInstrument] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The top-K entries eligible for retention.
    #[must_use]
    pub fn stability_buffer(&self) -> &[RankedInstrument] {
        &self.entries[..self.buffer_size.min(self.entries.len())]
    }

    /// Looks up a ticker inside the stability buffer.
    #[must_use]
    pub fn buffer_entry(&self, ticker: &str) -> Option<&RankedInstrument> {
        self.stability_buffer().iter().find(|e| e.ticker() == ticker)
    }

    #[must_use]
    pub fn get(&self, ticker: &str) -> Option<&RankedInstrument> {
        self.entries.iter().find(|e| e.ticker() == ticker)
    }
}
