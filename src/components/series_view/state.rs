use crate::metrics::{summarize, SummaryStats, TimeSeries};

/// A finished monitoring session ready to be plotted
#[derive(Debug, Clone, Default)]
pub struct SeriesView {
    pub title: String,
    pub series: TimeSeries,
    pub summary: SummaryStats,
    pub warmup: usize,
}

impl SeriesView {
    pub fn new(title: impl Into<String>, series: TimeSeries, warmup: usize) -> Self {
        let summary = summarize(&series, warmup);
        Self {
            title: title.into(),
            series,
            summary,
            warmup,
        }
    }
}
