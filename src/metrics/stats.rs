use super::{Sample, TimeSeries};
use serde::Serialize;

/// Samples dropped from the front of a series before summarizing.
pub const DEFAULT_WARMUP: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub avg_cpu: f64,
    pub avg_memory: f64,
    pub peak_cpu: f64,
    pub min_cpu: f64,
    pub peak_memory: f64,
    /// Number of samples the figures were computed over
    pub samples: usize,
}

/// Summarizes `series` after discarding `warmup` leading samples.
///
/// Short series are used whole, and an empty series yields all-zero stats.
pub fn summarize(series: &TimeSeries, warmup: usize) -> SummaryStats {
    summarize_samples(series.after_warmup(warmup))
}

fn summarize_samples(samples: &[Sample]) -> SummaryStats {
    let Some(first) = samples.first() else {
        return SummaryStats::default();
    };

    let count = samples.len() as f64;
    let mut stats = SummaryStats {
        peak_cpu: first.cpu_total,
        min_cpu: first.cpu_total,
        peak_memory: first.memory_total,
        samples: samples.len(),
        ..Default::default()
    };
    let (cpu_sum, memory_sum) = samples.iter().fold((0.0, 0.0), |(cpu, mem), s| {
        stats.peak_cpu = stats.peak_cpu.max(s.cpu_total);
        stats.min_cpu = stats.min_cpu.min(s.cpu_total);
        stats.peak_memory = stats.peak_memory.max(s.memory_total);
        (cpu + s.cpu_total, mem + s.memory_total)
    });
    stats.avg_cpu = cpu_sum / count;
    stats.avg_memory = memory_sum / count;
    stats
}
