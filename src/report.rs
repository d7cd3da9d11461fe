use crate::metrics::SummaryStats;
use crate::workload::WorkerResult;
use std::fmt;
use std::time::Duration;

/// Outcome of one benchmark run, rendered as plain text by `Display`.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub processes: usize,
    pub results: Vec<WorkerResult>,
    pub elapsed: Duration,
    pub summary: SummaryStats,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parallel Simulation Results:")?;
        writeln!(f, "Number of processes: {}", self.processes)?;
        writeln!(f, "VaR results from each process:")?;
        for (i, result) in self.results.iter().enumerate() {
            writeln!(f, "Process {}: ${:.2}", i + 1, result.var)?;
        }

        writeln!(f)?;
        writeln!(f, "Performance Metrics:")?;
        writeln!(
            f,
            "Total execution time: {:.2} seconds",
            self.elapsed.as_secs_f64()
        )?;
        writeln!(
            f,
            "Average total memory usage: {:.1} MB",
            self.summary.avg_memory
        )?;
        writeln!(f, "Peak total memory usage: {:.1} MB", self.summary.peak_memory)?;

        writeln!(f)?;
        writeln!(f, "CPU Usage Pattern:")?;
        writeln!(f, "Average total CPU usage: {:.1}%", self.summary.avg_cpu)?;
        writeln!(f, "Peak CPU usage: {:.1}%", self.summary.peak_cpu)?;
        writeln!(f, "Minimum CPU usage: {:.1}%", self.summary.min_cpu)?;
        write!(f, "Samples used: {}", self.summary.samples)
    }
}
