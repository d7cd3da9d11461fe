use std::time::Duration;

/// Aggregate resource usage of every tracked process at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    /// Time since the monitor started
    pub timestamp: Duration,
    /// Sum of CPU percentages, may exceed 100 on multi-core machines
    pub cpu_total: f64,
    /// Sum of resident memory in MiB
    pub memory_total: f64,
}

/// Append-only, chronologically ordered samples of one monitoring session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        debug_assert!(
            self.samples
                .last()
                .map_or(true, |last| last.timestamp < sample.timestamp),
            "samples must be appended in chronological order"
        );
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Samples remaining after dropping the first `skip`, or all of them when
    /// the series is not longer than `skip`.
    pub fn after_warmup(&self, skip: usize) -> &[Sample] {
        if self.samples.len() > skip {
            &self.samples[skip..]
        } else {
            &self.samples
        }
    }

    pub fn timestamps_secs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp.as_secs_f64()).collect()
    }

    pub fn cpu_history(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.cpu_total).collect()
    }

    pub fn memory_history(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.memory_total).collect()
    }
}

impl FromIterator<Sample> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        let mut series = TimeSeries::new();
        for sample in iter {
            series.push(sample);
        }
        series
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
