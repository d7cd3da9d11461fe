use super::{ProcessId, ProcessProbe};
use crate::metrics::Sample;
use log::debug;
use std::collections::HashSet;
use std::time::Instant;

/// Folds per-process readings into one aggregate sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleAggregator {
    started: Instant,
}

impl Default for SampleAggregator {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl SampleAggregator {
    /// Timestamps of produced samples are measured from `started`.
    pub fn new(started: Instant) -> Self {
        Self { started }
    }

    /// Probes every id once and sums the readings.
    ///
    /// Ids whose probe fails are left out of the totals and returned in the
    /// removed set. An empty `ids` still yields a (zero) sample for this slot.
    pub fn aggregate<'a, I, P>(&self, ids: I, probe: &mut P) -> (Sample, HashSet<ProcessId>)
    where
        I: IntoIterator<Item = &'a ProcessId>,
        P: ProcessProbe + ?Sized,
    {
        let timestamp = self.started.elapsed();
        let mut removed = HashSet::new();
        let (cpu_total, memory_total) = ids
            .into_iter()
            .fold((0.0, 0.0), |(cpu, mem), &pid| match probe.sample(pid) {
                Ok(reading) => (cpu + reading.cpu_percent, mem + reading.memory_mb),
                Err(gone) => {
                    debug!("Dropping {} (reported {}): {}", pid, gone.pid(), gone);
                    removed.insert(pid);
                    (cpu, mem)
                }
            });

        (
            Sample {
                timestamp,
                cpu_total,
                memory_total,
            },
            removed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessGone;
    use crate::metrics::Reading;
    use std::collections::HashMap;
    use std::thread;
    use std::time::Duration;

    fn scripted(readings: HashMap<ProcessId, Reading>) -> impl FnMut(ProcessId) -> Result<Reading, ProcessGone> {
        move |pid| readings.get(&pid).copied().ok_or(ProcessGone::NotFound(pid))
    }

    #[test]
    fn sums_all_live_processes() {
        let a = ProcessId::new(1);
        let b = ProcessId::new(2);
        let mut probe = scripted(HashMap::from([
            (a, Reading::new(20.0, 10.0)),
            (b, Reading::new(30.0, 15.0)),
        ]));

        let ids = HashSet::from([a, b]);
        let (sample, removed) = SampleAggregator::default().aggregate(&ids, &mut probe);

        assert_eq!(sample.cpu_total, 50.0);
        assert_eq!(sample.memory_total, 25.0);
        assert!(removed.is_empty());
    }

    #[test]
    fn gone_process_is_excluded_and_reported() {
        let a = ProcessId::new(1);
        let b = ProcessId::new(2);
        let mut probe = scripted(HashMap::from([(a, Reading::new(20.0, 10.0))]));

        let ids = HashSet::from([a, b]);
        let (sample, removed) = SampleAggregator::default().aggregate(&ids, &mut probe);

        assert_eq!(sample.cpu_total, 20.0);
        assert_eq!(sample.memory_total, 10.0);
        assert_eq!(removed, HashSet::from([b]));
    }

    #[test]
    fn one_failure_does_not_stop_the_pass() {
        let ids: Vec<ProcessId> = (1..=5).map(ProcessId::new).collect();
        let mut probed = Vec::new();
        let mut probe = |pid: ProcessId| {
            probed.push(pid);
            if pid.as_u32() == 2 {
                Err(ProcessGone::Zombie(pid))
            } else {
                Ok(Reading::new(1.0, 1.0))
            }
        };

        let (sample, removed) = SampleAggregator::default().aggregate(&ids, &mut probe);

        assert_eq!(probed, ids);
        assert_eq!(sample.cpu_total, 4.0);
        assert_eq!(removed, HashSet::from([ProcessId::new(2)]));
    }

    #[test]
    fn removal_is_keyed_by_the_probed_id() {
        let ids = HashSet::from([ProcessId::new(1)]);
        // A probe may name a different pid in its error than the one it was asked for.
        let mut probe = |pid: ProcessId| -> Result<Reading, ProcessGone> {
            Err(ProcessGone::NotFound(ProcessId::new(pid.as_u32() + 100)))
        };

        let (_, removed) = SampleAggregator::default().aggregate(&ids, &mut probe);

        assert_eq!(removed, HashSet::from([ProcessId::new(1)]));
    }

    #[test]
    fn empty_set_still_advances_time() {
        let aggregator = SampleAggregator::default();
        let mut probe = |pid: ProcessId| -> Result<Reading, ProcessGone> {
            panic!("no process should be probed, got {pid}")
        };

        let (first, _) = aggregator.aggregate(&HashSet::<ProcessId>::new(), &mut probe);
        thread::sleep(Duration::from_millis(5));
        let (second, removed) = aggregator.aggregate(&HashSet::<ProcessId>::new(), &mut probe);

        assert_eq!(second.cpu_total, 0.0);
        assert_eq!(second.memory_total, 0.0);
        assert!(removed.is_empty());
        assert!(second.timestamp > first.timestamp);
    }
}
