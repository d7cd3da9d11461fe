use super::process::{ProcessId, ProcessProbe, SampleAggregator, SysinfoProbe};
use super::stats::{summarize, SummaryStats, DEFAULT_WARMUP};
use super::TimeSeries;
use crate::error::MonitorError;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Sleep between two sampling passes
    pub sampling_period: Duration,
    /// Window over which each process' CPU percentage is measured
    pub settle_delay: Duration,
    /// Leading samples ignored by [`ResourceMonitor::summary`]
    pub warmup: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sampling_period: Duration::from_millis(100),
            settle_delay: Duration::from_millis(100),
            warmup: DEFAULT_WARMUP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Default)]
struct TrackedSet {
    live: HashSet<ProcessId>,
    /// Ids a probe reported gone; never tracked again.
    retired: HashSet<ProcessId>,
}

impl TrackedSet {
    fn insert(&mut self, pid: ProcessId) -> bool {
        !self.retired.contains(&pid) && self.live.insert(pid)
    }

    fn retire(&mut self, pid: ProcessId) {
        self.live.remove(&pid);
        self.retired.insert(pid);
    }
}

// Every critical section is a single insert/remove/clone, so the set is
// consistent even if a holder panicked.
fn lock(tracked: &Mutex<TrackedSet>) -> MutexGuard<'_, TrackedSet> {
    tracked.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle for registering processes from other threads.
#[derive(Debug, Clone)]
pub struct ProcessRegistrar {
    tracked: Arc<Mutex<TrackedSet>>,
}

impl ProcessRegistrar {
    /// Starts tracking `pid`. Returns false when it was already tracked or has
    /// already been reported gone.
    pub fn add_process_id(&self, pid: ProcessId) -> bool {
        let added = lock(&self.tracked).insert(pid);
        if added {
            info!("Added process {} to monitoring", pid);
        } else {
            debug!("Process {} is already known to the monitor", pid);
        }
        added
    }
}

/// Samples the combined CPU and memory usage of a growing set of processes.
///
/// A monitor measures exactly one session: `Idle -> Running -> Stopped`.
/// Processes can be registered in any state; the collected [`TimeSeries`]
/// becomes readable once [`stop`](Self::stop) has joined the sampling thread.
pub struct ResourceMonitor<P = SysinfoProbe> {
    config: MonitorConfig,
    state: MonitorState,
    registrar: ProcessRegistrar,
    shutdown: Arc<AtomicBool>,
    probe: Option<P>,
    sampler: Option<JoinHandle<TimeSeries>>,
    series: TimeSeries,
}

impl ResourceMonitor<SysinfoProbe> {
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_probe(config, SysinfoProbe::new(config.settle_delay))
    }
}

impl Default for ResourceMonitor<SysinfoProbe> {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl<P> ResourceMonitor<P>
where
    P: ProcessProbe + Send + 'static,
{
    pub fn with_probe(mut config: MonitorConfig, probe: P) -> Self {
        if config.sampling_period.is_zero() {
            warn!("Sampling period of zero requested, using 1ms");
            config.sampling_period = Duration::from_millis(1);
        }
        Self {
            config,
            state: MonitorState::Idle,
            registrar: ProcessRegistrar {
                tracked: Arc::new(Mutex::new(TrackedSet::default())),
            },
            shutdown: Arc::new(AtomicBool::new(false)),
            probe: Some(probe),
            sampler: None,
            series: TimeSeries::new(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Spawns the sampling thread.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        match self.state {
            MonitorState::Running => return Err(MonitorError::AlreadyStarted),
            MonitorState::Stopped => return Err(MonitorError::Finished),
            MonitorState::Idle => {}
        }
        let probe = self.probe.take().ok_or(MonitorError::Finished)?;

        let sampler = Sampler {
            probe,
            tracked: Arc::clone(&self.registrar.tracked),
            shutdown: Arc::clone(&self.shutdown),
            period: self.config.sampling_period,
        };
        let handle = thread::Builder::new()
            .name("resource-sampler".into())
            .spawn(move || sampler.run(Instant::now()))
            .map_err(MonitorError::Spawn)?;

        self.sampler = Some(handle);
        self.state = MonitorState::Running;
        info!(
            "Resource monitor started (period {:?}, settle {:?})",
            self.config.sampling_period, self.config.settle_delay
        );
        Ok(())
    }

    /// Signals the sampling thread and waits for it to exit.
    ///
    /// No-op unless running. Once this returns, neither the series nor the
    /// tracked set is touched by the sampler again.
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        if self.state != MonitorState::Running {
            return Ok(());
        }
        self.shutdown.store(true, Ordering::Release);
        self.state = MonitorState::Stopped;

        let handle = self.sampler.take().ok_or(MonitorError::SamplerPanicked)?;
        self.series = handle.join().map_err(|_| MonitorError::SamplerPanicked)?;
        info!(
            "Resource monitor stopped after {} samples",
            self.series.len()
        );
        Ok(())
    }

    pub fn add_process_id(&self, pid: ProcessId) -> bool {
        self.registrar.add_process_id(pid)
    }

    pub fn registrar(&self) -> ProcessRegistrar {
        self.registrar.clone()
    }

    /// Snapshot of the processes currently believed alive.
    pub fn tracked_ids(&self) -> HashSet<ProcessId> {
        lock(&self.registrar.tracked).live.clone()
    }

    /// Samples collected by a stopped monitor; empty before that.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(mut self) -> TimeSeries {
        std::mem::take(&mut self.series)
    }

    /// Summary over the collected series using the configured warm-up.
    pub fn summary(&self) -> SummaryStats {
        summarize(&self.series, self.config.warmup)
    }
}

impl<P> Drop for ResourceMonitor<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.sampler.take() {
            self.shutdown.store(true, Ordering::Release);
            if handle.join().is_err() {
                warn!("Sampling thread panicked during shutdown");
            }
        }
    }
}

struct Sampler<P> {
    probe: P,
    tracked: Arc<Mutex<TrackedSet>>,
    shutdown: Arc<AtomicBool>,
    period: Duration,
}

impl<P: ProcessProbe> Sampler<P> {
    fn run(mut self, started: Instant) -> TimeSeries {
        let aggregator = SampleAggregator::new(started);
        let mut series = TimeSeries::new();

        while !self.shutdown.load(Ordering::Acquire) {
            thread::sleep(self.period);

            let snapshot: Vec<ProcessId> = lock(&self.tracked).live.iter().copied().collect();
            let (sample, removed) = aggregator.aggregate(&snapshot, &mut self.probe);
            if !removed.is_empty() {
                let mut tracked = lock(&self.tracked);
                for pid in removed {
                    info!("Process {} is gone, no longer monitoring it", pid);
                    tracked.retire(pid);
                }
            }

            debug!(
                "Sample at {:?}: {} processes, {:.1}% CPU, {:.1} MB",
                sample.timestamp,
                snapshot.len(),
                sample.cpu_total,
                sample.memory_total
            );
            series.push(sample);
        }

        series
    }
}
