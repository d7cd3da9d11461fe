use super::{ProcessId, Reading};
use crate::error::ProcessGone;
use std::thread;
use std::time::Duration;
use sysinfo::{Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

/// Source of per-process readings used by the sampling loop.
pub trait ProcessProbe {
    fn sample(&mut self, pid: ProcessId) -> Result<Reading, ProcessGone>;
}

impl<F> ProcessProbe for F
where
    F: FnMut(ProcessId) -> Result<Reading, ProcessGone>,
{
    fn sample(&mut self, pid: ProcessId) -> Result<Reading, ProcessGone> {
        self(pid)
    }
}

/// Reads CPU and resident memory of live OS processes through sysinfo.
///
/// CPU usage is measured over `settle_delay`: the process is refreshed, the
/// probe sleeps, and the second refresh yields the percentage for that window.
#[derive(Debug)]
pub struct SysinfoProbe {
    system: System,
    settle_delay: Duration,
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl SysinfoProbe {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            system: System::new(),
            settle_delay,
        }
    }

    fn refresh(&mut self, pid: ProcessId) -> Result<&Process, ProcessGone> {
        let target = [pid.to_pid()];
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&target),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let process = self
            .system
            .process(target[0])
            .ok_or(ProcessGone::NotFound(pid))?;
        match process.status() {
            ProcessStatus::Zombie | ProcessStatus::Dead => Err(ProcessGone::Zombie(pid)),
            _ => Ok(process),
        }
    }
}

impl ProcessProbe for SysinfoProbe {
    fn sample(&mut self, pid: ProcessId) -> Result<Reading, ProcessGone> {
        self.refresh(pid)?;
        thread::sleep(self.settle_delay);
        let process = self.refresh(pid)?;

        Ok(Reading {
            cpu_percent: process.cpu_usage() as f64,
            memory_mb: process.memory() as f64 / (1024.0 * 1024.0),
        })
    }
}
