mod aggregate;
mod probe;
mod tree;

pub use aggregate::*;
pub use probe::*;
pub use tree::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an OS process by its numeric pid.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    pub const fn new(pid: u32) -> Self {
        Self(pid)
    }

    /// The id of the calling process.
    pub fn current() -> Self {
        Self(std::process::id())
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn to_pid(&self) -> sysinfo::Pid {
        sysinfo::Pid::from_u32(self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl From<sysinfo::Pid> for ProcessId {
    fn from(pid: sysinfo::Pid) -> Self {
        Self(pid.as_u32())
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One interval measurement of a single process
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

impl Reading {
    pub fn new(cpu_percent: f64, memory_mb: f64) -> Self {
        Self {
            cpu_percent,
            memory_mb,
        }
    }
}
