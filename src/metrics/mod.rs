mod history;
mod monitor;
pub mod process;
pub mod stats;

pub use history::{Sample, TimeSeries};
pub use monitor::{MonitorConfig, MonitorState, ProcessRegistrar, ResourceMonitor};
pub use process::{ProcessId, ProcessProbe, Reading, SampleAggregator, SysinfoProbe};
pub use stats::{summarize, SummaryStats};
