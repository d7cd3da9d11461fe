#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod workload;
pub use app::{show_plot, SeriesViewerApp};
pub use metrics::{MonitorConfig, ProcessId, ResourceMonitor, SummaryStats, TimeSeries};
