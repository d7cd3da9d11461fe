use std::collections::{HashMap, HashSet};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use varbench::error::ProcessGone;
use varbench::metrics::{MonitorConfig, MonitorState, ProcessId, Reading, ResourceMonitor};

fn config(period_ms: u64) -> MonitorConfig {
    MonitorConfig {
        sampling_period: Duration::from_millis(period_ms),
        settle_delay: Duration::ZERO,
        warmup: 0,
    }
}

fn always_alive(_pid: ProcessId) -> Result<Reading, ProcessGone> {
    Ok(Reading::new(1.0, 1.0))
}

#[test]
fn concurrent_registrations_are_never_lost() {
    let mut monitor = ResourceMonitor::with_probe(config(1), always_alive);
    monitor.start().unwrap();

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let registrar = monitor.registrar();
            thread::spawn(move || {
                for i in 0..50u32 {
                    registrar.add_process_id(ProcessId::new(t * 1000 + i));
                    if i % 10 == 0 {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    thread::sleep(Duration::from_millis(10));
    monitor.stop().unwrap();

    let expected: HashSet<ProcessId> = (0..8u32)
        .flat_map(|t| (0..50u32).map(move |i| ProcessId::new(t * 1000 + i)))
        .collect();
    assert_eq!(monitor.tracked_ids(), expected);
    let last = monitor.series().samples().last().unwrap();
    assert_eq!(last.cpu_total, 400.0);
}

#[test]
fn gone_process_is_probed_only_once() {
    let calls: Arc<Mutex<HashMap<ProcessId, usize>>> = Arc::default();
    let dead = ProcessId::new(2);

    let probe_calls = Arc::clone(&calls);
    let mut monitor = ResourceMonitor::with_probe(config(2), move |pid: ProcessId| {
        *probe_calls.lock().unwrap().entry(pid).or_default() += 1;
        if pid == dead {
            Err(ProcessGone::NotFound(pid))
        } else {
            Ok(Reading::new(30.0, 15.0))
        }
    });
    monitor.add_process_id(ProcessId::new(1));
    monitor.add_process_id(dead);

    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    // Re-registering a retired id must not bring it back.
    monitor.add_process_id(dead);
    thread::sleep(Duration::from_millis(20));
    monitor.stop().unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[&dead], 1);
    assert!(calls[&ProcessId::new(1)] > 1);
    assert!(monitor
        .series()
        .samples()
        .iter()
        .skip(1)
        .all(|s| s.cpu_total == 30.0 && s.memory_total == 15.0));
}

#[test]
fn timestamps_are_period_spaced() {
    let period = Duration::from_millis(20);
    let mut monitor = ResourceMonitor::with_probe(config(20), always_alive);
    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(250));
    monitor.stop().unwrap();

    let samples = monitor.series().samples();
    assert!(samples.len() >= 5, "only {} samples", samples.len());
    assert!(samples[0].timestamp >= period);
    for pair in samples.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert!(gap >= period, "gap {gap:?} shorter than the period");
        assert!(gap < period * 10, "gap {gap:?} far beyond the period");
    }
}

#[test]
fn nothing_changes_after_stop() {
    let mut monitor = ResourceMonitor::with_probe(config(2), always_alive);
    monitor.add_process_id(ProcessId::new(5));
    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    monitor.stop().unwrap();
    assert_eq!(monitor.state(), MonitorState::Stopped);

    let len = monitor.series().len();
    let tracked = monitor.tracked_ids();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(monitor.series().len(), len);
    assert_eq!(monitor.tracked_ids(), tracked);
}

#[test]
fn monitors_real_processes() {
    let mut child = Command::new("sleep").arg("0.3").spawn().unwrap();
    let child_pid = ProcessId::new(child.id());

    let mut monitor = ResourceMonitor::new(MonitorConfig {
        sampling_period: Duration::from_millis(20),
        settle_delay: Duration::from_millis(20),
        warmup: 0,
    });
    monitor.add_process_id(ProcessId::current());
    monitor.add_process_id(child_pid);
    monitor.start().unwrap();

    thread::sleep(Duration::from_millis(100));
    assert!(monitor.tracked_ids().contains(&child_pid));

    child.wait().unwrap();
    thread::sleep(Duration::from_millis(200));
    monitor.stop().unwrap();

    assert_eq!(monitor.tracked_ids(), HashSet::from([ProcessId::current()]));
    let summary = monitor.summary();
    assert!(summary.samples > 0);
    assert!(summary.avg_memory > 0.0);
    assert!(summary.min_cpu >= 0.0);
}
