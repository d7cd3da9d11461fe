use super::var::{monte_carlo_var, SimulationParams};
use crate::error::{BenchError, Result};
use crate::metrics::ProcessId;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// What a worker process prints on stdout when it finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub var: f64,
}

/// Runs the kernel in the current process. This is the body of `varbench worker`.
pub fn run_worker(params: &SimulationParams, seed: Option<u64>) -> WorkerResult {
    let var = match seed {
        Some(seed) => monte_carlo_var(params, &mut StdRng::seed_from_u64(seed)),
        None => monte_carlo_var(params, &mut rand::rng()),
    };
    WorkerResult { var }
}

/// Command-line arguments that make `varbench worker` reproduce `params`.
pub fn worker_args(params: &SimulationParams, seed: Option<u64>) -> Vec<String> {
    let mut args = vec![
        "worker".to_string(),
        format!("--simulations={}", params.num_simulations),
        format!("--days={}", params.num_days),
        format!("--initial-price={}", params.initial_price),
        format!("--volatility={}", params.daily_volatility),
        format!("--confidence={}", params.confidence_level),
    ];
    if params.materialize_paths {
        args.push("--materialize-paths".to_string());
    }
    if let Some(seed) = seed {
        args.push(format!("--seed={}", seed));
    }
    args
}

struct Worker {
    index: usize,
    child: Child,
}

impl Worker {
    fn finish(self) -> Result<WorkerResult> {
        let index = self.index;
        let failed = |reason: String| BenchError::Worker { index, reason };

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(format!("exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| failed("produced no result".to_string()))?;
        serde_json::from_str(line).map_err(|e| failed(format!("printed an invalid result: {}", e)))
    }
}

/// A batch of worker processes each running the kernel once.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Launches `count` copies of `program worker ...`.
    ///
    /// Workers already started are killed if a later one fails to spawn.
    pub fn spawn(program: &Path, count: usize, params: &SimulationParams) -> Result<Self> {
        let mut pool = WorkerPool {
            workers: Vec::with_capacity(count),
        };

        for index in 0..count {
            let spawned = Command::new(program)
                .args(worker_args(params, None))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn();
            match spawned {
                Ok(child) => {
                    debug!("Spawned worker {} as process {}", index, child.id());
                    pool.workers.push(Worker { index, child });
                }
                Err(e) => {
                    pool.kill();
                    return Err(BenchError::Worker {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Started {} worker processes", count);
        Ok(pool)
    }

    pub fn pids(&self) -> Vec<ProcessId> {
        self.workers
            .iter()
            .map(|w| ProcessId::new(w.child.id()))
            .collect()
    }

    /// Waits for every worker and returns their results in spawn order.
    ///
    /// The first worker that fails ends the join; the ones not yet collected
    /// are killed when the pool drops.
    pub fn join(mut self) -> Result<Vec<WorkerResult>> {
        let mut results = Vec::with_capacity(self.workers.len());
        while !self.workers.is_empty() {
            let worker = self.workers.remove(0);
            results.push(worker.finish()?);
        }
        Ok(results)
    }

    fn kill(&mut self) {
        for worker in &mut self.workers {
            if let Err(e) = worker.child.kill() {
                warn!("Failed to kill worker {}: {}", worker.index, e);
            }
            let _ = worker.child.wait();
        }
        self.workers.clear();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            warn!("Killing {} unfinished workers", self.workers.len());
            self.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    // The first worker to start prints `output`; the others sleep.
    fn racing_workers(dir: &Path, output: &str) -> PathBuf {
        let script = dir.join("worker.sh");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nif mkdir '{}/first' 2>/dev/null; then echo '{}'; else sleep 10; echo '{{\"var\":1.0}}'; fi\n",
                dir.display(),
                output
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn worker_args_round_trip_through_flags() {
        let params = SimulationParams {
            num_simulations: 10,
            num_days: 3,
            initial_price: 50.5,
            daily_volatility: 0.02,
            confidence_level: 0.99,
            materialize_paths: true,
        };
        let args = worker_args(&params, Some(9));

        assert_eq!(args[0], "worker");
        assert!(args.contains(&"--simulations=10".to_string()));
        assert!(args.contains(&"--initial-price=50.5".to_string()));
        assert!(args.contains(&"--confidence=0.99".to_string()));
        assert!(args.contains(&"--materialize-paths".to_string()));
        assert_eq!(args.last().unwrap(), "--seed=9");
    }

    #[test]
    fn seeded_worker_is_reproducible() {
        let params = SimulationParams {
            num_simulations: 500,
            num_days: 5,
            ..Default::default()
        };
        assert_eq!(run_worker(&params, Some(3)), run_worker(&params, Some(3)));
    }

    #[test]
    fn worker_result_is_one_json_line() {
        let line = serde_json::to_string(&WorkerResult { var: 1.5 }).unwrap();
        assert_eq!(line, r#"{"var":1.5}"#);
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let err = WorkerPool::spawn(
            Path::new("/nonexistent/varbench"),
            2,
            &SimulationParams::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, BenchError::Worker { index: 0, .. }));
    }

    #[test]
    fn invalid_output_fails_and_kills_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let script = racing_workers(dir.path(), "garbage");

        let pool = WorkerPool::spawn(&script, 2, &SimulationParams::default()).unwrap();
        let pids = pool.pids();
        let err = pool.join().unwrap_err();

        match err {
            BenchError::Worker { reason, .. } => assert!(reason.contains("invalid result"), "{reason}"),
            other => panic!("unexpected error {other}"),
        }
        for pid in pids {
            assert!(!Path::new(&format!("/proc/{}", pid)).exists(), "worker {pid} outlived the join");
        }
    }

    #[test]
    fn silent_worker_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("worker.sh");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let pool = WorkerPool::spawn(&script, 1, &SimulationParams::default()).unwrap();
        let err = pool.join().unwrap_err();
        assert!(matches!(err, BenchError::Worker { index: 0, .. }));
        assert!(err.to_string().contains("produced no result"));
    }
}
