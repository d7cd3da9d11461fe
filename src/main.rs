//! varbench entry point.
//!
//! `run` benchmarks the Monte Carlo VaR workload across worker processes while
//! sampling their resource usage; `worker` is what each of those processes runs.

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use varbench::components::series_view::SeriesView;
use varbench::config::BenchConfig;
use varbench::error::Result;
use varbench::metrics::process::find_descendants;
use varbench::metrics::{ProcessId, ResourceMonitor};
use varbench::report::BenchReport;
use varbench::workload::{run_worker, SimulationParams, WorkerPool};

// Workers need a moment to start before their own children show up.
const DISCOVERY_DELAY: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "varbench")]
#[command(
    version,
    about = "Benchmark a Monte Carlo VaR workload while monitoring CPU and memory",
    after_help = "EXAMPLES:
    varbench run --processes 4
    varbench run --processes 8 --plot
    varbench run --config bench.toml --period-ms 50
    varbench run --processes 2 --materialize-paths --simulations 100000
    RUST_LOG=debug varbench run --processes 2 --simulations 100000"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark and report resource usage
    Run(RunArgs),

    /// Run the simulation once and print the result as JSON
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Number of worker processes to launch
    #[arg(short, long)]
    processes: Option<usize>,

    /// TOML file with benchmark settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling period in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// CPU measurement window per process in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Leading samples excluded from the summary
    #[arg(long)]
    warmup: Option<usize>,

    /// Simulated price paths per worker
    #[arg(long)]
    simulations: Option<usize>,

    /// Trading days per path
    #[arg(long)]
    days: Option<usize>,

    /// Keep every simulated price path in memory, as a vectorised kernel would
    #[arg(long)]
    materialize_paths: bool,

    /// Open a window with CPU and memory plots after the run
    #[arg(long)]
    plot: bool,
}

impl RunArgs {
    fn into_config(self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };

        match self.processes {
            Some(processes) => config.processes = processes,
            None if self.config.is_none() => {
                warn!("No process count given, running a single worker");
            }
            None => {}
        }
        if config.processes == 0 {
            warn!("Process count must be at least 1, running a single worker");
            config.processes = 1;
        }

        if let Some(period_ms) = self.period_ms {
            config.monitor.period_ms = period_ms;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.monitor.settle_ms = settle_ms;
        }
        if let Some(warmup) = self.warmup {
            config.monitor.warmup = warmup;
        }
        if let Some(simulations) = self.simulations {
            config.simulation.num_simulations = simulations;
        }
        if let Some(days) = self.days {
            config.simulation.num_days = days;
        }
        config.simulation.materialize_paths |= self.materialize_paths;
        config.plot |= self.plot;
        Ok(config)
    }
}

#[derive(Args)]
struct WorkerArgs {
    #[arg(long)]
    simulations: usize,

    #[arg(long)]
    days: usize,

    #[arg(long)]
    initial_price: f64,

    #[arg(long)]
    volatility: f64,

    #[arg(long)]
    confidence: f64,

    #[arg(long)]
    materialize_paths: bool,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Run(args) => args.into_config().and_then(run),
        Commands::Worker(args) => worker(args),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: BenchConfig) -> Result<()> {
    let mut monitor = ResourceMonitor::new(config.monitor_config());
    let parent = ProcessId::current();
    monitor.add_process_id(parent);
    monitor.start()?;

    let started = Instant::now();
    let program = std::env::current_exe()?;
    let pool = WorkerPool::spawn(&program, config.processes, &config.simulation)?;
    for pid in pool.pids() {
        monitor.add_process_id(pid);
    }

    thread::sleep(DISCOVERY_DELAY);
    for pid in find_descendants(parent) {
        monitor.add_process_id(pid);
    }

    let results = pool.join();
    let elapsed = started.elapsed();
    monitor.stop()?;
    let results = results?;

    let report = BenchReport {
        processes: config.processes,
        results,
        elapsed,
        summary: monitor.summary(),
    };
    println!("\n{}", report);

    if config.plot {
        let warmup = config.monitor.warmup;
        let title = format!("{} worker processes", config.processes);
        info!("Opening plot viewer");
        varbench::show_plot(SeriesView::new(title, monitor.into_series(), warmup))?;
    }
    Ok(())
}

fn worker(args: WorkerArgs) -> Result<()> {
    let params = SimulationParams {
        num_simulations: args.simulations,
        num_days: args.days,
        initial_price: args.initial_price,
        daily_volatility: args.volatility,
        confidence_level: args.confidence,
        materialize_paths: args.materialize_paths,
    };
    let result = run_worker(&params, args.seed);
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
