//! `quotagate`: run one reservation simulation and print the final chart.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quotagate::{LogWriter, SimulationConfig, Simulator, Subscribe, ThinkTime};

/// Simulate concurrent clerks booking seats on a fleet of trains.
#[derive(Parser, Debug)]
#[command(name = "quotagate", version, about)]
struct Args {
    /// Number of resources (trains).
    #[arg(long, default_value_t = 100)]
    resources: usize,

    /// Capacity of every resource (seats per train).
    #[arg(long, default_value_t = 500)]
    capacity: u32,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = 20)]
    workers: usize,

    /// Workers allowed inside the booking system at once.
    #[arg(long, default_value_t = 5)]
    gate: usize,

    /// Run duration in seconds.
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Smallest booking quantity.
    #[arg(long, default_value_t = 5)]
    book_min: u32,

    /// Largest booking quantity.
    #[arg(long, default_value_t = 10)]
    book_max: u32,

    /// Upper bound of the random pause before each operation, in ms (0 = no pause).
    #[arg(long, default_value_t = 500)]
    think_max_ms: u64,

    /// Base seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Log every gate wait and outcome (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Do not log individual events.
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            resource_count: self.resources,
            capacity_per_resource: self.capacity,
            worker_count: self.workers,
            gate_capacity: self.gate,
            run_duration: Duration::from_secs(self.duration_secs),
            book_min: self.book_min,
            book_max: self.book_max,
            think_time: ThinkTime::uniform_ms(self.think_max_ms),
            seed: self.seed,
            ..SimulationConfig::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let subs: Vec<Arc<dyn Subscribe>> = if args.quiet {
        Vec::new()
    } else {
        vec![Arc::new(LogWriter::new())]
    };

    let report = Simulator::builder(args.config())
        .with_subscribers(subs)
        .build()
        .context("invalid configuration")?
        .run()
        .await
        .context("simulation failed")?;

    let tally = report.tally();
    tracing::info!(
        seed = report.seed,
        operations = tally.total(),
        booked = tally.booked,
        rejected = tally.rejected,
        cancelled = tally.cancelled,
        peak_gate = report.peak_gate_occupancy,
        peak_locks = report.peak_lock_holders,
        stopped_early = report.stopped_early,
        "simulation complete"
    );
    println!("{report}");
    Ok(())
}
