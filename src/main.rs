use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use replay_rust::config::{ReplayConfigBuilder, DEFAULT_BATCH_CAPACITY};
use replay_rust::pipeline::Orchestrator;
use replay_rust::record::{TaxiFare, TaxiRide};
use replay_rust::sink::HttpSink;
use replay_rust::source::collect_source_files;

const RIDE_SEED: u64 = 100;
const FARE_SEED: u64 = 200;

#[derive(Parser, Debug)]
#[command(version, about = "Replays historical taxi trip records into a message-ingestion endpoint", long_about = None)]
struct Args {
    /// Directory holding trip_data_* and trip_fare_* source files
    #[arg(long, env = "RIDE_DATA_FILE_PATH")]
    data_dir: PathBuf,

    /// Ingestion endpoint for ride records
    #[arg(long, env = "RIDE_EVENT_HUB")]
    ride_endpoint: String,

    /// Ingestion endpoint for fare records
    #[arg(long, env = "FARE_EVENT_HUB")]
    fare_endpoint: String,

    /// Stop after this many seconds; 0 runs until the sources are exhausted
    #[arg(long, env = "SECONDS_TO_RUN", default_value_t = 0)]
    seconds_to_run: u64,

    /// Maximum batch size in bytes
    #[arg(long, default_value_t = DEFAULT_BATCH_CAPACITY)]
    batch_capacity: usize,

    /// Lower bound of the randomized inter-batch delay, in milliseconds
    #[arg(long, default_value_t = 100)]
    min_delay_ms: u64,

    /// Upper bound of the randomized inter-batch delay, in milliseconds
    #[arg(long, default_value_t = 1000)]
    max_delay_ms: u64,

    /// Emit progress lines every this many batches
    #[arg(long, default_value_t = 10)]
    progress_interval: usize,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let run_for = match args.seconds_to_run {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let config = ReplayConfigBuilder::default()
        .batch_capacity(args.batch_capacity)
        .min_delay_ms(args.min_delay_ms)
        .max_delay_ms(args.max_delay_ms)
        .progress_interval(args.progress_interval)
        .run_for(run_for)
        .build()?;

    let ride_files = collect_source_files(&args.data_dir, "trip_data")?;
    let fare_files = collect_source_files(&args.data_dir, "trip_fare")?;
    log::info!(
        "found {} ride and {} fare source files in {}",
        ride_files.len(),
        fare_files.len(),
        args.data_dir.display()
    );

    let ride_sink = Arc::new(HttpSink::new(&args.ride_endpoint)?);
    let fare_sink = Arc::new(HttpSink::new(&args.fare_endpoint)?);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, cancelling data generation");
            interrupt.cancel();
        }
    });

    let mut orchestrator = Orchestrator::new(Arc::new(config));
    orchestrator.add_replay::<TaxiRide>(ride_files, ride_sink, RIDE_SEED);
    orchestrator.add_replay::<TaxiFare>(fare_files, fare_sink, FARE_SEED);

    let outcomes = orchestrator.run_all(&cancel).await;

    let mut failed = false;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => log::info!(
                "{}: {} lines, {} batches{}",
                outcome.name,
                summary.lines_read,
                summary.batches_sent,
                if summary.cancelled { " (cancelled)" } else { "" }
            ),
            Err(e) => {
                log::error!("{e}");
                failed = true;
            }
        }
    }

    if failed {
        return Err("one or more replays failed".into());
    }

    println!("Data generation complete");
    Ok(())
}
