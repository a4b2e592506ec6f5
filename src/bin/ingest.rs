use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};

use origin_index::rib::config::{
    DEFAULT_MAX_PREFIX_LEN, DEFAULT_MIN_PREFIX_LEN, DEFAULT_PROGRESS_INTERVAL,
};
use origin_index::rib::engine::IngestEnd;
use origin_index::{RoutingEngine, StoreConfig};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Event file to read. Reads from stdin if absent.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Shortest prefix length to index
    #[arg(long, default_value_t = DEFAULT_MIN_PREFIX_LEN)]
    min_len: u8,

    /// Longest prefix length to index
    #[arg(long, default_value_t = DEFAULT_MAX_PREFIX_LEN)]
    max_len: u8,

    /// Route updates per neighbor between progress lines, 0 to disable
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// Log every address lookup
    #[arg(long, default_value_t = false)]
    trace_lookups: bool,

    /// Seconds between neighbor status listings in the log, 0 to disable
    #[arg(long, default_value_t = 60)]
    status_interval: u64,

    /// Print the final neighbor listing and counters as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log debug messages, unless RUST_LOG says otherwise
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level),
    )
    .init();
}

fn log_status(engine: &RoutingEngine) {
    match engine.list_neighbors() {
        Ok(listing) => {
            for row in listing {
                info!("status: {}", row);
            }
        }
        Err(err) => error!("{}", err),
    }
}

fn print_summary(
    engine: &RoutingEngine,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let listing = engine.list_neighbors()?;
    let stats = engine.stats();

    if json {
        let out = serde_json::json!({
            "neighbors": listing,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("address\tstate\tupdates\tprefixes\tasns");
        for row in listing {
            println!("{}", row);
        }
        println!();
        print!("{}", stats);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logger(args.verbose);

    if args.min_len > args.max_len || args.max_len > 32 {
        error!(
            "invalid prefix length range {}-{}",
            args.min_len, args.max_len
        );
        std::process::exit(2);
    }

    let config = StoreConfig {
        min_prefix_len: args.min_len,
        max_prefix_len: args.max_len,
        progress_interval: args.progress_interval,
        trace_lookups: args.trace_lookups,
    };
    let engine = Arc::new(RoutingEngine::new(config));

    let reader: Box<dyn BufRead + Send> = match &args.input {
        Some(path) => {
            info!("reading events from {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            info!("reading events from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let start = Instant::now();
    let handle = engine.spawn_ingest(reader)?;

    let status_interval = Duration::from_secs(args.status_interval);
    let mut last_status = Instant::now();
    while !handle.is_finished() {
        std::thread::sleep(Duration::from_millis(100));
        if !status_interval.is_zero() && last_status.elapsed() >= status_interval
        {
            log_status(&engine);
            last_status = Instant::now();
        }
    }

    let res = match handle.join() {
        Ok(res) => res,
        Err(_) => {
            error!("ingest thread panicked");
            std::process::exit(1);
        }
    };

    match res {
        Ok(IngestEnd::Shutdown) => info!("stopped by shutdown token"),
        Ok(IngestEnd::EndOfStream) => info!("stopped at end of input"),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }
    info!("ingest took {} msecs", start.elapsed().as_millis());

    print_summary(&engine, args.json)
}
