//! Streaming pipeline simulator CLI.
//!
//! This binary drives the tick-accurate pipeline with synthetic traffic. It performs:
//! 1. **Setup:** Load an optional JSON config (defaults otherwise) and build the pipeline.
//! 2. **Traffic:** Offer records every `offer-period` ticks and poll for results every
//!    `consume-period` ticks after an initial `consume-delay`.
//! 3. **Report:** Check every result against the reference formula, then print
//!    results and statistics.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use streampipe_core::Simulator;
use streampipe_core::common::{InputRecord, OutputRecord};
use streampipe_core::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "Tick-accurate streaming pipeline simulator",
    long_about = "Stream records through a fixed-latency stage pipeline with credit-based admission.\n\nLogging is controlled with RUST_LOG (e.g. RUST_LOG=streampipe_core=trace).\n\nExamples:\n  pipesim run --records 1000\n  pipesim run --config pipe.json --consume-period 3 --stats admission,drain\n  pipesim run --records 64 --consume-delay 100 --print-results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream synthetic records through the pipeline.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// JSON configuration file (built-in defaults if omitted).
    #[arg(short, long)]
    config: Option<String>,

    /// Number of records to stream.
    #[arg(short = 'n', long, default_value_t = 256)]
    records: u64,

    /// Producer offers on every P-th tick.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    offer_period: u64,

    /// Consumer polls on every Q-th tick.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    consume_period: u64,

    /// Ticks before the consumer first polls.
    #[arg(long, default_value_t = 0)]
    consume_delay: u64,

    /// Stop after this many ticks even if records remain.
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Print every retrieved result.
    #[arg(long)]
    print_results: bool,

    /// Statistics sections to print (comma separated; all if empty).
    #[arg(
        long,
        num_args = 0..,
        value_delimiter = ',',
        value_parser = ["summary", "admission", "drain"]
    )]
    stats: Option<Vec<String>>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cmd_run(&args),
    }
}

/// Deterministic operands for record `n`.
fn synthetic_record(n: u64) -> InputRecord {
    let a = 1.0 + (n % 7) as f64 * 0.25;
    let b = (n % 101) as f64 * 0.5;
    let c = (n % 3) as f64;
    InputRecord::new(a, b, c)
}

/// Streams the requested traffic and reports; returns the process exit code.
fn cmd_run(args: &RunArgs) -> ExitCode {
    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let mut sim = match Simulator::new(&config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error building pipeline: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Configuration: {}",
        args.config.as_deref().unwrap_or("default")
    );
    println!(
        "  Depth: {}  Capacity: {}  Policy: {:?}",
        sim.pipeline().depth(),
        sim.pipeline().capacity(),
        config.pipeline.credit_policy
    );
    println!(
        "  Records: {}  Offer period: {}  Consume period: {}  Consume delay: {}",
        args.records, args.offer_period, args.consume_period, args.consume_delay
    );
    println!();

    let graph = sim.pipeline().graph().clone();
    let mut next = 0_u64;
    let mut results: Vec<OutputRecord> = Vec::new();

    while next < args.records || sim.in_flight() > 0 {
        let now = sim.now();
        if now >= args.max_ticks {
            eprintln!(
                "[!] Stopped after {} ticks: {} offered, {} retrieved, {} in flight",
                now,
                next,
                results.len(),
                sim.in_flight()
            );
            break;
        }

        if next < args.records && now % args.offer_period == 0 && sim.offer(synthetic_record(next))
        {
            next += 1;
        }
        if now >= args.consume_delay && (now - args.consume_delay) % args.consume_period == 0 {
            if let Some(result) = sim.consume() {
                results.push(result);
            }
        }
        if let Err(e) = sim.tick() {
            eprintln!("\n[!] FATAL: {e}");
            sim.stats().print();
            return ExitCode::FAILURE;
        }
    }

    let mut mismatches = 0_usize;
    for (expected_seq, result) in (0_u64..).zip(&results) {
        let record = synthetic_record(result.seq);
        let expected = graph.evaluate(&record.operands);
        let ok = result.seq == expected_seq && values_match(result.value, expected);
        if !ok {
            mismatches += 1;
            eprintln!(
                "[!] Result #{expected_seq}: got seq {} value {}, expected {expected}",
                result.seq, result.value
            );
        }
        if args.print_results {
            println!("{:>8}  {:>24.6}", result.seq, result.value);
        }
    }

    println!(
        "\n[*] Retrieved {} of {} records ({} mismatches)",
        results.len(),
        next,
        mismatches
    );
    if let Some(sections) = &args.stats {
        sim.stats().print_sections(sections);
    }

    if mismatches > 0 || results.len() as u64 != args.records {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Relative comparison; both sides are computed by the same operations.
fn values_match(got: f64, expected: f64) -> bool {
    let scale = expected.abs().max(1.0);
    (got - expected).abs() <= scale * 1e-12
}
