use clap::{Parser, ValueEnum};
use pi_blocks::config::{parse_worker_count, DEFAULT_BLOCK_SIZE, DEFAULT_ITERATIONS};
use pi_blocks::{estimate_pi, estimate_pi_async, Estimate, Result, RunConfig};
use std::io::{self, BufRead, Write};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Runtime {
    /// One OS thread per worker
    Threads,
    /// Workers on tokio's blocking pool, async controller
    Tokio,
}

/// Estimate pi by integrating 4/(1+x^2) over dynamically scheduled blocks
#[derive(Parser, Debug)]
#[command(name = "pi_blocks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Args {
    /// Number of workers; prompted for on stdin when omitted
    #[arg(short, long)]
    workers: Option<usize>,

    /// Total integration steps
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u64,

    /// Steps per block
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    #[arg(long, value_enum, default_value_t = Runtime::Threads)]
    runtime: Runtime,

    /// Decimal digits to print; defaults to the exact expansion of the f64
    #[arg(long)]
    precision: Option<usize>,
}

fn read_worker_count() -> Result<usize> {
    let mut stdout = io::stdout();
    writeln!(stdout, "Enter number of threads")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_worker_count(&line)
}

fn run(args: &Args) -> Result<Estimate> {
    let workers = match args.workers {
        Some(workers) => workers,
        None => read_worker_count()?,
    };
    let config = RunConfig::new(workers)
        .with_iterations(args.iterations)
        .with_block_size(args.block_size);
    config.validate()?;

    info!(
        workers = config.workers,
        iterations = config.iterations,
        blocks = config.layout().total_blocks(),
        runtime = ?args.runtime,
        "starting"
    );

    match args.runtime {
        Runtime::Threads => estimate_pi(config),
        Runtime::Tokio => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(estimate_pi_async(config))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pi_blocks=warn".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(estimate) => match args.precision {
            Some(digits) => println!("{:.*}", digits, estimate),
            None => println!("{}", estimate),
        },
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
