//! queuebench CLI: drive a work queue with many concurrent workers.

use clap::{Parser, ValueEnum};
use queuebench::config::{Config, parse_worker_count};
use queuebench::engine;
use queuebench::model::Variant;
use queuebench::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(
    name = "queuebench",
    about = "Drive an in-memory work queue with many concurrent workers"
)]
struct Cli {
    /// Number of workers to run (raised to 100 if lower)
    #[arg(allow_negative_numbers = true)]
    workers: Option<String>,

    /// Queue shape to drive
    #[arg(long, value_enum, default_value_t = VariantArg::List)]
    variant: VariantArg,

    /// Print the run reports as one JSON array on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    List,
    Channel,
    Both,
}

impl VariantArg {
    fn variants(self) -> &'static [Variant] {
        match self {
            VariantArg::List => &[Variant::List],
            VariantArg::Channel => &[Variant::Channel],
            VariantArg::Both => &[Variant::List, Variant::Channel],
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let guard = init_telemetry(TelemetryConfig::from(&config))?;

    let workers = parse_worker_count(cli.workers.as_deref())?;

    let mut reports = Vec::with_capacity(2);
    for &variant in cli.variant.variants() {
        reports.push(engine::run(variant, workers).await?);
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    guard.force_flush();
    Ok(())
}
