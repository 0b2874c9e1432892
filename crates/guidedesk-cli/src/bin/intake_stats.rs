use anyhow::Result;
use clap::{Parser, ValueEnum};
use guidedesk_core::models::{ComplexityBand, IntakeStats, IntakeStatus};

use guidedesk_cli::api_client::ApiClient;
use guidedesk_cli::init_tracing;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[derive(Parser, Debug)]
#[command(name = "intake_stats")]
#[command(about = "Show dashboard counters for intakes")]
struct Args {
    /// Output format: json or table (default: table)
    #[arg(long, value_enum, default_value = "table")]
    format: Format,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let client = ApiClient::from_env()?;
    let stats = client.intake_stats().await?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        Format::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &IntakeStats) {
    println!("\n=== Intake Statistics ===\n");
    println!("Total intakes:   {}", stats.total);
    println!("Received recently: {}", stats.recent_count);

    println!("\n--- By Status ---");
    for status in IntakeStatus::ALL {
        let count = stats.by_status.get(status.as_str()).copied().unwrap_or(0);
        println!("{:<26} {:>6}", status.as_str(), count);
    }

    println!("\n--- By Complexity ---");
    for band in ComplexityBand::ALL {
        let count = stats.by_complexity.get(band.as_str()).copied().unwrap_or(0);
        println!("{:<26} {:>6}", band.as_str(), count);
    }

    println!();
}
