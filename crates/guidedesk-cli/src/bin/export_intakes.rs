use anyhow::{Context, Result};
use clap::Parser;
use guidedesk_core::models::{ComplexityBand, IntakeStatus};
use guidedesk_core::{SortField, SortOrder};
use std::path::PathBuf;

use guidedesk_cli::api_client::ApiClient;
use guidedesk_cli::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "export_intakes")]
#[command(about = "Download the intake CSV export")]
struct Args {
    /// File to write; prints to stdout when omitted
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Status filter, repeatable (e.g. --status STARTED --status ROADBLOCK)
    #[arg(long, value_name = "STATUS")]
    status: Vec<IntakeStatus>,

    /// Complexity band filter, repeatable (Minimal, Low, Medium, High)
    #[arg(long, value_name = "BAND")]
    complexity_band: Vec<ComplexityBand>,

    /// Requestor name substring
    #[arg(long)]
    requestor_name: Option<String>,

    #[arg(long)]
    plan_year: Option<i32>,

    /// Sort field (default: dateReceived)
    #[arg(long, default_value = "dateReceived")]
    sort_by: SortField,

    /// asc or desc (default: desc)
    #[arg(long, default_value = "desc")]
    order: SortOrder,
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn build_query(args: &Args) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("sortBy", args.sort_by.to_string()),
        ("order", args.order.to_string()),
    ];
    if !args.status.is_empty() {
        query.push(("status", join(&args.status)));
    }
    if !args.complexity_band.is_empty() {
        query.push(("complexityBand", join(&args.complexity_band)));
    }
    if let Some(name) = &args.requestor_name {
        query.push(("requestorName", name.clone()));
    }
    if let Some(year) = args.plan_year {
        query.push(("planYear", year.to_string()));
    }
    query
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let client = ApiClient::from_env()?;

    let csv = client.export_csv(&build_query(&args)).await?;
    let rows = csv.lines().count().saturating_sub(1);

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, csv.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} intakes to {}", rows, path.display());
        }
        None => println!("{}", csv),
    }

    Ok(())
}
