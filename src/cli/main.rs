use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use donor_roster::models::{PageResult, SortDirection, SortField};
use donor_roster::state::load_seed_file;
use reqwest::Client;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "donor-roster-cli")]
#[command(about = "Donor roster CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "DONOR_ROSTER_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of the donor roster
    Donors {
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short = 's', long)]
        page_size: Option<u32>,

        /// Case-insensitive search across names and email
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short = 'f', long)]
        sort_field: Option<SortField>,

        #[arg(short = 'd', long)]
        sort_direction: Option<SortDirection>,

        /// Print a compact table instead of JSON
        #[arg(short, long)]
        table: bool,
    },

    /// Check server health
    Health,

    /// Parse a seed fixture and report what it contains
    CheckSeed {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Donors {
            page,
            page_size,
            query,
            sort_field,
            sort_direction,
            table,
        } => {
            let mut params: Vec<(&str, String)> = vec![("page", page.to_string())];
            if let Some(page_size) = page_size {
                params.push(("page_size", page_size.to_string()));
            }
            if let Some(query) = query {
                params.push(("search", query));
            }
            if let Some(field) = sort_field {
                params.push(("sort_field", field.to_string()));
            }
            if let Some(direction) = sort_direction {
                params.push(("sort_direction", direction.to_string()));
            }

            let response = client
                .get(format!("{}/v1/donors", cli.endpoint))
                .query(&params)
                .send()
                .await
                .context("request to roster server failed")?;

            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            if !status.is_success() {
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
                bail!("server returned {}", status);
            }

            if table {
                let page: PageResult = serde_json::from_value(body)?;
                print_table(&page);
            } else {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::CheckSeed { path } => {
            let seed = load_seed_file(&path)
                .with_context(|| format!("failed to load seed file {}", path.display()))?;

            let orphans = seed
                .pledge_counts
                .keys()
                .chain(seed.pledge_totals.keys())
                .filter(|id| !seed.donors.iter().any(|d| &d.id == *id))
                .count();

            println!("donors:        {}", seed.donors.len());
            println!("pledge counts: {}", seed.pledge_counts.len());
            println!("pledge totals: {}", seed.pledge_totals.len());
            if orphans > 0 {
                println!("warning: {} statistic rows have no matching donor", orphans);
            }
        }
    }

    Ok(())
}

fn print_table(page: &PageResult) {
    println!(
        "{:<38} {:<32} {:>8} {:>14}",
        "ID", "EMAIL", "PLEDGES", "TOTAL"
    );
    for row in &page.items {
        println!(
            "{:<38} {:<32} {:>8} {:>14}",
            row.id(),
            row.email(),
            row.pledge_count,
            row.total_donated
        );
    }
    println!(
        "page {}/{} ({} donors)",
        page.page, page.total_pages, page.total_count
    );
    if page.is_degraded() {
        let sources: Vec<String> = page.degraded_sources.iter().map(|s| s.to_string()).collect();
        println!("statistics unavailable: {}", sources.join(", "));
    }
}
