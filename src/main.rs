mod client;
mod config;
mod directory;
mod enrich;
mod export;
mod extract;
mod records;
mod summarize;

use std::time::Instant;

use clap::Parser;

use crate::export::OutputRow;
use crate::summarize::{HfSummaryModel, TextSummarizer};

const SAMPLE_ROWS: usize = 15;

#[derive(Parser)]
#[command(
    name = "yc_directory",
    version,
    about = "YC startup directory scraper: companies, founders, summaries"
)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let _cli = Cli::parse();

    let cfg = config::load();
    let client = client::YcClient::new(&cfg)?;

    println!("YC Startup Directory Scraper");
    println!("============================\n");

    // Phase 1: page through the search index
    println!("[1/4] Fetching companies (target: {})...", cfg.target_count);
    let mut records = directory::fetch_companies(&client, &cfg).await;
    println!("Collected {} companies\n", records.len());

    // Phase 2: founder enrichment from company pages
    let t_enrich = Instant::now();
    println!("[2/4] Enriching founder data from company pages...");
    let profiles = enrich::enrich_founders(&client, &cfg, &mut records).await?;
    println!(
        "Enriched with {} LinkedIn URLs in {:.1}s\n",
        profiles,
        t_enrich.elapsed().as_secs_f64()
    );

    // Phase 3: long descriptions through the summary model
    let t_summarize = Instant::now();
    println!(
        "[3/4] Fetching full descriptions and summarizing (model: {})...",
        cfg.summary_model
    );
    let model = HfSummaryModel::new(&cfg)?;
    let summarizer = TextSummarizer::new(model, &cfg);
    let summarized =
        summarize::summarize_companies(&client, &cfg, &summarizer, &mut records).await;
    println!(
        "Summarized {} descriptions in {:.1}s\n",
        summarized,
        t_summarize.elapsed().as_secs_f64()
    );

    // Phase 4: artifacts
    println!("[4/4] Writing output files...");
    export::write_raw_json(&records, &cfg.raw_json_path)?;
    println!("Raw data backup saved to {}", cfg.raw_json_path);

    let rows = export::flatten(&records);
    export::write_csv(&rows, &cfg.csv_path)?;
    println!("Data saved to {}\n", cfg.csv_path);

    export::ExportStats::from_rows(&rows).print();
    print_sample(&rows);

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn print_sample(rows: &[OutputRow]) {
    if rows.is_empty() {
        return;
    }

    println!(
        "\nSample ({} of {} rows):",
        rows.len().min(SAMPLE_ROWS),
        rows.len()
    );
    println!(
        "{:<24} | {:<12} | {:<40} | {:<20} | {:<32}",
        "Company", "Batch", "Short Description", "Founder", "LinkedIn"
    );
    println!("{}", "-".repeat(140));

    for row in rows.iter().take(SAMPLE_ROWS) {
        println!(
            "{:<24} | {:<12} | {:<40} | {:<20} | {:<32}",
            truncate(&row.company_name, 24),
            truncate(&row.batch, 12),
            truncate(&row.short_description, 40),
            truncate(&row.founder_name, 20),
            truncate(&row.founder_linkedin_url, 32),
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
