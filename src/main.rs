use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use hirefinder::cli::Cli;
use hirefinder::config::AppConfig;
use hirefinder::person::HeuristicNameDetector;
use hirefinder::pipeline::enrich_postings;
use hirefinder::posting::parse_posting_file;
use hirefinder::providers::{ChatClassificationService, JsonSearchProvider};
use hirefinder::export::export_csv;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.init {
        let path = AppConfig::create_default_config()
            .context("Failed to create default configuration")?;
        println!("Created default configuration at {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    let input = match &cli.input {
        Some(input) => input,
        None => bail!("No input file given. Use --input <postings.csv|postings.json> or --init to bootstrap configuration."),
    };

    let mut postings = parse_posting_file(input)?;
    if let Some(limit) = cli.limit {
        postings.truncate(limit);
    }
    if postings.is_empty() {
        bail!("No processable postings found in {}", input.display());
    }

    println!("Processing {} postings from {}", postings.len(), input.display());

    let service = ChatClassificationService::from_config(&config)?;
    let provider = JsonSearchProvider::from_config(&config)?;
    let detector = HeuristicNameDetector::new();

    // Ctrl-C requests cooperative cancellation; the in-flight posting
    // finishes before the batch stops.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing current posting...");
        cancel_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to install interrupt handler")?;

    let started = chrono::Utc::now();
    let progress = ProgressBar::new(postings.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );

    let records = enrich_postings(
        &postings,
        &service,
        &provider,
        &detector,
        &config,
        &cancel,
        |record| {
            progress.set_message(if record.top_company.is_empty() {
                "no match".to_string()
            } else {
                record.top_company.clone()
            });
            progress.inc(1);
        },
    )
    .await;

    progress.finish_and_clear();

    export_csv(&records, &cli.output)?;

    let identified = records.iter().filter(|r| !r.top_company.is_empty()).count();
    let errors = records
        .iter()
        .filter(|r| r.analysis_summary.starts_with("ERROR: "))
        .count();
    let elapsed = chrono::Utc::now() - started;

    println!("\n=== IDENTIFICATION SUMMARY ===");
    println!("Postings processed: {}", records.len());
    println!("Employers identified: {}", identified);
    println!("Errors: {}", errors);
    println!("Duration: {}s", elapsed.num_seconds());
    println!("Results exported: {}", cli.output.display());

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hirefinder={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
