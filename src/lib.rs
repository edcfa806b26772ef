pub mod batching;
pub mod cli;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod orchestrator;
pub mod prompts;
pub mod report;

use clap::Parser;
use error::AnalysisError;
use tracing_subscriber::EnvFilter;

/// CLI entry point: parse arguments, set up logging, run the pipeline.
pub async fn run() -> Result<(), AnalysisError> {
    // Load .env if present; CLI env fallbacks pick the values up from there.
    let _ = dotenvy::dotenv();

    // Initialize tracing with RUST_LOG env filter.
    // Use RUST_LOG=debug for verbose per-request logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,radreport=info")),
        )
        .init();

    let args = cli::CliArgs::parse();
    run_with(args).await
}

/// Run one full analysis for already-parsed arguments.
pub async fn run_with(args: cli::CliArgs) -> Result<(), AnalysisError> {
    let config = args.config();

    // The extraction directory (if the input is an archive) lives until
    // `root` drops at the end of this function, success or failure.
    let root = extract::materialize_input(&args.input)?;
    let images = discovery::find_images(root.path())?;
    let total_images = images.len();
    tracing::info!("study loaded: {} slices", total_images);

    let batches = batching::plan_batches(images, config.max_payload_bytes);
    tracing::info!(
        "planned {} batches under a {} byte payload limit",
        batches.len(),
        config.max_payload_bytes
    );

    let client = client::EndpointClient::new(config.clone()).map_err(AnalysisError::Client)?;
    let ledger = ledger::ProgressLedger::new(args.ledger.clone());
    let analyzer = orchestrator::ProgressiveAnalyzer::new(&client, ledger, config.max_output_tokens);
    let final_context = analyzer.run(&batches, total_images).await?;

    let report_path = args.report_path();
    report::write_report(&report_path, total_images, &final_context).map_err(|source| {
        AnalysisError::Report {
            path: report_path.clone(),
            source,
        }
    })?;
    tracing::info!("final report written to {}", report_path.display());

    println!("{final_context}");
    Ok(())
}
