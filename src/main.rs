//! CLI entry point for the paperflow tool.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use paperflow_core::{
    Annotation, BibliographySink, Config, MarkdownSink, Orchestrator, SinkTarget, SlideSink,
    build_default_chain,
};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Arguments come first so --help never prints through tracing.
    let args = Args::parse();

    // RUST_LOG beats -q, which beats -v/-vv.
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Paperflow starting");

    let config = Config::from_env();
    let annotation = Annotation::new(
        args.relevance.clone(),
        args.application.clone(),
        args.tags.clone(),
        args.title.clone(),
    );
    let target = SinkTarget::for_library(
        &config,
        &args.library,
        args.deck.clone(),
        args.theme.clone(),
        args.layout,
    );

    let chain = build_default_chain(&config);
    let mut orchestrator = Orchestrator::new(chain);
    orchestrator.register_sink(Box::new(MarkdownSink::new()));
    if args.no_papis {
        debug!("bibliography sink disabled");
    } else {
        orchestrator.register_sink(Box::new(BibliographySink::new(config.papis_bin.clone())));
    }
    if args.no_ppt {
        debug!("slide sink disabled");
    } else {
        orchestrator.register_sink(Box::new(SlideSink::new(config.slide_bin.clone())));
    }

    let report = orchestrator
        .run(&args.identifier, &annotation, &args.pdf, &target)
        .await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => info!(sink = outcome.sink, "sink succeeded"),
            Err(err) => error!(sink = outcome.sink, error = %err, "sink failed"),
        }
    }

    info!(
        title = %report.record.title,
        failed = report.failed_count(),
        total = report.outcomes.len(),
        "Run complete"
    );

    if report.any_failed() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
