// src/main.rs
// =============================================================================
// Entry point of the godoc-static CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Validate them into a SiteConfig (no backend is touched yet)
// 3. Resolve the packages to document
// 4. Open a session, run the pipeline, and always shut the session down
// 5. Print a summary (or JSON report) and exit: 0 = success, 1 = error
//
// Ctrl-C races the whole run. Dropping the run future drops the session,
// which kills the backend process on the way out.
//
// Rust concepts used:
// - async/await with tokio: the backend is a child process we talk to over HTTP
// - tokio::select!: whichever future finishes first wins, the other is dropped
// - Result and `?`: typed SiteError inside the crate, anyhow at the top
// =============================================================================

// Module declarations - tells Rust about our other source files
mod backend; // src/backend/ - godoc process and HTTP poller
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated settings
mod error; // src/error.rs - error taxonomy
mod markdown; // src/markdown.rs - description/footer rendering
mod packages; // src/packages/ - package resolution and listing
mod page; // src/page/ - static rewrite of scraped pages
mod site; // src/site/ - session, pipeline, index, output

// Fakes and an HTTP mock, compiled only for `cargo test`
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::SiteConfig;
use packages::{GoList, Resolver};
use site::{Pipeline, Session, SiteReport};

// #[tokio::main] builds the runtime and runs our async main inside it
#[tokio::main]
async fn main() {
    // clap prints help or a usage error and exits on its own
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Race the run against Ctrl-C. Losing the race drops `run`, and with it
    // everything it owns.
    let exit_code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => 0,
            Err(e) => {
                // {:#} prints the whole anyhow context chain on one line
                eprintln!("Error: {:#}", e);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted, stopping documentation backend");
            1
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise warnings only, or this crate's debug
// output under --verbose. Logs go to stderr so --json output stays clean.
fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "warn,godoc_static=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// The application logic. Every error bubbles up here through `?`.
async fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();

    // Validation first: nothing below runs on a bad command line
    let config = SiteConfig::from_cli(cli)?;

    // Work out which packages to document before godoc is started
    let lister = GoList::new();
    let resolution = Resolver::new(&lister).resolve(&config.packages).await?;

    if !config.json {
        println!(
            "🔍 Documenting {} package(s) ({} including parents)",
            resolution.filter.len(),
            resolution.full.len()
        );
    }

    let mut session = Session::open(&config).with_context(|| {
        format!("failed to prepare {}", config.destination.display())
    })?;

    // Keep the outcome instead of using `?`, so teardown below always runs
    let outcome = Pipeline::new(&mut session, &lister, &config)
        .run(&resolution)
        .await;
    let files_written = session.output.written();

    // Teardown runs on success and failure alike
    let archive = session.shutdown().await;

    let stats = match outcome {
        Ok(stats) => stats,
        Err(e) => {
            if e.is_timeout() {
                error!("godoc did not serve every page in time; try a longer --timeout or --warmup");
            }
            return Err(e.into());
        }
    };
    let archive = archive.context("failed to finish the site")?;

    let report = SiteReport::new(
        config.destination.clone(),
        archive,
        resolution.full.len(),
        stats,
        files_written,
        started.elapsed(),
    );
    info!(elapsed_ms = report.elapsed_ms, "site generated");

    print_report(&report, config.json)
}

// Prints the report either as a summary or as JSON
fn print_report(report: &SiteReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!("\n📊 Summary:");
    println!("   📦 Package pages: {}", report.package_pages);
    println!("   📄 Source pages:  {}", report.source_pages);
    println!("   🔗 Linked in index: {}", report.linked);
    println!("   💾 Files written: {}", report.files_written);
    println!("   📁 Site: {}", report.destination.display());
    if let Some(archive) = &report.archive {
        println!("   🗜️  Archive: {}", archive.display());
    }
    println!("   ⏱️  Took {:.1}s", report.elapsed_ms as f64 / 1000.0);
    Ok(())
}
