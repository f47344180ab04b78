use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_core::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use folio_core::{ConversionOutcome, Converter, FetchConfig, MAX_URLS, Storage, build_archive};
use owo_colors::OwoColorize;

mod echo;

use echo::{format_size, print_banner, print_error, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert web articles into printer-friendly PDF documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Convert web articles into printer-friendly PDF documents", long_about = None)]
struct Args {
    /// Article URLs to convert (at most 5)
    #[arg(value_name = "URLS", required = true)]
    urls: Vec<String>,

    /// Directory for generated documents
    #[arg(short, long, default_value = folio_core::DEFAULT_STORAGE_DIR, value_name = "DIR")]
    output_dir: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT, value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Prefix for generated file names
    #[arg(long, value_name = "PREFIX")]
    namespace: Option<String>,

    /// Also bundle the generated documents into a ZIP archive
    #[arg(long, value_name = "FILE")]
    zip: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let total_steps = if args.zip.is_some() { 3 } else { 2 };

    if args.verbose {
        print_banner();
        tracing_subscriber::fmt()
            .with_env_filter("folio_core=debug")
            .with_writer(std::io::stderr)
            .init();
        print_info("Debug logging enabled");
        eprintln!();
    }

    if args.urls.len() > MAX_URLS {
        print_warning(&format!(
            "{} URLs given, only the first {} will be converted",
            args.urls.len(),
            MAX_URLS
        ));
    }

    print_step(1, total_steps, &format!("Opening {}", args.output_dir.display()));
    let storage = Storage::open(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir.display()))?;

    let config = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    };
    let mut converter = Converter::new(config, storage.clone()).context("Failed to build HTTP client")?;
    if let Some(namespace) = &args.namespace {
        converter = converter.with_namespace(namespace.clone());
    }

    print_step(2, total_steps, "Converting articles");
    let report = converter.convert_batch(&args.urls).await;

    for outcome in &report.outcomes {
        match outcome {
            ConversionOutcome::Converted { url, file_name } => {
                let size = storage
                    .resolve(file_name)
                    .ok()
                    .and_then(|p| fs::metadata(p).ok())
                    .map(|m| format_size(m.len()))
                    .unwrap_or_default();
                print_success(&format!("{} {} {}", file_name.bright_white(), size.dimmed(), url.dimmed()));
            }
            ConversionOutcome::Failed { message, .. } => {
                let summary = outcome.user_message().unwrap_or_default();
                print_error(&summary);
                if args.verbose {
                    eprintln!("  {} {}", "Cause:".dimmed(), message);
                }
            }
        }
    }

    if let Some(zip_path) = &args.zip {
        print_step(3, total_steps, &format!("Writing archive {}", zip_path.display()));
        let bytes = build_archive(&storage, &report.documents).context("Failed to build archive")?;
        fs::write(zip_path, &bytes).with_context(|| format!("Failed to write archive: {}", zip_path.display()))?;
        print_success(&format!(
            "{} documents bundled into {}",
            report.documents.len(),
            zip_path.display().bright_white()
        ));
    }

    for name in &report.documents {
        println!("{}", name);
    }

    if !report.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
