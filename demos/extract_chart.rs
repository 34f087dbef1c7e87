//! Run the contour-detection pipeline over a chart PDF
//!
//! ```sh
//! cargo run --example extract_chart -- nuancier.pdf --out-dir out
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use nuancier_extract::{extract_chart, NamedColorTable, PdfDocument, PipelineConfig};

#[derive(Parser)]
#[command(about = "Extract labeled swatch assets from a colour chart PDF")]
struct Args {
    /// Source chart document
    pdf: PathBuf,

    /// Output directory for crops and the manifest
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Pipeline configuration JSON; defaults to the reference chart profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named-color fallback table JSON
    #[arg(long)]
    named_colors: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> nuancier_extract::Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let known_names = match &args.named_colors {
        Some(path) => NamedColorTable::from_json_file(path)?,
        None => NamedColorTable::default(),
    };

    let doc = PdfDocument::open(&args.pdf)?;
    let outcome = extract_chart(&doc, &config, known_names, &args.out_dir)?;

    println!("{}", outcome.summary);
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }
    println!(
        "manifest: {} ({} colors)",
        args.out_dir.join("manifest.json").display(),
        outcome.manifest.total_colors
    );
    Ok(())
}
