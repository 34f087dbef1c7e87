//! Push a reconciled manifest to the remote catalog
//!
//! Uploads each renamed swatch asset to object storage and inserts one
//! catalog row per paired entry. Insertion requires an explicit
//! confirmation; declining leaves everything on disk untouched.
//!
//! ```sh
//! CATALOG_SERVICE_KEY=... cargo run --example import_catalog -- \
//!     out/manifest.json --base-url https://xyz.supabase.co --table chart_colors --bucket swatches
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use nuancier_extract::catalog::{confirm, CatalogClient, CatalogConfig};
use nuancier_extract::{ExtractionError, ExtractionManifest};

#[derive(Parser)]
#[command(about = "Upload reconciled swatches and insert catalog records")]
struct Args {
    /// Manifest written by an extraction run
    manifest: PathBuf,

    #[arg(long)]
    base_url: String,

    /// Catalog table receiving one row per paired entry
    #[arg(long)]
    table: String,

    /// Storage bucket receiving the swatch images
    #[arg(long)]
    bucket: String,
}

fn main() {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> nuancier_extract::Result<()> {
    let api_key = std::env::var("CATALOG_SERVICE_KEY").map_err(|_| {
        ExtractionError::InvalidParameter {
            parameter: "CATALOG_SERVICE_KEY".to_string(),
            value: "<unset>".to_string(),
        }
    })?;
    let client = CatalogClient::new(CatalogConfig::new(&args.base_url, api_key))?;
    let manifest = ExtractionManifest::load(&args.manifest)?;

    let mut rows = Vec::new();
    let mut upload_failures = 0usize;
    for entry in &manifest.entries {
        let Some(new_path) = &entry.new_path else {
            continue; // unmatched swatch, nothing to publish
        };
        let Some(file_name) = new_path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        let image_url = match std::fs::read(new_path) {
            Ok(bytes) => match client.upload_object(&args.bucket, &file_name, bytes, "image/png") {
                Ok(url) => url,
                Err(e) => {
                    eprintln!("upload failed for {}: {e}", new_path.display());
                    upload_failures += 1;
                    continue;
                }
            },
            Err(e) => {
                eprintln!("cannot read {}: {e}", new_path.display());
                upload_failures += 1;
                continue;
            }
        };
        rows.push(serde_json::json!({
            "code": entry.code,
            "finish": entry.finish,
            "name": entry.name,
            "image_url": image_url,
        }));
    }

    println!(
        "prepared {} rows ({} uploads failed) for table {}",
        rows.len(),
        upload_failures,
        args.table
    );
    if !confirm(&format!("insert {} rows into {}?", rows.len(), args.table))? {
        println!("declined; nothing inserted");
        return Ok(());
    }

    let report = client.insert_batch(&args.table, &rows);
    println!("inserted {} rows, {} failed", report.inserted, report.failed);
    Ok(())
}
