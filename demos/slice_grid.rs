//! Slice a static chart image on a fixed grid
//!
//! ```sh
//! cargo run --example slice_grid -- nuancier.png --cols 10 --rows 9 --out-dir out
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use nuancier_extract::{slice_chart, ExtractionError, GridConfig};

#[derive(Parser)]
#[command(about = "Partition a chart image into uniform swatch cells")]
struct Args {
    /// Chart image of known dimensions
    image: PathBuf,

    #[arg(long)]
    cols: u32,

    #[arg(long)]
    rows: u32,

    /// Stop after the first N cells (trailing cells are blank)
    #[arg(long)]
    cap: Option<usize>,

    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
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
    let image = image::open(&args.image)
        .map_err(|e| ExtractionError::decode(format!("cannot load {}", args.image.display()), e))?
        .to_rgb8();
    let grid = GridConfig {
        cols: args.cols,
        rows: args.rows,
        cap: args.cap,
    };
    let label = args
        .image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());

    let outcome = slice_chart(&image, &grid, &label, &args.out_dir)?;
    println!("{}", outcome.summary);
    Ok(())
}
