//! topohydro CLI - sink filling and drainage basins over raw grid buffers

mod buffer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use buffer::{read_elevations, read_indices, write_elevations, write_labels, Dtype};
use topohydro_algorithms::hydrology::{
    label_basins, label_basins_parallel, priority_flood_in_place, BasinNumbering, BasinParams,
    FlowNetwork,
};
use topohydro_core::Raster;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "topohydro")]
#[command(author, version, about = "Depression filling and drainage basin labeling", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions and statistics of an elevation buffer
    Info {
        /// Input elevation buffer (raw little-endian)
        input: PathBuf,
        /// Number of rows
        #[arg(short, long)]
        rows: usize,
        /// Number of columns
        #[arg(short, long)]
        cols: usize,
        /// Element type of the buffer
        #[arg(short, long, value_enum, default_value = "f64")]
        dtype: Dtype,
        /// No-data value, rounded to the buffer's element type (NaN is always no-data)
        #[arg(short, long)]
        nodata: Option<f64>,
    },
    /// Fill depressions with Priority-Flood
    Fill {
        /// Input elevation buffer (raw little-endian)
        input: PathBuf,
        /// Output elevation buffer, same element type as the input
        output: PathBuf,
        /// Number of rows
        #[arg(short, long)]
        rows: usize,
        /// Number of columns
        #[arg(short, long)]
        cols: usize,
        /// Element type of the buffers
        #[arg(short, long, value_enum, default_value = "f64")]
        dtype: Dtype,
        /// No-data value, rounded to the buffer's element type (NaN is always no-data)
        #[arg(short, long)]
        nodata: Option<f64>,
    },
    /// Label drainage basins of a flow network
    Basins {
        /// Edge sources (u64, little-endian)
        source: PathBuf,
        /// Edge targets (u64, little-endian)
        target: PathBuf,
        /// Output labels (i64, little-endian)
        output: PathBuf,
        /// Number of rows
        #[arg(short, long)]
        rows: usize,
        /// Number of columns
        #[arg(short, long)]
        cols: usize,
        /// Number basins 1, 2, 3, ... instead of by outlet index
        #[arg(long)]
        consecutive: bool,
        /// Use parallel pointer jumping
        #[arg(short, long)]
        parallel: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_dem(path: &Path, rows: usize, cols: usize, dtype: Dtype, nodata: Option<f64>) -> Result<Raster<f64>> {
    let pb = spinner("Reading elevations...");
    let values = read_elevations(path, dtype)?;
    let mut raster = Raster::from_vec(values, rows, cols)
        .with_context(|| format!("{} does not match a {} x {} grid", path.display(), rows, cols))?;
    raster.set_nodata(nodata.map(|v| dtype.sentinel(v)));
    pb.finish_and_clear();
    Ok(raster)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info {
            input,
            rows,
            cols,
            dtype,
            nodata,
        } => {
            let raster = read_dem(&input, rows, cols, dtype, nodata)?;
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        Commands::Fill {
            input,
            output,
            rows,
            cols,
            dtype,
            nodata,
        } => {
            let mut dem = read_dem(&input, rows, cols, dtype, nodata)?;
            let start = Instant::now();
            let report = priority_flood_in_place(&mut dem);
            let elapsed = start.elapsed();
            info!(
                raised = report.raised,
                closed_basins = report.closed_basins,
                "filled {} cells",
                report.resolved
            );

            let pb = spinner("Writing output...");
            write_elevations(&output, dem.as_slice(), dtype).context("Failed to write filled DEM")?;
            pb.finish_and_clear();
            done("Filled DEM", &output, elapsed);
        }

        Commands::Basins {
            source,
            target,
            output,
            rows,
            cols,
            consecutive,
            parallel,
        } => {
            let pb = spinner("Reading flow network...");
            let source = read_indices(&source)?;
            let target = read_indices(&target)?;
            let network = FlowNetwork::from_edges(&source, &target, rows, cols)
                .context("Invalid flow network")?;
            pb.finish_and_clear();

            let params = BasinParams {
                numbering: if consecutive {
                    BasinNumbering::Consecutive
                } else {
                    BasinNumbering::RootIndex
                },
            };
            let start = Instant::now();
            let basins = if parallel {
                label_basins_parallel(&network, params)
            } else {
                label_basins(&network, params)
            }
            .context("Failed to label drainage basins")?;
            let elapsed = start.elapsed();
            info!("{} basins", basins.basin_count());

            let pb = spinner("Writing output...");
            write_labels(&output, basins.as_slice()).context("Failed to write basin labels")?;
            pb.finish_and_clear();
            done("Drainage basins", &output, elapsed);
        }
    }

    Ok(())
}
