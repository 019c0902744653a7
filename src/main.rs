use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use chloris::config::{Config, validate_band_index};
use chloris::discovery::{Pairing, list_files, search_band_triplet};
use chloris::ndvi::{BatchReport, BatchRunner, NdviProcessor};
use chloris::product::ProductFormat;
use chloris::raster_io::{GdalIo, WriteOptions};

const CONCATENATED_EXTENSION: &str = "tif";

#[derive(Parser)]
#[command(name = "chloris")]
#[command(author, version, about = "NDVI computation for Sentinel-2 products", long_about = None)]
struct Cli {
    /// Input images directory [default: ./01_DATA]
    #[arg(short, long, global = true)]
    input_directory: Option<PathBuf>,

    /// Output images directory, created if missing [default: ./02_RES]
    #[arg(short, long, global = true)]
    output_directory: Option<PathBuf>,

    /// JSON run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Exit with status 1 when any item failed
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// NDVI from separate red, near infrared and cloud mask files
    Band {
        /// Sentinel-2 product level
        #[arg(short, long, value_enum)]
        format: ProductFormat,

        /// Shapefile (same CRS as the images) used to clip the output
        #[arg(long = "shapefile-directory", visible_alias = "shpdir")]
        shapefile: Option<PathBuf>,

        /// How red, NIR and cloud mask files are grouped into scenes
        #[arg(long, value_enum)]
        pairing: Option<Pairing>,
    },
    /// NDVI from images already holding the red and near infrared bands
    Concat {
        /// Position of the near infrared band (1 for the first band)
        #[arg(long = "nir-band-nb", visible_alias = "nb", default_value_t = 4)]
        nir_band: usize,

        /// Position of the red band (1 for the first band)
        #[arg(long = "red-band-nb", visible_alias = "rb", default_value_t = 3)]
        red_band: usize,

        /// Input file name patterns, e.g. `*_FRE_ConcatenateImageBGRPIR`
        #[arg(required = true)]
        patterns: Vec<String>,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber was already set");
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run(cli: &Cli) -> Result<BatchReport> {
    let config = load_config(cli.config.as_deref())?;
    let input_dir = config.input_directory(cli.input_directory.as_deref());
    let output_dir = config.output_directory(cli.output_directory.as_deref());

    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;
    info!("input directory: {}", input_dir.display());
    info!("output directory: {}", output_dir.display());

    let report = match &cli.command {
        Commands::Band {
            format,
            shapefile,
            pairing,
        } => {
            let lists = search_band_triplet(&input_dir, Some(*format), config.recurse());
            let sets = lists.pair(*format, config.pairing(*pairing));
            if sets.is_empty() {
                warn!("no {} band set found in {}", format, input_dir.display());
            }

            let processor = NdviProcessor::new(GdalIo::new(), config.write_options());
            BatchRunner::new(processor, &output_dir)
                .run_bands(&sets, config.shapefile(shapefile.as_deref()))
        }
        Commands::Concat {
            nir_band,
            red_band,
            patterns,
        } => {
            let nir_band = validate_band_index(*nir_band)?;
            let red_band = validate_band_index(*red_band)?;
            let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
            let inputs = list_files(
                &patterns,
                &input_dir,
                CONCATENATED_EXTENSION,
                config.recurse(),
            );
            if inputs.is_empty() {
                warn!("no image matching {:?} in {}", patterns, input_dir.display());
            }

            let processor = NdviProcessor::new(GdalIo::new(), WriteOptions::plain());
            BatchRunner::new(processor, &output_dir).run_concatenated(&inputs, nir_band, red_band)
        }
    };

    Ok(report)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let start = Instant::now();
    let report = run(&cli)?;

    for (output, reason) in &report.failed {
        error!("{}: {}", output.display(), reason);
    }
    println!("{} in {:.2?}", report, start.elapsed());

    if cli.strict && report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
