//! Kohonen CLI - Self-Organizing Maps
//!
//! Command-line interface for creating, training and querying SOM snapshots.

use clap::{Parser, Subcommand};
use kohonen::{
    Config, DistanceType, KernelType, Result, Som, SomConfig, SnapshotFormat, SomTrainer,
    StorageConfig, TrainingConfig,
};
use log::error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kohonen")]
#[command(version)]
#[command(about = "Self-Organizing Map trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a randomly initialized map
    Init {
        /// Lattice width (columns)
        #[arg(long)]
        width: usize,

        /// Lattice height (rows)
        #[arg(long)]
        height: usize,

        /// Codebook vector dimensionality
        #[arg(short, long)]
        dims: usize,

        /// Distance metric (euclidean, dot_product, cosine_similarity, squared_euclidean)
        #[arg(long, default_value = "euclidean")]
        distance: DistanceType,

        /// Neighborhood kernel (uniform, exponential_decay, gaussian)
        #[arg(long, default_value = "uniform")]
        kernel: KernelType,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output snapshot file
        #[arg(short, long)]
        output: PathBuf,

        /// Snapshot format (json, bin); inferred from the extension by default
        #[arg(short, long)]
        format: Option<SnapshotFormat>,
    },

    /// Train a map on samples from a JSON file (array of arrays)
    Train {
        /// Snapshot to train
        #[arg(short, long)]
        model: PathBuf,

        /// Samples file
        #[arg(short, long)]
        samples: PathBuf,

        /// JSON config file; its training section replaces the flags below and
        /// its storage format is used for snapshots without a known extension
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of training iterations
        #[arg(short = 'n', long, default_value = "1000")]
        iterations: usize,

        /// Starting learning rate
        #[arg(long, default_value = "0.5")]
        start_lr: f64,

        /// Ending learning rate
        #[arg(long, default_value = "0.01")]
        end_lr: f64,

        /// Initial neighborhood radius
        #[arg(short, long, default_value = "3.0")]
        radius: f64,

        /// Output snapshot file (defaults to overwriting the model)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Snapshot format (json, bin); inferred from the extension by default
        #[arg(short, long)]
        format: Option<SnapshotFormat>,
    },

    /// Find the best matching unit for a sample
    Bmu {
        /// Snapshot to query
        #[arg(short, long)]
        model: PathBuf,

        /// Snapshot format (json, bin); inferred from the extension by default
        #[arg(short, long)]
        format: Option<SnapshotFormat>,

        /// Sample values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Show snapshot statistics
    Info {
        /// Snapshot to inspect
        model: PathBuf,

        /// Snapshot format (json, bin); inferred from the extension by default
        #[arg(short, long)]
        format: Option<SnapshotFormat>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Init {
            width,
            height,
            dims,
            distance,
            kernel,
            seed,
            output,
            format,
        } => {
            let mut config = SomConfig::new(width, height, dims)
                .with_distance(distance)
                .with_kernel(kernel);
            config.seed = seed;
            init_map(config, output, format)
        }

        Commands::Train {
            model,
            samples,
            config,
            iterations,
            start_lr,
            end_lr,
            radius,
            output,
            format,
        } => {
            let settings = match config {
                Some(path) => Config::from_file(path).map(|c| (c.training, Some(c.storage))),
                None => Ok((TrainingConfig::new(iterations, start_lr, end_lr, radius), None)),
            };
            settings.and_then(|(training, storage)| {
                train_map(model, samples, training, storage, output, format)
            })
        }

        Commands::Bmu {
            model,
            format,
            values,
        } => find_bmu(model, format, values),

        Commands::Info { model, format } => show_info(model, format),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_format(
    path: &Path,
    explicit: Option<SnapshotFormat>,
    storage: Option<&StorageConfig>,
) -> Result<SnapshotFormat> {
    match (explicit, storage) {
        (Some(format), _) => Ok(format),
        (None, Some(storage)) => Ok(storage.resolve(path, None)),
        (None, None) => SnapshotFormat::from_path(path),
    }
}

fn init_map(config: SomConfig, output: PathBuf, format: Option<SnapshotFormat>) -> Result<()> {
    let format = resolve_format(&output, format, None)?;
    let som = Som::new(&config)?;
    som.save(&output, format)?;

    println!(
        "✓ Created {}x{} map with {}-dimensional codebooks ({}, {})",
        som.cols(),
        som.rows(),
        som.dims(),
        som.distance_type(),
        som.kernel_type()
    );
    println!("  Saved to {}", output.display());
    Ok(())
}

fn train_map(
    model: PathBuf,
    samples_path: PathBuf,
    training: TrainingConfig,
    storage: Option<StorageConfig>,
    output: Option<PathBuf>,
    format: Option<SnapshotFormat>,
) -> Result<()> {
    let start_time = Instant::now();

    let in_format = resolve_format(&model, format, storage.as_ref())?;
    let mut som = Som::load(&model, in_format)?;

    let reader = BufReader::new(File::open(&samples_path)?);
    let samples: Vec<Vec<f64>> = serde_json::from_reader(reader)?;
    println!("✓ Loaded {} samples from {}", samples.len(), samples_path.display());

    let trainer = SomTrainer::new(training);
    let summary = trainer.train(&mut som, &samples)?;
    let qe = som.quantization_error(&samples)?;
    let te = som.topographic_error(&samples)?;

    let output = output.unwrap_or(model);
    let out_format = resolve_format(&output, format, storage.as_ref())?;
    som.save(&output, out_format)?;

    println!(
        "✓ Trained for {} iterations in {:.2?} (final lr={:.4}, radius={:.2})",
        summary.iterations,
        start_time.elapsed(),
        summary.final_learning_rate,
        summary.final_radius
    );
    println!("  Quantization error: {:.6}", qe);
    println!("  Topographic error:  {:.4}", te);
    println!("  Saved to {}", output.display());
    Ok(())
}

fn find_bmu(model: PathBuf, format: Option<SnapshotFormat>, values: Vec<f64>) -> Result<()> {
    let format = resolve_format(&model, format, None)?;
    let som = Som::load(&model, format)?;

    let bmu = som.find_bmu(&values)?;
    let weights = som.cluster(&values)?;

    println!("BMU: row {}, col {}", bmu.pos.row, bmu.pos.col);
    println!("Distance: {:.6}", bmu.distance);
    println!("Weights: {:?}", weights);
    Ok(())
}

fn show_info(model: PathBuf, format: Option<SnapshotFormat>) -> Result<()> {
    let format = resolve_format(&model, format, None)?;
    let som = Som::load(&model, format)?;

    let weights = som.weights();
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;

    println!("Map: {}", model.display());
    println!("  Format:     {}", format);
    println!("  Lattice:    {} x {} ({} nodes)", som.cols(), som.rows(), som.total_nodes());
    println!("  Dimensions: {}", som.dims());
    println!("  Distance:   {}", som.distance_type());
    println!("  Kernel:     {}", som.kernel_type());
    println!("  Weights:    min {:.4}, max {:.4}, mean {:.4}", min, max, mean);
    Ok(())
}
