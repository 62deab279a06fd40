//! Dictaug: validate, inspect and augment deep-learning dataset manifests.
//!
//! A manifest is a nested dictionary describing the class table, the image
//! directory and the per-sample annotations of one of five task kinds
//! (classification, object detection, oriented object detection, instance
//! segmentation and semantic segmentation). Dictaug decodes manifests into
//! typed schemas, checks their invariants, and runs augmentation pipelines
//! that write new images together with a manifest describing them.
//!
//! # Modules
//!
//! - [`dict`]: The generic nested dictionary and its JSON storage
//! - [`geometry`]: Boxes, oriented boxes and run-length encoded regions
//! - [`manifest`]: The per-task manifest schemas
//! - [`validation`]: Manifest validation and error reporting
//! - [`augment`]: The augmentation pipeline
//! - [`inspect`]: Manifest statistics
//! - [`error`]: Error types for dictaug operations

pub mod augment;
pub mod dict;
pub mod error;
pub mod geometry;
pub mod inspect;
pub mod manifest;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

pub use error::DictaugError;

use augment::{apply_ops, CancellationToken, FsImageStore, Op, Pipeline, SaveOptions};
use dict::io_json::read_dict;
use dict::Dict;
use geometry::Mirror;
use manifest::{
    AnyManifest, ClassificationManifest, InstanceSegmentationManifest, Manifest,
    ObjectDetectionManifest, OrientedDetectionManifest, SampleRecord,
    SemanticSegmentationManifest, TaskKind,
};

/// The dictaug CLI application.
#[derive(Parser)]
#[command(name = "dictaug")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a manifest for errors and warnings.
    Validate(ValidateArgs),
    /// Show statistics for a manifest.
    Inspect(InspectArgs),
    /// Augment a manifest and its images with built-in operations.
    Augment(AugmentArgs),
}

/// Task kind of the input manifest.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum TaskArg {
    Classification,
    ObjectDetection,
    OrientedObjectDetection,
    InstanceSegmentation,
    SemanticSegmentation,
}

impl From<TaskArg> for TaskKind {
    fn from(task: TaskArg) -> Self {
        match task {
            TaskArg::Classification => TaskKind::Classification,
            TaskArg::ObjectDetection => TaskKind::ObjectDetection,
            TaskArg::OrientedObjectDetection => TaskKind::OrientedObjectDetection,
            TaskArg::InstanceSegmentation => TaskKind::InstanceSegmentation,
            TaskArg::SemanticSegmentation => TaskKind::SemanticSegmentation,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OpArg {
    Copy,
    FlipHorizontal,
    FlipVertical,
    #[value(name = "rotate180")]
    Rotate180,
}

impl From<OpArg> for Op {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Copy => Op::Copy,
            OpArg::FlipHorizontal => Op::FlipHorizontal,
            OpArg::FlipVertical => Op::FlipVertical,
            OpArg::Rotate180 => Op::Rotate180,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Manifest JSON file to validate.
    input: PathBuf,

    /// Task kind of the manifest.
    #[arg(long, value_enum)]
    task: TaskArg,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Manifest JSON file to inspect.
    input: PathBuf,

    /// Task kind of the manifest.
    #[arg(long, value_enum)]
    task: TaskArg,

    /// Number of labels to show in the histogram.
    #[arg(long, default_value_t = 10)]
    top_labels: usize,
}

/// Arguments for the augment subcommand.
#[derive(clap::Args)]
struct AugmentArgs {
    /// Manifest JSON file to augment.
    input: PathBuf,

    /// Task kind of the manifest.
    #[arg(long, value_enum)]
    task: TaskArg,

    /// Operation to apply to every sample; repeat for several outputs per sample.
    #[arg(long = "op", value_enum, required = true)]
    ops: Vec<OpArg>,

    /// Directory for augmented images (default: next to the executable).
    #[arg(long, env = "DICTAUG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path of the augmented manifest (default: inside the output directory).
    #[arg(long, env = "DICTAUG_OUTPUT_MANIFEST")]
    output_manifest: Option<PathBuf>,

    /// Directory for augmented label images (semantic segmentation only).
    #[arg(long)]
    segmentation_dir: Option<PathBuf>,
}

/// Run the dictaug CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DictaugError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Augment(args)) => run_augment(args),
        None => {
            println!("dictaug {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Validate, inspect and augment deep-learning dataset manifests.");
            println!();
            println!("Run 'dictaug --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    // A logger may already be installed when embedded
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn load(input: &Path, task: TaskArg) -> Result<AnyManifest, DictaugError> {
    let dict = read_dict(input)?;
    Ok(AnyManifest::decode(task.into(), &dict))
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), DictaugError> {
    let manifest = load(&args.input, args.task)?;
    let report = manifest.validate();

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::json!({
                "task": manifest.kind().name(),
                "error_count": report.error_count(),
                "warning_count": report.warning_count(),
                "issues": &report.issues,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ReportFormat::Text => print!("{}", report),
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(DictaugError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), DictaugError> {
    let manifest = load(&args.input, args.task)?;
    let opts = inspect::InspectOptions {
        top_labels: args.top_labels,
        ..Default::default()
    };

    let report = inspect::inspect_manifest(&manifest, &opts);
    print!("{}", report);
    Ok(())
}

/// Execute the augment subcommand.
fn run_augment(args: AugmentArgs) -> Result<(), DictaugError> {
    let dict = read_dict(&args.input)?;
    let ops: Vec<Op> = args.ops.iter().copied().map(Op::from).collect();

    let mut options = match &args.output_dir {
        Some(dir) => SaveOptions::new(dir, dir.join("augmented_manifest.json")),
        None => SaveOptions::default(),
    };
    if let Some(path) = args.output_manifest {
        options.manifest_path = path;
    }
    options.segmentation_dir = args.segmentation_dir;

    let task: TaskKind = args.task.into();
    match task {
        TaskKind::Classification => augment_as::<ClassificationManifest>(&dict, &ops, options),
        TaskKind::ObjectDetection => augment_as::<ObjectDetectionManifest>(&dict, &ops, options),
        TaskKind::OrientedObjectDetection => {
            augment_as::<OrientedDetectionManifest>(&dict, &ops, options)
        }
        TaskKind::InstanceSegmentation => {
            augment_as::<InstanceSegmentationManifest>(&dict, &ops, options)
        }
        TaskKind::SemanticSegmentation => {
            augment_as::<SemanticSegmentationManifest>(&dict, &ops, options)
        }
    }
}

fn augment_as<M>(dict: &Dict, ops: &[Op], options: SaveOptions) -> Result<(), DictaugError>
where
    M: Manifest,
    <M::Sample as SampleRecord>::Geometry: Mirror,
    Pipeline<M, FsImageStore>: Send + 'static,
{
    let mut pipeline: Pipeline<M, FsImageStore> = Pipeline::new(FsImageStore);
    pipeline.load_source(dict)?;
    let produced = pipeline.simple_augment(apply_ops(ops))?;
    let sources = pipeline.sources().len();

    let task = pipeline.spawn_save(options, CancellationToken::new())?;
    let (_, result) = task.join();
    let summary = result?;

    println!(
        "Augmented {} sample(s) into {} new sample(s)",
        sources, produced
    );
    println!(
        "Wrote {} image(s) to {}",
        summary.images_written,
        summary.image_dir.display()
    );
    println!("Wrote manifest {}", summary.manifest_path.display());
    Ok(())
}
