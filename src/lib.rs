//! lmsmeta: instrument metadata from Leica LMS XML.
//!
//! Leica acquisition software stores everything it knows about an image
//! (dimensions, channel LUTs, hardware configuration, stage positions,
//! timestamps, annotations) in an XML tree. lmsmeta walks that tree and
//! produces one [`model::Acquisition`] per image, reconciling detectors,
//! laser lines and emission filters into per-channel settings along the way.
//!
//! # Modules
//!
//! - [`extract`]: XML navigation and the extraction pipeline
//! - [`model`]: Extracted records (dimensions, channels, instrument, ROIs)
//! - [`sink`]: Handing records to a metadata store
//! - [`validation`]: Consistency checks and error reporting
//! - [`config`]: Extraction options and their TOML form
//! - [`error`]: Error types for lmsmeta operations

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod sink;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LmsError;

use config::{Config, ExtractOptions};
use model::Acquisition;
use sink::KeyValueStore;

/// The lmsmeta CLI application.
#[derive(Parser)]
#[command(name = "lmsmeta")]
#[command(version, author, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Extract acquisition metadata from an LMS XML file.
    Extract(ExtractArgs),
    /// Check extracted metadata for inconsistencies.
    Validate(ValidateArgs),
}

/// Options shared by every subcommand that runs an extraction.
#[derive(clap::Args)]
struct InputArgs {
    /// LMS XML file to read.
    input: PathBuf,

    /// TOML file with an [extract] table.
    #[arg(long, env = "LMSMETA_CONFIG")]
    config: Option<PathBuf>,

    /// Plane count used to truncate timestamps.
    #[arg(long)]
    image_count: Option<usize>,

    /// Use the legacy physical step formula (length / count).
    #[arg(long)]
    old_physical_size: bool,
}

impl InputArgs {
    /// Config file values, overridden by the flags given on the command line.
    fn options(&self) -> Result<ExtractOptions, LmsError> {
        let mut options = match &self.config {
            Some(path) => Config::from_file(path)?.extract,
            None => ExtractOptions::default(),
        };
        if self.image_count.is_some() {
            options.image_count = self.image_count;
        }
        if self.old_physical_size {
            options.old_physical_size = true;
        }
        Ok(options)
    }

    fn extract(&self) -> Result<Vec<Acquisition>, LmsError> {
        let options = self.options()?;
        let acquisitions = extract::extract_file(&self.input, &options)?;
        for acquisition in &acquisitions {
            log::info!(
                "{}: image '{}' with {} channel(s), {} plane(s)",
                self.input.display(),
                acquisition.name,
                acquisition.channels.len(),
                acquisition.geometry.image_count
            );
        }
        Ok(acquisitions)
    }
}

/// Arguments for the extract subcommand.
#[derive(clap::Args)]
struct ExtractArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output format ('text', 'json', or 'store').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Run the lmsmeta CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LmsError> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}

/// Execute an already parsed command line.
pub fn dispatch(cli: Cli) -> Result<(), LmsError> {
    match cli.command {
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("lmsmeta {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Instrument metadata from Leica LMS XML.");
            println!();
            println!("Run 'lmsmeta --help' for usage information.");
            Ok(())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, LmsError> {
    serde_json::to_string_pretty(value)
        .map_err(|source| LmsError::Io(std::io::Error::other(source)))
}

/// Execute the extract subcommand.
fn run_extract(args: ExtractArgs) -> Result<(), LmsError> {
    let output = args.output.as_str();
    if !matches!(output, "text" | "json" | "store") {
        return Err(LmsError::UnsupportedFormat(format!(
            "'{}' (supported: text, json, store)",
            output
        )));
    }

    let acquisitions = args.input.extract()?;

    match output {
        "json" => println!("{}", to_json(&acquisitions)?),
        "store" => {
            let mut store = KeyValueStore::new();
            for (image, acquisition) in acquisitions.iter().enumerate() {
                sink::write_acquisition(&mut store, image, acquisition);
            }
            print!("{}", store);
        }
        _ => {
            for (image, acquisition) in acquisitions.iter().enumerate() {
                print_summary(image, acquisition);
            }
        }
    }
    Ok(())
}

fn print_summary(image: usize, acquisition: &Acquisition) {
    let geometry = &acquisition.geometry;
    println!("Image {}: {}", image, acquisition.name);
    println!(
        "  Size: X={} Y={} Z={} C={} T={}",
        geometry.size_x, geometry.size_y, geometry.size_z, geometry.size_c, geometry.size_t
    );
    println!(
        "  Physical size: {} x {} (z step {})",
        geometry.physical_size_x, geometry.physical_size_y, geometry.z_step
    );
    if let Some(date) = &acquisition.timestamps.acquired_date {
        println!("  Acquired: {}", date);
    }
    if let Some(microscope) = &acquisition.microscope {
        println!("  Microscope: {} ({:?})", microscope.model, microscope.microscope_type);
    }
    if let Some(objective) = &acquisition.objective {
        println!("  Objective: {}", objective.model);
    }
    for (index, assignment) in acquisition.channel_assignments.iter().enumerate() {
        let dye = assignment.dye.as_deref().unwrap_or("-");
        println!("  Channel {}: {} [{}]", index, assignment.name, dye);
    }
    if !acquisition.rois.is_empty() || !acquisition.single_rois.is_empty() {
        println!(
            "  ROIs: {}",
            acquisition.rois.len() + acquisition.single_rois.len()
        );
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), LmsError> {
    let output = args.output.as_str();
    if !matches!(output, "text" | "json") {
        return Err(LmsError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            output
        )));
    }

    let acquisitions = args.input.extract()?;
    let report = validation::validate_acquisitions(&acquisitions);

    match output {
        "json" => {
            let value = serde_json::json!({
                "error_count": report.error_count(),
                "warning_count": report.warning_count(),
                "issues": &report.issues,
            });
            println!("{}", to_json(&value)?);
        }
        _ => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(LmsError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
