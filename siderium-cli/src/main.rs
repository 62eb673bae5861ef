//! Command-line FITS stacker.
//!
//! ```bash
//! siderium stack --output stacked.ppm --dark dark.fits light_*.fits
//! siderium pixel-median --output median.ppm light_*.fits
//! ```
//!
//! Logs and progress go to stderr; only the chosen output file is written.
//! Exit code 0 on success, 1 for user-reported failures (bad arguments,
//! unreadable or invalid inputs, frames without enough stars); anything else
//! is a crash with a backtrace.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use siderium::{
    CalibrationFrames, Image, Progress, RegistrationConfig, StackingStage, load_fits,
    pixel_median, stack_images, write_ppm,
};

#[derive(Parser)]
#[command(name = "siderium", version, about = "Star-aligned stacking of FITS frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align all inputs by their stars and sum them
    Stack {
        /// Output image path (PPM/PGM)
        #[arg(long, default_value = "stacked.ppm")]
        output: PathBuf,

        /// Master dark frame to subtract from every input
        #[arg(long)]
        dark: Option<PathBuf>,

        /// Master bias frame to subtract from every input
        #[arg(long)]
        bias: Option<PathBuf>,

        /// Input FITS frames
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Element-wise median across identically-sized inputs
    PixelMedian {
        /// Output image path (PPM/PGM)
        #[arg(long, default_value = "median.ppm")]
        output: PathBuf,

        /// Input FITS frames
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors are user-reported failures; --help/--version are
            // ordinary successful exits.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stack {
            output,
            dark,
            bias,
            inputs,
        } => stack(output, dark, bias, inputs),
        Commands::PixelMedian { output, inputs } => median(output, inputs),
    }
}

fn stack(
    output: PathBuf,
    dark: Option<PathBuf>,
    bias: Option<PathBuf>,
    inputs: Vec<PathBuf>,
) -> Result<()> {
    let calibration = CalibrationFrames::load(dark.as_deref(), bias.as_deref())?;
    let mut images = load_inputs(&inputs, Some(&calibration))?;

    // A single input needs no alignment: it was calibrated and normalized
    // on load, so it goes straight to the encoder.
    if images.len() == 1 {
        let image = images.remove(0);
        write_ppm(&image, &output, false)?;
        return Ok(());
    }

    info!(frames = images.len(), "stacking");
    let mut stacked = stack_images(&images, &RegistrationConfig::default())?;
    stacked.normalize();
    write_ppm(&stacked, &output, false)?;

    Ok(())
}

fn median(output: PathBuf, inputs: Vec<PathBuf>) -> Result<()> {
    let images = load_inputs(&inputs, None)?;
    let result = pixel_median(&images)?;
    write_ppm(&result, &output, false)?;
    Ok(())
}

/// Load all inputs, optionally calibrating, and normalize each to `[0, 1]`.
fn load_inputs(
    inputs: &[PathBuf],
    calibration: Option<&CalibrationFrames>,
) -> Result<Vec<Image>> {
    let progress = Progress::new(StackingStage::Loading, inputs.len());
    let mut images = Vec::with_capacity(inputs.len());

    for (index, path) in inputs.iter().enumerate() {
        let (mut image, metadata) = load_fits(path)?;
        info!(
            path = %path.display(),
            object = metadata.object.as_deref().unwrap_or("-"),
            "loaded frame"
        );

        if let Some(calibration) = calibration {
            calibration.apply(&mut image, index)?;
        }
        image.normalize();
        images.push(image);
        progress.step();
    }
    progress.finish();

    Ok(images)
}
