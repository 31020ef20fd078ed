use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use maskblend::error::{Error, Result};
use maskblend::report::TagAccumulator;
use maskblend::{mask, permute, report};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate brightness-levelled masks from procedural noises
    Masks {
        /// The directory containing base procedural noises
        #[arg(long, default_value = "./noise_data/procedurals")]
        folder: PathBuf,

        /// The directory to save masks to
        #[arg(long, default_value = "./noise_data/masks")]
        output: PathBuf,

        /// Target mean brightness levels, defaults to deciles 0.1-0.8
        #[arg(long, value_delimiter = ',')]
        levels: Vec<f64>,
    },

    /// Composite every base x perturbation x mask combination
    Permute {
        /// Folder containing base images
        #[arg(long, default_value = "./noise_data/bases")]
        bases: PathBuf,

        /// Folder containing perturbed noise images
        #[arg(long, default_value = "./noise_data/noises")]
        noises: PathBuf,

        /// Folder containing masks
        #[arg(long, default_value = "./noise_data/masks")]
        masks: PathBuf,

        /// Folder to save composites to
        #[arg(long, default_value = "./noise_data/results")]
        output: PathBuf,

        /// Master opacity for noises added to images
        #[arg(long, default_value_t = 0.15)]
        alpha: f64,
    },

    /// Aggregate detector csv output by noise, mask and lightness tags
    Report {
        /// The path to the csv output of the detector
        #[arg(long)]
        csv: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Masks {
            folder,
            output,
            levels,
        } => {
            require_dir(&folder)?;
            let targets = if levels.is_empty() {
                mask::DEFAULT_TARGETS.to_vec()
            } else {
                levels
            };
            for &target in &targets {
                if !(0.0..=1.0).contains(&target) {
                    return Err(Error::TargetOutOfRange(target));
                }
            }
            fs::create_dir_all(&output)?;

            let written = mask::generate_masks(&folder, &output, &targets)?;
            println!("Wrote {} masks to {}", written, output.display());
            Ok(())
        }

        Commands::Permute {
            bases,
            noises,
            masks,
            output,
            alpha,
        } => {
            require_dir(&bases)?;
            require_dir(&noises)?;
            require_dir(&masks)?;
            if !(0.0..=1.0).contains(&alpha) {
                return Err(Error::AlphaOutOfRange(alpha));
            }
            fs::create_dir_all(&output)?;

            let written = permute::permute_composites(&bases, &noises, &masks, &output, alpha)?;
            println!("Wrote {} composites to {}", written, output.display());
            Ok(())
        }

        Commands::Report { csv } => {
            if !csv.is_file() || csv.extension().and_then(|e| e.to_str()) != Some("csv") {
                return Err(Error::CsvNotFound(csv));
            }

            let records = report::read_records(&csv)?;
            let summary = report::summarize(&records);
            print_group(&summary.by_noise);
            print_group(&summary.by_mask);
            print_group(&summary.by_lightness);
            Ok(())
        }
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::DirectoryNotFound(path.to_path_buf()));
    }
    Ok(())
}

fn print_group(accumulator: &TagAccumulator) {
    for (tag, entropy) in accumulator.mean_entropy() {
        println!("Average entropy of {}: {}", tag, entropy);
    }
    for (tag, rate) in accumulator.detection_rates() {
        println!("Detection rate of {}: {}%", tag, rate * 100.0);
    }
}
