// src/main.rs

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;

use expt_analysis::constants::{
    DEFAULT_EXCLUDED_SESSIONS, DEFAULT_IGNORE_FILE, DEFAULT_STATS_OUTPUT_DIR,
};
use expt_analysis::crate_version;
use expt_analysis::pipelines::affective_stats::{self, AffectiveStatsConfig};
use expt_analysis::pipelines::ecg_quality::{self, EcgQualityConfig};
use expt_analysis::pipelines::hrf_average;
use expt_analysis::pipelines::hrf_plots::{self, HrfPlotConfig};

/// Batch analysis of multi-station experiment recordings
#[derive(Parser, Debug)]
#[command(name = "expt_analysis")]
#[command(version = crate_version(), about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grade the ECG channel of every station of every session
    EcgQuality {
        /// Directory holding the exp_* session directories
        #[arg(long = "input_path")]
        input_path: PathBuf,

        /// CSV file to write the quality summary to
        #[arg(long = "output_path")]
        output_path: PathBuf,

        /// Add kSQI, pSQI, basSQI and heart rate columns per station
        #[arg(long = "with_indices")]
        with_indices: bool,
    },

    /// One stacked HRF figure per station recording
    HrfPlots {
        /// Root searched recursively for exp_* session directories
        #[arg(long = "p")]
        input: PathBuf,

        /// Output root; session paths are mirrored below it
        #[arg(long = "o")]
        output: PathBuf,

        /// Session/station pairs to skip
        #[arg(long = "ignore_file", default_value = DEFAULT_IGNORE_FILE)]
        ignore_file: PathBuf,
    },

    /// Single HRF figure averaged over all station recordings
    HrfAverage {
        /// Root searched recursively for exp_* session directories
        #[arg(long = "p")]
        input: PathBuf,

        /// Directory the averaged figure is written to
        #[arg(long = "o")]
        output: PathBuf,

        /// Session/station pairs to skip
        #[arg(long = "ignore_file", default_value = DEFAULT_IGNORE_FILE)]
        ignore_file: PathBuf,
    },

    /// Histograms, hexbin and per-image bar graphs of the affective ratings
    AffectiveStats {
        /// Directory holding the exp_* session directories
        #[arg(long = "input_path")]
        input_path: PathBuf,

        /// Directory the figures are written to
        #[arg(long = "output_path", default_value = DEFAULT_STATS_OUTPUT_DIR)]
        output_path: PathBuf,

        /// Session to leave out (repeatable); replaces the built-in list
        #[arg(long = "exclude_session")]
        exclude_session: Vec<String>,

        /// Seed for the hexbin jitter
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("expt_analysis {}", crate_version());

    match cli.command {
        Commands::EcgQuality {
            input_path,
            output_path,
            with_indices,
        } => {
            let config = EcgQualityConfig {
                with_indices,
                ..EcgQualityConfig::new(input_path, output_path)
            };
            let summary = ecg_quality::run(&config)?;
            summary.write_csv(&config.output_path, config.with_indices)?;
            info!(
                "Wrote ECG quality for {} sessions to {}",
                summary.sessions.len(),
                config.output_path.display()
            );
        }
        Commands::HrfPlots {
            input,
            output,
            ignore_file,
        } => {
            let config = HrfPlotConfig {
                input_root: input,
                output_root: output,
                ignore_file,
            };
            let written = hrf_plots::run(&config)?;
            info!("Wrote {} HRF figures", written.len());
        }
        Commands::HrfAverage {
            input,
            output,
            ignore_file,
        } => {
            let config = HrfPlotConfig {
                input_root: input,
                output_root: output,
                ignore_file,
            };
            hrf_average::run(&config)?;
        }
        Commands::AffectiveStats {
            input_path,
            output_path,
            exclude_session,
            seed,
        } => {
            let excluded_sessions = if exclude_session.is_empty() {
                DEFAULT_EXCLUDED_SESSIONS.iter().map(|s| s.to_string()).collect()
            } else {
                exclude_session
            };
            let config = AffectiveStatsConfig {
                output_dir: output_path,
                excluded_sessions,
                seed,
                ..AffectiveStatsConfig::new(input_path)
            };
            affective_stats::run(&config)?;
        }
    }

    Ok(())
}
