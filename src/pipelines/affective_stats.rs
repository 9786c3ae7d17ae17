// src/pipelines/affective_stats.rs

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::constants::{AFFECTIVE_DELIMITER, DEFAULT_EXCLUDED_SESSIONS, DEFAULT_STATS_OUTPUT_DIR};
use crate::data_analysis::rating_stats::{final_submissions, RatingCorpus};
use crate::data_input::session_walker::{affective_rating_files, list_sessions, session_name};
use crate::data_input::station_table::StationTable;
use crate::error::AnalysisError;
use crate::plot_functions::plot_rating_stats::plot_rating_stats;
use crate::types::AnalysisResult;

#[derive(Debug, Clone)]
pub struct AffectiveStatsConfig {
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    pub excluded_sessions: Vec<String>,
    /// Fixes the jitter of the hexbin plot
    pub seed: Option<u64>,
}

impl AffectiveStatsConfig {
    pub fn new(input_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_dir: PathBuf::from(DEFAULT_STATS_OUTPUT_DIR),
            excluded_sessions: DEFAULT_EXCLUDED_SESSIONS.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

/// Final-submission rows of every rating export in the non-excluded sessions.
pub fn collect_corpus(root: &Path, excluded_sessions: &[String]) -> AnalysisResult<RatingCorpus> {
    list_sessions(root)?
        .into_iter()
        .filter(|dir| !excluded_sessions.contains(&session_name(dir)))
        .try_fold(RatingCorpus::default(), |corpus, session_dir| -> AnalysisResult<RatingCorpus> {
            affective_rating_files(&session_dir)?
                .into_iter()
                .try_fold(corpus, |corpus, file| -> AnalysisResult<RatingCorpus> {
                    let table = StationTable::load(&file, AFFECTIVE_DELIMITER)?;
                    Ok(corpus.extended(final_submissions(&table)?))
                })
        })
}

/// Writes the hexbin, histograms and bar graphs. Returns the image paths.
pub fn run(config: &AffectiveStatsConfig) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    info!(
        "Reading affective rating exports from: {}",
        config.input_root.display()
    );
    let corpus = collect_corpus(&config.input_root, &config.excluded_sessions)?;
    if corpus.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "no final submissions under '{}'",
            config.input_root.display()
        ))
        .into());
    }
    info!("Collected {} final submissions", corpus.len());

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let files = plot_rating_stats(&corpus, &config.output_dir, &mut rng)?;
    for file in files.iter() {
        info!("Saved {}", file.display());
    }
    Ok(files)
}
