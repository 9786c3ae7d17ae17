// src/plot_functions/plot_rating_stats.rs

use rand::Rng;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::constants::{HEXBIN_GRIDSIZE, HISTOGRAM_BINS, RATING_JITTER};
use crate::data_analysis::rating_stats::{hexbin, histogram, jitter, RatingCorpus, RatingDimension};
use crate::plot_framework::{draw_bar_chart, draw_hexbin, draw_histogram};

pub const HEXBIN_FILE_NAME: &str = "hexbin_plot.png";

pub fn histogram_file_name(dimension: RatingDimension) -> String {
    format!("histogram_{}.png", dimension.file_tag())
}

pub fn bar_graph_file_name(dimension: RatingDimension) -> String {
    format!("bar_graph_{}.png", dimension.file_tag())
}

/// The five images written for a corpus, in drawing order.
pub fn stats_output_files(output_dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![output_dir.join(HEXBIN_FILE_NAME)];
    files.extend(
        RatingDimension::ALL
            .iter()
            .map(|d| output_dir.join(histogram_file_name(*d))),
    );
    files.extend(
        RatingDimension::ALL
            .iter()
            .map(|d| output_dir.join(bar_graph_file_name(*d))),
    );
    files
}

/// Jittered arousal/valence hexbin, a histogram per rating and a per-image
/// mean bar graph per rating.
pub fn plot_rating_stats<R: Rng + ?Sized>(
    corpus: &RatingCorpus,
    output_dir: &Path,
    rng: &mut R,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let pairs = corpus.rating_pairs();
    let arousal: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let valence: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let jittered: Vec<(f64, f64)> = jitter(&arousal, RATING_JITTER, rng)
        .into_iter()
        .zip(jitter(&valence, RATING_JITTER, rng))
        .collect();

    let files = stats_output_files(output_dir);
    draw_hexbin(
        &files[0],
        &format!(
            "Hex bin plot of Arousal vs Valence Score with jitter factor of {RATING_JITTER}"
        ),
        RatingDimension::Arousal.label(),
        RatingDimension::Valence.label(),
        &hexbin(&jittered, HEXBIN_GRIDSIZE),
    )?;

    for (i, dimension) in RatingDimension::ALL.iter().enumerate() {
        let label = dimension.label();
        draw_histogram(
            &files[1 + i],
            &format!("Histogram of {label}"),
            label,
            &histogram(&corpus.values(*dimension), HISTOGRAM_BINS),
        )?;
    }

    for (i, dimension) in RatingDimension::ALL.iter().enumerate() {
        let label = dimension.label();
        draw_bar_chart(
            &files[3 + i],
            &format!("Bar Graph of Mean {label} per Image"),
            "Image Path",
            &format!("Mean {label}"),
            &corpus.mean_by_stimulus(*dimension),
        )?;
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_names() {
        let names: Vec<String> = stats_output_files(Path::new("out"))
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "hexbin_plot.png",
                "histogram_arousal.png",
                "histogram_valence.png",
                "bar_graph_arousal.png",
                "bar_graph_valence.png"
            ]
        );
    }
}
