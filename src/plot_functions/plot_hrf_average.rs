// src/plot_functions/plot_hrf_average.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::constants::{AVERAGE_PLOT_FILE_NAME, AVERAGE_PLOT_TITLE};
use crate::data_analysis::hrf_aggregation::HrfTable;
use crate::plot_framework::draw_hrf_figure;
use crate::plot_functions::event_markers::collect_event_markers;
use crate::plot_functions::plot_hrf::hrf_panel;

/// Where the averaged figure is written inside `output_dir`.
pub fn average_plot_path(output_dir: &Path) -> PathBuf {
    output_dir.join(AVERAGE_PLOT_FILE_NAME)
}

/// Single-panel figure of the averaged mean trace. Returns the image path.
pub fn plot_hrf_average(average: &HrfTable, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let markers = collect_event_markers(&average.events, &average.arousal, &average.valence)?;
    let panel = hrf_panel(
        &average.mean_trace(),
        AVERAGE_PLOT_TITLE.to_string(),
        &markers,
        false,
    );

    let output = average_plot_path(output_dir);
    draw_hrf_figure(&output, &[panel])?;
    Ok(output)
}
