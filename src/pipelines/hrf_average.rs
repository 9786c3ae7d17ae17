// src/pipelines/hrf_average.rs

use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;

use crate::constants::HRF_AVERAGE_MAX_ROWS;
use crate::data_analysis::hrf_aggregation::{average_tables, HrfTable};
use crate::data_input::exclusion::ExclusionList;
use crate::error::AnalysisError;
use crate::pipelines::hrf_plots::{discover_inputs, load_hrf_table, HrfInput, HrfPlotConfig};
use crate::plot_functions::plot_hrf_average::plot_hrf_average;
use crate::types::AnalysisResult;

fn is_malformed(err: &AnalysisError) -> bool {
    matches!(
        err,
        AnalysisError::Schema { .. }
            | AnalysisError::Csv { .. }
            | AnalysisError::Parse { .. }
            | AnalysisError::EmptyFile(_)
    )
}

/// Loads the tables to average. Files that are malformed or whose channel
/// layout differs from the first accepted table are skipped with a warning.
pub fn collect_tables(inputs: &[HrfInput]) -> AnalysisResult<Vec<HrfTable>> {
    let mut tables: Vec<HrfTable> = Vec::new();
    for input in inputs.iter() {
        let table = match load_hrf_table(&input.path) {
            Ok(table) => table,
            Err(e) if is_malformed(&e) => {
                warn!("Skipping {} in the average: {}", input.path.display(), e);
                continue;
            }
            Err(e) => return Err(e),
        };
        if let Some(reference) = tables.first() {
            if let Err(e) = table.check_layout(reference) {
                warn!("Skipping {} in the average: {}", input.path.display(), e);
                continue;
            }
        }
        tables.push(table);
    }
    Ok(tables)
}

/// Averages every eligible recording into one single-panel figure.
pub fn run(config: &HrfPlotConfig) -> Result<PathBuf, Box<dyn Error>> {
    let exclusions = ExclusionList::load(&config.ignore_file)?;
    let inputs = discover_inputs(&config.input_root, &exclusions)?;
    let tables = collect_tables(&inputs)?;
    if tables.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "no usable HRF recordings under '{}'",
            config.input_root.display()
        ))
        .into());
    }
    info!("Averaging {} of {} HRF recordings", tables.len(), inputs.len());

    let average = average_tables(&tables, HRF_AVERAGE_MAX_ROWS)?;
    let output = plot_hrf_average(&average, &config.output_root)?;
    info!("Saving fNIRS HRF plot to {}", output.display());
    Ok(output)
}
