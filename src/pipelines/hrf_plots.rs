// src/pipelines/hrf_plots.rs

use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::constants::{HRF_DELIMITER, HRF_FILE_PREFIX};
use crate::data_analysis::hrf_aggregation::HrfTable;
use crate::data_input::exclusion::ExclusionList;
use crate::data_input::session_walker::{
    find_sessions_recursive, session_name, station_files, station_from_file_name,
};
use crate::data_input::station_table::StationTable;
use crate::plot_functions::plot_hrf::plot_hrf;
use crate::types::AnalysisResult;

#[derive(Debug, Clone)]
pub struct HrfPlotConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub ignore_file: PathBuf,
}

/// One station recording selected for plotting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrfInput {
    pub session_dir: PathBuf,
    pub session: String,
    pub station: String,
    pub path: PathBuf,
}

/// Every `affective_individual_*` recording below `root` that is not on the
/// exclusion list, in session order.
pub fn discover_inputs(root: &Path, exclusions: &ExclusionList) -> AnalysisResult<Vec<HrfInput>> {
    let mut inputs = Vec::new();
    for session_dir in find_sessions_recursive(root)? {
        let session = session_name(&session_dir);
        for path in station_files(&session_dir, HRF_FILE_PREFIX)? {
            let station = station_from_file_name(&session_name(&path));
            if exclusions.check(&session, &station, &path) {
                continue;
            }
            inputs.push(HrfInput {
                session_dir: session_dir.clone(),
                session: session.clone(),
                station,
                path,
            });
        }
    }
    Ok(inputs)
}

/// `<output_root>/<session path relative to input_root>/<file stem>.png`
pub fn output_path_for(input_root: &Path, output_root: &Path, input: &HrfInput) -> PathBuf {
    let relative = input
        .session_dir
        .strip_prefix(input_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(&input.session));
    let stem = input
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.station.clone());
    output_root.join(relative).join(format!("{stem}.png"))
}

/// Loads one recording for plotting.
pub fn load_hrf_table(path: &Path) -> AnalysisResult<HrfTable> {
    let table = StationTable::load(path, HRF_DELIMITER)?;
    HrfTable::from_station_table(&table)
}

/// One stacked figure per eligible recording. Any failure aborts the batch.
pub fn run(config: &HrfPlotConfig) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let exclusions = ExclusionList::load(&config.ignore_file)?;
    let inputs = discover_inputs(&config.input_root, &exclusions)?;
    info!(
        "Found {} HRF recordings under '{}'",
        inputs.len(),
        config.input_root.display()
    );

    let mut written = Vec::with_capacity(inputs.len());
    for input in inputs.iter() {
        let table = load_hrf_table(&input.path)?;
        let output = output_path_for(&config.input_root, &config.output_root, input);
        info!("Saving fNIRS HRF plot to {}", output.display());
        plot_hrf(&table, &input.session, &input.station, &output)?;
        written.push(output);
    }
    Ok(written)
}
