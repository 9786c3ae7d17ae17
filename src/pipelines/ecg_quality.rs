// src/pipelines/ecg_quality.rs

use csv::WriterBuilder;
use log::{info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{
    ECG_SAMPLING_RATE_HZ, EEG_DELIMITER, EEG_FILE_NAME, EKG_COLUMN, SESSION_RESULT_COLUMN,
};
use crate::data_analysis::ecg_quality::{score_ecg, EcgQuality};
use crate::data_input::session_walker::{list_sessions, session_name};
use crate::data_input::station_table::StationTable;
use crate::error::AnalysisError;
use crate::stations::Station;
use crate::types::AnalysisResult;

#[derive(Debug, Clone)]
pub struct EcgQualityConfig {
    pub input_root: PathBuf,
    pub output_path: PathBuf,
    pub sample_rate: f64,
    /// Also write the kSQI, pSQI, basSQI and heart rate behind each grade
    pub with_indices: bool,
}

impl EcgQualityConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_path: output_path.into(),
            sample_rate: ECG_SAMPLING_RATE_HZ,
            with_indices: false,
        }
    }
}

/// Result for one station of one session.
#[derive(Debug, Clone, PartialEq)]
pub enum StationOutcome {
    Found(EcgQuality),
    /// Recording or channel absent; the summary cell stays empty
    Missing(String),
}

impl StationOutcome {
    pub fn quality(&self) -> Option<&EcgQuality> {
        match self {
            StationOutcome::Found(q) => Some(q),
            StationOutcome::Missing(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionQuality {
    pub session: String,
    /// One entry per station, in `Station::ALL` order
    pub stations: Vec<(Station, StationOutcome)>,
}

impl SessionQuality {
    pub fn outcome(&self, station: Station) -> Option<&StationOutcome> {
        self.stations
            .iter()
            .find(|(s, _)| *s == station)
            .map(|(_, outcome)| outcome)
    }
}

/// One row per session, one cell per station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualitySummary {
    pub sessions: Vec<SessionQuality>,
}

fn format_index(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.4}")
    }
}

impl QualitySummary {
    fn header(with_indices: bool) -> Vec<String> {
        let mut header = vec![SESSION_RESULT_COLUMN.to_string()];
        header.extend(Station::ALL.iter().map(|s| s.name().to_string()));
        if with_indices {
            for station in Station::ALL {
                for index in ["kSQI", "pSQI", "basSQI", "bpm"] {
                    header.push(format!("{station}_{index}"));
                }
            }
        }
        header
    }

    fn row(session: &SessionQuality, with_indices: bool) -> Vec<String> {
        let quality = |station: Station| session.outcome(station).and_then(StationOutcome::quality);

        let mut row = vec![session.session.clone()];
        row.extend(
            Station::ALL
                .iter()
                .map(|s| quality(*s).map(|q| q.grade.to_string()).unwrap_or_default()),
        );
        if with_indices {
            for station in Station::ALL {
                match quality(station) {
                    Some(q) => row.extend([
                        format_index(q.k_sqi),
                        format_index(q.p_sqi),
                        format_index(q.bas_sqi),
                        format_index(q.heart_rate_bpm),
                    ]),
                    None => row.extend(std::iter::repeat(String::new()).take(4)),
                }
            }
        }
        row
    }

    pub fn to_writer<W: Write>(&self, writer: W, with_indices: bool) -> Result<(), csv::Error> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(Self::header(with_indices))?;
        for session in self.sessions.iter() {
            wtr.write_record(Self::row(session, with_indices))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path, with_indices: bool) -> AnalysisResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| AnalysisError::io(path, e))?;
        self.to_writer(file, with_indices)
            .map_err(|e| AnalysisError::csv(path, e))
    }
}

/// Present samples of the `AUX_EKG` channel of one `EEG.csv`.
pub fn load_ekg_channel(eeg_file: &Path) -> AnalysisResult<Vec<f64>> {
    let table = StationTable::load(eeg_file, EEG_DELIMITER)?;
    let samples: Vec<f64> = table.numeric_column(EKG_COLUMN)?.into_iter().flatten().collect();
    if samples.is_empty() {
        return Err(AnalysisError::EmptySignal(format!(
            "{EKG_COLUMN} in '{}'",
            eeg_file.display()
        )));
    }
    Ok(samples)
}

/// Scores `<session>/<station>/EEG.csv`. Missing data becomes
/// `StationOutcome::Missing`; any other failure is returned as an error.
pub fn score_station(
    session_dir: &Path,
    station: Station,
    sample_rate: f64,
) -> AnalysisResult<StationOutcome> {
    let eeg_file = session_dir.join(station.name()).join(EEG_FILE_NAME);
    match load_ekg_channel(&eeg_file).and_then(|raw| score_ecg(&raw, sample_rate)) {
        Ok(quality) => Ok(StationOutcome::Found(quality)),
        Err(e) if e.is_missing_data() => {
            warn!(
                "Error processing {} in {}. {} file or {} column may be missing ({})",
                station,
                session_name(session_dir),
                EEG_FILE_NAME,
                EKG_COLUMN,
                e
            );
            Ok(StationOutcome::Missing(e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Scores every station of every session below `input_root`.
pub fn run(config: &EcgQualityConfig) -> AnalysisResult<QualitySummary> {
    let sessions = list_sessions(&config.input_root)?;
    info!(
        "Scoring ECG quality for {} sessions under '{}'",
        sessions.len(),
        config.input_root.display()
    );

    let sessions = sessions
        .iter()
        .map(|session_dir| {
            let stations = Station::ALL
                .iter()
                .map(|station| {
                    score_station(session_dir, *station, config.sample_rate)
                        .map(|outcome| (*station, outcome))
                })
                .collect::<AnalysisResult<Vec<_>>>()?;
            Ok(SessionQuality {
                session: session_name(session_dir),
                stations,
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    Ok(QualitySummary { sessions })
}
