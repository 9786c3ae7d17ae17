// src/data_input/exclusion.rs

use csv::ReaderBuilder;
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::{EXCLUSION_DELIMITER, EXCLUSION_SESSION_COLUMN, EXCLUSION_STATION_COLUMN};
use crate::error::AnalysisError;
use crate::types::AnalysisResult;

#[derive(Debug, Deserialize)]
struct ExclusionRecord {
    group_session: String,
    station: String,
}

/// (session, station) recordings contaminated by an experimenter sitting at the station.
///
/// Loaded once per run and never modified. Both HRF figure variants consult the
/// same list through [`ExclusionList::check`].
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    pairs: HashSet<(String, String)>,
}

impl ExclusionList {
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        let list = Self::from_reader(file, path)?;
        info!("Loaded {} excluded recordings from '{}'", list.len(), path.display());
        Ok(list)
    }

    pub fn from_reader<R: Read>(reader: R, source: &Path) -> AnalysisResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(EXCLUSION_DELIMITER)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| AnalysisError::csv(source, e))?
            .clone();
        for required in [EXCLUSION_SESSION_COLUMN, EXCLUSION_STATION_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(AnalysisError::MissingColumn {
                    column: required.to_string(),
                    table: source.display().to_string(),
                });
            }
        }

        let mut pairs = HashSet::new();
        for record in rdr.deserialize::<ExclusionRecord>() {
            let record = record.map_err(|e| AnalysisError::csv(source, e))?;
            pairs.insert((record.group_session, record.station));
        }
        Ok(Self { pairs })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(session, station)| (session.into(), station.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_excluded(&self, session: &str, station: &str) -> bool {
        self.pairs
            .contains(&(session.to_string(), station.to_string()))
    }

    /// Returns true (and logs why) when `file` must be skipped.
    pub fn check(&self, session: &str, station: &str, file: &Path) -> bool {
        let excluded = self.is_excluded(session, station);
        if excluded {
            warn!(
                "Ignoring file {} because experimenter was sitting there",
                file.display()
            );
        }
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exclusion_list() {
        let text = "group_session,station,note\nexp_2022_04_01_13,lion,sat in\nexp_2022_05_02_09,tiger,\n";
        let list = ExclusionList::from_reader(text.as_bytes(), Path::new("ignore.csv")).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.is_excluded("exp_2022_04_01_13", "lion"));
        assert!(list.is_excluded("exp_2022_05_02_09", "tiger"));
        assert!(!list.is_excluded("exp_2022_04_01_13", "tiger"));
        assert!(list.check("exp_2022_05_02_09", "tiger", Path::new("x.csv")));
    }

    #[test]
    fn test_required_columns() {
        let text = "session,station\nexp_1,lion\n";
        let err = ExclusionList::from_reader(text.as_bytes(), Path::new("ignore.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { ref column, .. } if column == "group_session"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = ExclusionList::load(Path::new("/nonexistent/ignore_experimenter.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingFile(_)));
    }
}
