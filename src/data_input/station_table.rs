// src/data_input/station_table.rs

use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;
use crate::types::{AnalysisResult, NumericColumn, TextColumn};

/// One station's CSV recording: a header row plus raw string records.
///
/// Cells are parsed on demand through the typed column accessors, so a table
/// can be loaded once and queried by several pipeline stages.
#[derive(Debug, Clone)]
pub struct StationTable {
    name: String,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl StationTable {
    /// Loads a CSV file with the given delimiter.
    ///
    /// A missing file maps to `AnalysisError::MissingFile`, a file without a
    /// header row to `AnalysisError::EmptyFile`.
    pub fn load(path: &Path, delimiter: u8) -> AnalysisResult<Self> {
        let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_reader(file, delimiter, &path.display().to_string())
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8, name: &str) -> AnalysisResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| AnalysisError::csv(PathBuf::from(name), e))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::EmptyFile(PathBuf::from(name)));
        }

        let records = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AnalysisError::csv(PathBuf::from(name), e))?;
        debug!("Read {} rows x {} columns from '{}'", records.len(), headers.len(), name);

        Ok(Self {
            name: name.to_string(),
            headers,
            records,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    fn require_column(&self, column: &str) -> AnalysisResult<usize> {
        self.column_index(column)
            .ok_or_else(|| AnalysisError::MissingColumn {
                column: column.to_string(),
                table: self.name.clone(),
            })
    }

    /// Numeric view of a column. Empty cells and NaN become `None`; any other
    /// unparsable cell is an error.
    pub fn numeric_column(&self, column: &str) -> AnalysisResult<NumericColumn> {
        let idx = self.require_column(column)?;
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let cell = record.get(idx).unwrap_or("");
                if cell.is_empty() {
                    return Ok(None);
                }
                cell.parse::<f64>()
                    .map(|v| if v.is_nan() { None } else { Some(v) })
                    .map_err(|_| AnalysisError::Parse {
                        table: self.name.clone(),
                        column: column.to_string(),
                        row: row + 1,
                        value: cell.to_string(),
                    })
            })
            .collect()
    }

    /// Text view of a column; empty cells become `None`.
    pub fn text_column(&self, column: &str) -> AnalysisResult<TextColumn> {
        let idx = self.require_column(column)?;
        Ok(self
            .records
            .iter()
            .map(|record| match record.get(idx) {
                Some(cell) if !cell.is_empty() => Some(cell.to_string()),
                _ => None,
            })
            .collect())
    }

    /// Copy of the table restricted to its first `max_rows` rows.
    pub fn truncated(&self, max_rows: usize) -> Self {
        Self {
            name: self.name.clone(),
            headers: self.headers.clone(),
            records: self.records.iter().take(max_rows).cloned().collect(),
        }
    }
}
