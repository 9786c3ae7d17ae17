// src/types.rs
// Type aliases shared between the pipelines

use crate::error::AnalysisError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

// A column read from a station table; `None` marks an empty cell.
pub type NumericColumn = Vec<Option<f64>>;
pub type TextColumn = Vec<Option<String>>;

// Time-series points ready for plotting: (time in seconds, value)
pub type TracePoints = Vec<(f64, f64)>;

// Per-stimulus aggregate: (image_path, mean rating)
pub type StimulusMeans = Vec<(String, f64)>;
