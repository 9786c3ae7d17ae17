// src/pipelines/mod.rs

pub mod affective_stats;
pub mod ecg_quality;
pub mod hrf_average;
pub mod hrf_plots;

// src/pipelines/mod.rs
