// src/data_analysis/mod.rs

pub mod ecg_clean;
pub mod ecg_peaks;
pub mod ecg_quality;
pub mod fft_utils;
pub mod hrf_aggregation;
pub mod rating_stats;
pub mod spectral_analysis;

// src/data_analysis/mod.rs
