// src/plot_functions/mod.rs

pub mod event_markers;
pub mod plot_hrf;
pub mod plot_hrf_average;
pub mod plot_rating_stats;

// src/plot_functions/mod.rs
