// src/data_input/mod.rs

pub mod exclusion;
pub mod session_walker;
pub mod station_table;

// src/data_input/mod.rs
