// src/stations.rs

//! Recording stations of the ECG quality scorer
//!
//! Each session folder holds one sub-folder per station; the summary table
//! has one column per station, in this order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Station {
    Lion,
    Tiger,
    Leopard,
}

impl Station {
    /// All stations in summary-column order
    pub const ALL: [Station; 3] = [Station::Lion, Station::Tiger, Station::Leopard];

    /// Folder name of the station inside a session directory
    pub fn name(&self) -> &'static str {
        match self {
            Station::Lion => "lion",
            Station::Tiger => "tiger",
            Station::Leopard => "leopard",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Upper-cases the first character, for figure titles ("lion" -> "Lion").
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
