// src/data_analysis/rating_stats.rs

use rand::Rng;
use std::collections::BTreeMap;

use crate::constants::{AROUSAL_COLUMN, EVENT_COLUMN, IMAGE_PATH_COLUMN, VALENCE_COLUMN};
use crate::data_input::station_table::StationTable;
use crate::plot_functions::event_markers::EventType;
use crate::types::{AnalysisResult, StimulusMeans};

/// One `final_submission` row of an individual affective-task export.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub image_path: Option<String>,
    pub arousal: Option<f64>,
    pub valence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingDimension {
    Arousal,
    Valence,
}

impl RatingDimension {
    pub const ALL: [RatingDimension; 2] = [RatingDimension::Arousal, RatingDimension::Valence];

    pub fn label(&self) -> &'static str {
        match self {
            RatingDimension::Arousal => "Arousal Score",
            RatingDimension::Valence => "Valence Score",
        }
    }

    /// Lower-case name used in output file names
    pub fn file_tag(&self) -> &'static str {
        match self {
            RatingDimension::Arousal => "arousal",
            RatingDimension::Valence => "valence",
        }
    }

    pub fn select(&self, record: &RatingRecord) -> Option<f64> {
        match self {
            RatingDimension::Arousal => record.arousal,
            RatingDimension::Valence => record.valence,
        }
    }
}

/// Final-submission ratings pooled over every session and station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingCorpus {
    records: Vec<RatingRecord>,
}

/// The `final_submission` rows of one rating export.
pub fn final_submissions(table: &StationTable) -> AnalysisResult<Vec<RatingRecord>> {
    let events = table.text_column(EVENT_COLUMN)?;
    let images = table.text_column(IMAGE_PATH_COLUMN)?;
    let arousal = table.numeric_column(AROUSAL_COLUMN)?;
    let valence = table.numeric_column(VALENCE_COLUMN)?;
    let label = EventType::FinalSubmission.label();

    Ok(events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.as_deref() == Some(label))
        .map(|(row, _)| RatingRecord {
            image_path: images[row].clone(),
            arousal: arousal[row],
            valence: valence[row],
        })
        .collect())
}

impl RatingCorpus {
    pub fn new(records: Vec<RatingRecord>) -> Self {
        Self { records }
    }

    /// The corpus with `more` appended, for folding over rating files.
    pub fn extended(mut self, more: Vec<RatingRecord>) -> Self {
        self.records.extend(more);
        self
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present values of one rating, in corpus order.
    pub fn values(&self, dimension: RatingDimension) -> Vec<f64> {
        self.records.iter().filter_map(|r| dimension.select(r)).collect()
    }

    /// (arousal, valence) of every record that has both.
    pub fn rating_pairs(&self) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| Some((r.arousal?, r.valence?)))
            .collect()
    }

    /// Mean rating per stimulus, ordered by image path. Rows without an image
    /// path are left out, as are stimuli with no value for this rating.
    pub fn mean_by_stimulus(&self, dimension: RatingDimension) -> StimulusMeans {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for record in self.records.iter() {
            let (Some(image), Some(value)) = (record.image_path.as_deref(), dimension.select(record))
            else {
                continue;
            };
            let entry = groups.entry(image).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        groups
            .into_iter()
            .map(|(image, (sum, count))| (image.to_string(), sum / count as f64))
            .collect()
    }
}

/// Adds uniform noise in `[-amount / 2, amount / 2)` to every value.
pub fn jitter<R: Rng + ?Sized>(values: &[f64], amount: f64, rng: &mut R) -> Vec<f64> {
    values
        .iter()
        .map(|v| v + amount * (rng.gen::<f64>() - 0.5))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram spanning `[min, max]`; the last bin is closed. A
/// constant input is binned over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (low, high) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (high - low) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: low + i as f64 * width,
            upper: if i + 1 == bins { high } else { low + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();
    for v in finite {
        let index = (((v - low) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }
    result
}

/// One hexagon of a [`HexGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    pub center: (f64, f64),
    pub count: usize,
}

/// Hexagonal binning of a point cloud, on the two interleaved lattices of
/// the classic hexbin layout.
#[derive(Debug, Clone)]
pub struct HexGrid {
    pub cells: Vec<HexCell>,
    /// Horizontal distance between hexagon centres of one lattice
    pub sx: f64,
    /// Vertical distance between hexagon centres of one lattice
    pub sy: f64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl HexGrid {
    /// Vertices of the hexagon centred on `center`.
    pub fn hexagon(&self, center: (f64, f64)) -> Vec<(f64, f64)> {
        const UNIT: [(f64, f64); 6] = [
            (0.5, -0.5),
            (0.5, 0.5),
            (0.0, 1.0),
            (-0.5, 0.5),
            (-0.5, -0.5),
            (0.0, -1.0),
        ];
        UNIT.iter()
            .map(|(ux, uy)| (center.0 + ux * self.sx, center.1 + uy * self.sy / 3.0))
            .collect()
    }

    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// Widens a degenerate interval the way the hexbin axis limits are widened.
fn nonsingular(min: f64, max: f64) -> (f64, f64) {
    const EXPANDER: f64 = 0.1;
    let largest = min.abs().max(max.abs());
    if (max - min) > largest * 1e-15 {
        (min, max)
    } else if largest == 0.0 {
        (-EXPANDER, EXPANDER)
    } else {
        (min - EXPANDER * min.abs(), max + EXPANDER * max.abs())
    }
}

/// Counts points per hexagon with `gridsize` hexagons across the x range.
pub fn hexbin(points: &[(f64, f64)], gridsize: usize) -> HexGrid {
    let nx = gridsize.max(1);
    let ny = ((nx as f64 / 3f64.sqrt()) as usize).max(1);
    let (nx1, ny1) = (nx + 1, ny + 1);
    let (nx2, ny2) = (nx, ny);

    let bounds = |select: fn(&(f64, f64)) -> f64| {
        let min = points.iter().map(select).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(select).fold(f64::NEG_INFINITY, f64::max);
        if points.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    };
    let (xmin, xmax) = {
        let (lo, hi) = bounds(|p| p.0);
        nonsingular(lo, hi)
    };
    let (ymin, ymax) = {
        let (lo, hi) = bounds(|p| p.1);
        nonsingular(lo, hi)
    };
    let padding = 1e-9 * (xmax - xmin);
    let (xmin, xmax) = (xmin - padding, xmax + padding);
    let sx = (xmax - xmin) / nx as f64;
    let sy = (ymax - ymin) / ny as f64;

    let mut counts1 = vec![0usize; nx1 * ny1];
    let mut counts2 = vec![0usize; nx2 * ny2];
    for &(x, y) in points {
        let ix = (x - xmin) / sx;
        let iy = (y - ymin) / sy;
        let (ix1, iy1) = (ix.round(), iy.round());
        let (ix2, iy2) = (ix.floor(), iy.floor());
        let d1 = (ix - ix1).powi(2) + 3.0 * (iy - iy1).powi(2);
        let d2 = (ix - ix2 - 0.5).powi(2) + 3.0 * (iy - iy2 - 0.5).powi(2);

        if d1 < d2 {
            if ix1 >= 0.0 && iy1 >= 0.0 && (ix1 as usize) < nx1 && (iy1 as usize) < ny1 {
                counts1[ix1 as usize * ny1 + iy1 as usize] += 1;
            }
        } else if ix2 >= 0.0 && iy2 >= 0.0 && (ix2 as usize) < nx2 && (iy2 as usize) < ny2 {
            counts2[ix2 as usize * ny2 + iy2 as usize] += 1;
        }
    }

    let lattice1 = (0..nx1).flat_map(|i| (0..ny1).map(move |j| (i as f64, j as f64)));
    let lattice2 = (0..nx2).flat_map(|i| (0..ny2).map(move |j| (i as f64 + 0.5, j as f64 + 0.5)));
    let cells = lattice1
        .zip(counts1)
        .chain(lattice2.zip(counts2))
        .map(|((i, j), count)| HexCell {
            center: (xmin + i * sx, ymin + j * sy),
            count,
        })
        .collect();

    HexGrid {
        cells,
        sx,
        sy,
        x_range: (xmin, xmax),
        y_range: (ymin, ymax),
    }
}
