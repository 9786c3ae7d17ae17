// src/plot_functions/event_markers.rs

use plotters::style::RGBColor;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::data_analysis::hrf_aggregation::sample_time;
use crate::error::AnalysisError;
use crate::types::{AnalysisResult, NumericColumn, TextColumn};

/// Phases of the affective task timeline, as logged in `event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    StartAffectiveTask,
    ShowBlankScreen,
    ShowCrossScreen,
    ShowImage,
    ShowRatingScreen,
    IntermediateSelection,
    FinalSubmission,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::StartAffectiveTask,
        EventType::ShowBlankScreen,
        EventType::ShowCrossScreen,
        EventType::ShowImage,
        EventType::ShowRatingScreen,
        EventType::IntermediateSelection,
        EventType::FinalSubmission,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventType::StartAffectiveTask => "start_affective_task",
            EventType::ShowBlankScreen => "show_blank_screen",
            EventType::ShowCrossScreen => "show_cross_screen",
            EventType::ShowImage => "show_image",
            EventType::ShowRatingScreen => "show_rating_screen",
            EventType::IntermediateSelection => "intermediate_selection",
            EventType::FinalSubmission => "final_submission",
        }
    }

    /// Marker colour (ColorBrewer "Paired").
    pub fn color(&self) -> RGBColor {
        match self {
            EventType::StartAffectiveTask => RGBColor(0x1f, 0x78, 0xb4), // blue
            EventType::ShowBlankScreen => RGBColor(0xa6, 0xce, 0xe3),    // light blue
            EventType::ShowCrossScreen => RGBColor(0x33, 0xa0, 0x2c),    // green
            EventType::ShowImage => RGBColor(0xe3, 0x1a, 0x1c),          // red
            EventType::ShowRatingScreen => RGBColor(0xff, 0x7f, 0x00),   // orange
            EventType::IntermediateSelection => RGBColor(0x6a, 0x3d, 0x9a), // purple
            EventType::FinalSubmission => RGBColor(0xb1, 0x59, 0x28),    // brown
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventType {
    type Err = AnalysisError;

    /// Labels outside the vocabulary are an error, never skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|e| e.label() == s)
            .ok_or_else(|| AnalysisError::UnknownEvent(s.to_string()))
    }
}

/// A vertical event line on an HRF panel.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub row: usize,
    pub time_s: f64,
    pub event: EventType,
    /// `Event: <label>` on the first marker of each event type only
    pub legend_label: Option<String>,
    /// Rating text shown next to `intermediate_selection` markers
    pub annotation: Option<String>,
}

/// Rating value as text; a missing value reads `nan`.
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "nan".to_string(),
    }
}

/// `A(<arousal>)` when the arousal rating is present, otherwise `V(<valence>)`.
pub fn score_annotation(arousal: Option<f64>, valence: Option<f64>) -> String {
    match arousal {
        Some(_) => format!("A({})", format_score(arousal)),
        None => format!("V({})", format_score(valence)),
    }
}

/// One marker per labelled row of the event column.
pub fn collect_event_markers(
    events: &TextColumn,
    arousal: &NumericColumn,
    valence: &NumericColumn,
) -> AnalysisResult<Vec<EventMarker>> {
    let mut seen: HashSet<EventType> = HashSet::new();
    let mut markers = Vec::new();

    for (row, label) in events.iter().enumerate() {
        let Some(label) = label else {
            continue;
        };
        let event: EventType = label.parse()?;
        let legend_label = seen.insert(event).then(|| format!("Event: {event}"));
        let annotation = (event == EventType::IntermediateSelection).then(|| {
            score_annotation(
                arousal.get(row).copied().flatten(),
                valence.get(row).copied().flatten(),
            )
        });
        markers.push(EventMarker {
            row,
            time_s: sample_time(row),
            event,
            legend_label,
            annotation,
        });
    }
    Ok(markers)
}
