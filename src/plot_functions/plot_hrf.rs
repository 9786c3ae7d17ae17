// src/plot_functions/plot_hrf.rs

use std::error::Error;
use std::path::Path;

use crate::constants::{
    AROUSAL_LEGEND_NOTE, COLOR_HBO, COLOR_HBR, HRF_X_LABEL, HRF_Y_LABEL, LINE_WIDTH_PLOT,
    VALENCE_LEGEND_NOTE,
};
use crate::data_analysis::hrf_aggregation::{trace_points, ChannelTrace, HrfTable};
use crate::plot_framework::{draw_hrf_figure, HrfPanel, PlotSeries, PointAnnotation, VerticalMarker};
use crate::plot_functions::event_markers::{collect_event_markers, EventMarker};
use crate::stations::capitalize;

/// Builds one HRF panel: HbO/HbR traces, event lines, and a score label at
/// the HbO value of every annotated marker.
pub fn hrf_panel(
    trace: &ChannelTrace,
    title: String,
    markers: &[EventMarker],
    with_rating_notes: bool,
) -> HrfPanel {
    let series = vec![
        PlotSeries {
            data: trace_points(&trace.hbo),
            label: trace.hbo_label(),
            color: *COLOR_HBO,
            stroke_width: LINE_WIDTH_PLOT,
        },
        PlotSeries {
            data: trace_points(&trace.hbr),
            label: trace.hbr_label(),
            color: *COLOR_HBR,
            stroke_width: LINE_WIDTH_PLOT,
        },
    ];

    let legend_notes = if with_rating_notes {
        vec![AROUSAL_LEGEND_NOTE.to_string(), VALENCE_LEGEND_NOTE.to_string()]
    } else {
        Vec::new()
    };

    // No HbO sample at the marker row: the label has nowhere to sit
    let annotations = markers
        .iter()
        .filter_map(|m| {
            let text = m.annotation.clone()?;
            let y = trace.hbo.get(m.row).copied().flatten()?;
            Some(PointAnnotation { x: m.time_s, y, text })
        })
        .collect();

    HrfPanel {
        title,
        x_label: HRF_X_LABEL.to_string(),
        y_label: HRF_Y_LABEL.to_string(),
        series,
        legend_notes,
        markers: markers
            .iter()
            .map(|m| VerticalMarker {
                x: m.time_s,
                color: m.event.color(),
                label: m.legend_label.clone(),
            })
            .collect(),
        annotations,
    }
}

/// Panel titles of a single-recording figure: one per channel, then the mean.
pub fn panel_titles(channels: &[&str], session: &str, station: &str) -> Vec<String> {
    let suffix = format!("{session} - {} Individual affective task", capitalize(station));
    channels
        .iter()
        .map(|channel| format!("{channel} - {suffix}"))
        .chain(std::iter::once(format!("Average of All Channels - {suffix}")))
        .collect()
}

/// Stacked figure for one station recording: every channel, then the mean
/// trace. An unknown event label fails before anything is drawn.
pub fn plot_hrf(
    table: &HrfTable,
    session: &str,
    station: &str,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let markers = collect_event_markers(&table.events, &table.arousal, &table.valence)?;
    let mean = table.mean_trace();
    let titles = panel_titles(&table.channel_names(), session, station);

    let panels: Vec<HrfPanel> = table
        .channels
        .iter()
        .chain(std::iter::once(&mean))
        .zip(titles)
        .map(|(trace, title)| hrf_panel(trace, title, &markers, true))
        .collect();

    draw_hrf_figure(output, &panels)
}
