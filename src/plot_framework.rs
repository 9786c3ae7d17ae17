// src/plot_framework.rs

use log::info;
use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Polygon, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontTransform, IntoFont, RGBColor, ShapeStyle};

use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::constants::{
    ANNOTATION_DOT_RADIUS, ANNOTATION_Y_OFFSET, BAR_LABEL_MAX_CHARS, COLORBAR_WIDTH_PX,
    COLOR_BAR_FILL, COLOR_HISTOGRAM_FILL, EVENT_MARKER_DASHES, FONT_SIZE_MESSAGE,
    HRF_PANEL_HEIGHT, LINE_WIDTH_LEGEND, LINE_WIDTH_MARKER, PLOT_WIDTH, STATS_PLOT_HEIGHT,
    STATS_PLOT_WIDTH,
};
use crate::data_analysis::rating_stats::{HexGrid, HistogramBin};
use crate::font_config::{
    FONT_TUPLE_ANNOTATION, FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND,
    FONT_TUPLE_MESSAGE,
};
use crate::types::StimulusMeans;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Creates the parent directory of an output image if it is missing.
pub fn ensure_parent_dir(output: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    title: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    const CHAR_WIDTH_RATIO: f32 = 0.6; // Approximate character width relative to font size
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = format!("{title} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;
    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as i32;

    let mut y = height / 2 - (lines.len() as i32 * estimated_line_height) / 2;
    let x = width / 2 - (max_line_length * estimated_char_width) / 2;
    for line in lines {
        let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
        area.draw(&Text::new(line.to_string(), (x, y), text_style))?;
        y += estimated_line_height;
    }
    Ok(())
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

/// Dashed full-height line at `x`; only labelled markers get a legend entry.
#[derive(Clone)]
pub struct VerticalMarker {
    pub x: f64,
    pub color: RGBColor,
    pub label: Option<String>,
}

/// Black dot at (x, y) with `text` centred just above it.
#[derive(Clone)]
pub struct PointAnnotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// One panel of a stacked HRF figure.
#[derive(Clone)]
pub struct HrfPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
    /// Legend-only entries without a drawn element
    pub legend_notes: Vec<String>,
    pub markers: Vec<VerticalMarker>,
    pub annotations: Vec<PointAnnotation>,
}

impl HrfPanel {
    fn ranges(&self) -> Option<(Range<f64>, Range<f64>)> {
        let xs = self
            .series
            .iter()
            .flat_map(|s| s.data.iter().map(|p| p.0))
            .chain(self.markers.iter().map(|m| m.x));
        let ys = self
            .series
            .iter()
            .flat_map(|s| s.data.iter().map(|p| p.1))
            .chain(self.annotations.iter().map(|a| a.y + ANNOTATION_Y_OFFSET));

        let (x_min, x_max) = finite_bounds(xs)?;
        let (y_min, y_max) = finite_bounds(ys)?;
        let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
        let (y_low, y_high) = calculate_range(y_min, y_max);
        Some((x_min..x_max, y_low..y_high))
    }
}

fn finite_bounds<I: Iterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

fn draw_hrf_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel: &HrfPanel,
) -> Result<bool, Box<dyn Error>> {
    let Some((x_range, y_range)) = panel.ranges() else {
        draw_unavailable_message(area, &panel.title, "No data points")?;
        return Ok(false);
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, FONT_TUPLE_CHART_TITLE)
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&panel.x_label)
        .y_desc(&panel.y_label)
        .x_labels(20)
        .y_labels(10)
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    for s in panel.series.iter().filter(|s| !s.data.is_empty()) {
        chart
            .draw_series(LineSeries::new(
                s.data.iter().cloned(),
                s.color.stroke_width(s.stroke_width),
            ))?
            .label(&s.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], s.color.stroke_width(LINE_WIDTH_LEGEND))
            });
    }

    for note in panel.legend_notes.iter() {
        // Invisible point carrying a text-only legend entry
        chart
            .draw_series(std::iter::once(Circle::new(
                (x_range.start, y_range.start),
                0,
                WHITE.filled(),
            )))?
            .label(note)
            .legend(|(x, y)| PathElement::new(vec![(x, y)], WHITE.stroke_width(0)));
    }

    // Dashed lines drawn as short segments
    let dash = (y_range.end - y_range.start) / (EVENT_MARKER_DASHES as f64 * 2.0);
    for marker in panel.markers.iter() {
        let style = marker.color.stroke_width(LINE_WIDTH_MARKER);
        let dashes = (0..EVENT_MARKER_DASHES).map(|i| {
            let y_start = y_range.start + (i as f64 * 2.0) * dash;
            PathElement::new(vec![(marker.x, y_start), (marker.x, y_start + dash)], style)
        });
        let drawn = chart.draw_series(dashes)?;
        if let Some(label) = &marker.label {
            let color = marker.color;
            drawn.label(label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
        }
    }

    let text_style = FONT_TUPLE_ANNOTATION
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for annotation in panel.annotations.iter() {
        chart.draw_series(std::iter::once(Circle::new(
            (annotation.x, annotation.y),
            ANNOTATION_DOT_RADIUS,
            BLACK.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            annotation.text.clone(),
            (annotation.x, annotation.y + ANNOTATION_Y_OFFSET),
            text_style.clone(),
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(FONT_TUPLE_LEGEND)
        .draw()?;

    Ok(true)
}

/// Renders `panels` stacked vertically into one PNG at `output`.
pub fn draw_hrf_figure(output: &Path, panels: &[HrfPanel]) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(output)?;
    let height = HRF_PANEL_HEIGHT * panels.len().max(1) as u32;
    let root_area = BitMapBackend::new(output, (PLOT_WIDTH, height)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut any_panel_plotted = false;
    if panels.is_empty() {
        draw_unavailable_message(&root_area, "HRF", "No channels")?;
    } else {
        let areas = root_area.split_evenly((panels.len(), 1));
        for (area, panel) in areas.iter().zip(panels.iter()) {
            any_panel_plotted |= draw_hrf_panel(area, panel)?;
        }
    }

    root_area.present()?;
    if any_panel_plotted {
        info!("Stacked plot saved as '{}'", output.display());
    } else {
        info!(
            "'{}' holds placeholder messages only: no data to plot",
            output.display()
        );
    }
    Ok(())
}

/// Frequency histogram with filled, black-edged bars.
pub fn draw_histogram(
    output: &Path,
    title: &str,
    x_label: &str,
    bins: &[HistogramBin],
) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(output)?;
    let root_area =
        BitMapBackend::new(output, (STATS_PLOT_WIDTH, STATS_PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        draw_unavailable_message(&root_area, title, "No ratings")?;
        root_area.present()?;
        return Ok(());
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let pad = (last.upper - first.lower) * 0.05;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(first.lower - pad..last.upper + pad, 0.0..max_count * 1.05)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Frequency")
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], COLOR_HISTOGRAM_FILL.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    root_area.present()?;
    info!("Histogram saved as '{}'", output.display());
    Ok(())
}

/// Tail of a long category name, so the distinguishing file name survives.
fn shorten_label(label: &str) -> String {
    let count = label.chars().count();
    if count <= BAR_LABEL_MAX_CHARS {
        label.to_string()
    } else {
        let tail: String = label.chars().skip(count - BAR_LABEL_MAX_CHARS + 1).collect();
        format!("…{tail}")
    }
}

/// One bar per category, labels rotated under the axis.
pub fn draw_bar_chart(
    output: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    bars: &StimulusMeans,
) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(output)?;
    let root_area =
        BitMapBackend::new(output, (STATS_PLOT_WIDTH, STATS_PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    if bars.is_empty() {
        draw_unavailable_message(&root_area, title, "No ratings")?;
        root_area.present()?;
        return Ok(());
    }
    let values = bars.iter().map(|(_, v)| *v);
    let (low, high) = finite_bounds(values).unwrap_or((0.0, 1.0));
    let y_min = low.min(0.0);
    let y_max = if high > 0.0 { high * 1.05 } else { 1.0 };

    let names: Vec<String> = bars.iter().map(|(name, _)| shorten_label(name)).collect();
    let mut chart = ChartBuilder::on(&root_area)
        .caption(title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(220)
        .y_label_area_size(60)
        .build_cartesian_2d((0..bars.len()).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .x_labels(bars.len() + 1)
        .x_label_formatter(&|v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_label_style(FONT_TUPLE_AXIS_LABEL.into_font().transform(FontTransform::Rotate90))
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let bar = |i: usize, value: f64, style: ShapeStyle| {
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value)],
            style,
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    };
    chart.draw_series(
        bars.iter()
            .enumerate()
            .map(|(i, (_, value))| bar(i, *value, COLOR_BAR_FILL.filled())),
    )?;
    chart.draw_series(
        bars.iter()
            .enumerate()
            .map(|(i, (_, value))| bar(i, *value, BLACK.stroke_width(1))),
    )?;

    root_area.present()?;
    info!("Bar graph saved as '{}'", output.display());
    Ok(())
}

/// Sequential blue scale for bin counts; zero maps to the lightest shade.
fn map_count_to_color(count: usize, max_count: usize) -> RGBColor {
    let t = if max_count == 0 {
        0.0
    } else {
        (count as f64 / max_count as f64).clamp(0.0, 1.0)
    };
    let color = colorous::BLUES.eval_continuous(t);
    RGBColor(color.r, color.g, color.b)
}

/// Hexagonal bin plot with a count colour bar on the right.
pub fn draw_hexbin(
    output: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    grid: &HexGrid,
) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(output)?;
    let root_area =
        BitMapBackend::new(output, (STATS_PLOT_WIDTH, STATS_PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let max_count = grid.max_count();
    if max_count == 0 {
        draw_unavailable_message(&root_area, title, "No rating pairs")?;
        root_area.present()?;
        return Ok(());
    }

    let (plot_area, bar_area) =
        root_area.split_horizontally((STATS_PLOT_WIDTH - COLORBAR_WIDTH_PX) as i32);

    // Hexagons reach half a cell beyond the outermost centres
    let half_x = grid.sx * 0.5;
    let half_y = grid.sy / 3.0;
    let mut chart = ChartBuilder::on(&plot_area)
        .caption(title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            grid.x_range.0 - half_x..grid.x_range.1 + half_x,
            grid.y_range.0 - half_y..grid.y_range.1 + half_y,
        )?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    chart.draw_series(grid.cells.iter().filter(|c| c.count > 0).map(|cell| {
        Polygon::new(
            grid.hexagon(cell.center),
            map_count_to_color(cell.count, max_count).filled(),
        )
    }))?;

    let mut colorbar = ChartBuilder::on(&bar_area)
        .margin_top(50)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..max_count as f64)?;
    colorbar
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc("Count in bin")
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    const COLORBAR_STEPS: usize = 100;
    let step = max_count as f64 / COLORBAR_STEPS as f64;
    colorbar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let low = i as f64 * step;
        let color = map_count_to_color((low + step * 0.5).round() as usize, max_count);
        Rectangle::new([(0.0, low), (1.0, low + step)], color.filled())
    }))?;

    root_area.present()?;
    info!("Hexbin plot saved as '{}'", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_range_padding() {
        let (lo, hi) = calculate_range(0.0, 10.0);
        assert!((lo + 1.5).abs() < 1e-12);
        assert!((hi - 11.5).abs() < 1e-12);
        assert_eq!(calculate_range(3.0, 3.0), (2.5, 3.5));
        assert_eq!(calculate_range(10.0, 0.0), calculate_range(0.0, 10.0));
    }

    #[test]
    fn test_panel_ranges_cover_markers_and_annotations() {
        let panel = HrfPanel {
            title: "t".into(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![PlotSeries {
                data: vec![(0.0, 0.0), (1.0, 1.0)],
                label: "A_HbO".into(),
                color: RED,
                stroke_width: 1,
            }],
            legend_notes: vec![],
            markers: vec![VerticalMarker {
                x: 3.0,
                color: BLACK,
                label: None,
            }],
            annotations: vec![PointAnnotation {
                x: 1.0,
                y: 1.0,
                text: "A(1.0)".into(),
            }],
        };
        let (x, y) = panel.ranges().unwrap();
        assert_eq!(x.end, 3.0);
        assert!(y.end > 1.1);

        let empty = HrfPanel {
            series: vec![],
            markers: vec![],
            annotations: vec![],
            ..panel
        };
        assert!(empty.ranges().is_none());
    }

    #[test]
    fn test_count_colors() {
        let light = map_count_to_color(0, 10);
        let dark = map_count_to_color(10, 10);
        assert!(light.0 > dark.0);
        let none = map_count_to_color(3, 0);
        assert_eq!((none.0, none.1, none.2), (light.0, light.1, light.2));
    }

    #[test]
    fn test_shorten_label() {
        assert_eq!(shorten_label("img/a.png"), "img/a.png");
        let long = "stimuli/affective/set_a/very_long_image_name_01.png";
        let short = shorten_label(long);
        assert_eq!(short.chars().count(), BAR_LABEL_MAX_CHARS);
        assert!(short.ends_with("_01.png"));
    }

    #[test]
    fn test_ensure_parent_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("a/b/plot.png");
        ensure_parent_dir(&out).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        ensure_parent_dir(Path::new("plot.png")).unwrap();
    }
}
