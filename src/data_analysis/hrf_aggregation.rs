// src/data_analysis/hrf_aggregation.rs

use std::collections::BTreeSet;

use crate::constants::{
    AROUSAL_COLUMN, EVENT_COLUMN, HBO_SUFFIX, HBR_SUFFIX, HRF_SAMPLE_PERIOD_S, MEAN_CHANNEL,
    VALENCE_COLUMN,
};
use crate::data_input::station_table::StationTable;
use crate::error::AnalysisError;
use crate::types::{AnalysisResult, NumericColumn, TextColumn, TracePoints};

/// Time of a row in seconds; exports are sampled at 10 Hz.
pub fn sample_time(row: usize) -> f64 {
    row as f64 * HRF_SAMPLE_PERIOD_S
}

/// Present samples of a column as (time, value) points.
pub fn trace_points(column: &NumericColumn) -> TracePoints {
    column
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (sample_time(row), v)))
        .collect()
}

/// Oxy- and deoxy-hemoglobin concentration of one fNIRS channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTrace {
    pub name: String,
    pub hbo: NumericColumn,
    pub hbr: NumericColumn,
}

impl ChannelTrace {
    pub fn hbo_label(&self) -> String {
        format!("{}{}", self.name, HBO_SUFFIX)
    }

    pub fn hbr_label(&self) -> String {
        format!("{}{}", self.name, HBR_SUFFIX)
    }

    fn truncated(&self, max_rows: usize) -> Self {
        Self {
            name: self.name.clone(),
            hbo: self.hbo.iter().take(max_rows).copied().collect(),
            hbr: self.hbr.iter().take(max_rows).copied().collect(),
        }
    }
}

/// The columns of an affective-task fNIRS export the HRF figures use.
#[derive(Debug, Clone, PartialEq)]
pub struct HrfTable {
    pub source_name: String,
    /// Channels in sorted name order
    pub channels: Vec<ChannelTrace>,
    pub events: TextColumn,
    pub arousal: NumericColumn,
    pub valence: NumericColumn,
}

/// Channel names with an `_HbO` or `_HbR` column, sorted and de-duplicated.
/// The reserved `Mean` channel is left out; it is always derived.
pub fn discover_channels(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter_map(|h| {
            h.strip_suffix(HBO_SUFFIX)
                .or_else(|| h.strip_suffix(HBR_SUFFIX))
        })
        .filter(|name| !name.is_empty() && *name != MEAN_CHANNEL)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Mean of the present values; `None` when every value is missing.
pub fn row_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Row-wise mean of several columns. Shorter columns simply stop contributing.
fn mean_of_columns(columns: &[&NumericColumn]) -> NumericColumn {
    let rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..rows)
        .map(|i| row_mean(columns.iter().map(|c| c.get(i).copied().flatten())))
        .collect()
}

impl HrfTable {
    /// Validates and extracts the HRF columns of a loaded table.
    ///
    /// Requires the event and rating columns and, for every channel that has
    /// one half of an `_HbO`/`_HbR` pair, the other half too.
    pub fn from_station_table(table: &StationTable) -> AnalysisResult<Self> {
        let schema_error = |reason: String| AnalysisError::Schema {
            table: table.name().to_string(),
            reason,
        };

        let mut missing: Vec<String> = [EVENT_COLUMN, AROUSAL_COLUMN, VALENCE_COLUMN]
            .iter()
            .filter(|c| !table.has_column(c))
            .map(|c| c.to_string())
            .collect();

        let channel_names = discover_channels(table.headers());
        for name in channel_names.iter() {
            for suffix in [HBO_SUFFIX, HBR_SUFFIX] {
                let column = format!("{name}{suffix}");
                if !table.has_column(&column) {
                    missing.push(column);
                }
            }
        }
        if !missing.is_empty() {
            return Err(schema_error(format!("missing columns {}", missing.join(", "))));
        }
        if channel_names.is_empty() {
            return Err(schema_error(format!(
                "no <channel>{HBO_SUFFIX}/<channel>{HBR_SUFFIX} column pair"
            )));
        }

        let channels = channel_names
            .into_iter()
            .map(|name| {
                Ok(ChannelTrace {
                    hbo: table.numeric_column(&format!("{name}{HBO_SUFFIX}"))?,
                    hbr: table.numeric_column(&format!("{name}{HBR_SUFFIX}"))?,
                    name,
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(Self {
            source_name: table.name().to_string(),
            channels,
            events: table.text_column(EVENT_COLUMN)?,
            arousal: table.numeric_column(AROUSAL_COLUMN)?,
            valence: table.numeric_column(VALENCE_COLUMN)?,
        })
    }

    pub fn row_count(&self) -> usize {
        self.events.len()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// The `Mean` trace: per row, the mean over channels of the present values.
    pub fn mean_trace(&self) -> ChannelTrace {
        let hbo: Vec<&NumericColumn> = self.channels.iter().map(|c| &c.hbo).collect();
        let hbr: Vec<&NumericColumn> = self.channels.iter().map(|c| &c.hbr).collect();
        ChannelTrace {
            name: MEAN_CHANNEL.to_string(),
            hbo: mean_of_columns(&hbo),
            hbr: mean_of_columns(&hbr),
        }
    }

    /// The first `max_rows` rows.
    pub fn truncated(&self, max_rows: usize) -> Self {
        Self {
            source_name: self.source_name.clone(),
            channels: self.channels.iter().map(|c| c.truncated(max_rows)).collect(),
            events: self.events.iter().take(max_rows).cloned().collect(),
            arousal: self.arousal.iter().take(max_rows).copied().collect(),
            valence: self.valence.iter().take(max_rows).copied().collect(),
        }
    }

    /// Errors unless `self` has exactly the channels of `reference`.
    pub fn check_layout(&self, reference: &HrfTable) -> AnalysisResult<()> {
        if self.channel_names() == reference.channel_names() {
            return Ok(());
        }
        Err(AnalysisError::Schema {
            table: self.source_name.clone(),
            reason: format!(
                "channels [{}] differ from [{}] of '{}'",
                self.channel_names().join(", "),
                reference.channel_names().join(", "),
                reference.source_name
            ),
        })
    }
}

fn average_column<'a, F>(tables: &'a [HrfTable], select: F) -> NumericColumn
where
    F: Fn(&'a HrfTable) -> &'a NumericColumn,
{
    let columns: Vec<&NumericColumn> = tables.iter().map(select).collect();
    mean_of_columns(&columns)
}

/// Element-wise average of several tables over their first `max_rows` rows.
///
/// At each row every numeric column is the mean of the values present in the
/// tables long enough to have that row. Event labels are taken from the first
/// table. All tables must share the first table's channel layout.
pub fn average_tables(tables: &[HrfTable], max_rows: usize) -> AnalysisResult<HrfTable> {
    let Some(first) = tables.first() else {
        return Err(AnalysisError::NoData("no HRF tables to average".to_string()));
    };
    for table in tables.iter().skip(1) {
        table.check_layout(first)?;
    }

    let truncated: Vec<HrfTable> = tables.iter().map(|t| t.truncated(max_rows)).collect();
    let rows = truncated.iter().map(HrfTable::row_count).max().unwrap_or(0);

    let channels = first
        .channels
        .iter()
        .enumerate()
        .map(|(index, channel)| ChannelTrace {
            name: channel.name.clone(),
            hbo: average_column(&truncated, |t| &t.channels[index].hbo),
            hbr: average_column(&truncated, |t| &t.channels[index].hbr),
        })
        .collect();

    let mut events = truncated[0].events.clone();
    events.resize(rows, None);

    Ok(HrfTable {
        source_name: format!("average of {} tables", tables.len()),
        channels,
        events,
        arousal: average_column(&truncated, |t| &t.arousal),
        valence: average_column(&truncated, |t| &t.valence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HRF_DELIMITER;

    fn load(text: &str) -> HrfTable {
        let table = StationTable::from_reader(text.as_bytes(), HRF_DELIMITER, "test.csv").unwrap();
        HrfTable::from_station_table(&table).unwrap()
    }

    fn two_channel_table(rows: usize, offset: f64) -> HrfTable {
        let mut text = String::from("event_type,arousal_score,valence_score,A_HbO,A_HbR,B_HbO,B_HbR\n");
        for i in 0..rows {
            let v = i as f64 + offset;
            text.push_str(&format!(",,,{},{},{},{}\n", v, -v, v + 2.0, -v - 2.0));
        }
        load(&text)
    }

    #[test]
    fn test_discover_channels() {
        let headers: Vec<String> = ["time", "S1_D1_HbO", "S1_D1_HbR", "A_HbR", "A_HbO", "Mean_HbO", "Mean_HbR", "station"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(discover_channels(&headers), ["A", "S1_D1"]);
    }

    #[test]
    fn test_mean_trace_averages_channels() {
        let table = load(
            "event_type,arousal_score,valence_score,A_HbO,A_HbR,B_HbO,B_HbR\n\
             show_image,,,1.0,-1.0,3.0,-3.0\n\
             ,,,2.0,0.5,,1.5\n",
        );
        let mean = table.mean_trace();
        assert_eq!(mean.name, "Mean");
        assert_eq!(mean.hbo, vec![Some(2.0), Some(2.0)]);
        assert_eq!(mean.hbr, vec![Some(-2.0), Some(1.0)]);
    }

    #[test]
    fn test_schema_requires_rating_columns_and_pairs() {
        let table = StationTable::from_reader(
            "event_type,A_HbO,A_HbR,B_HbO\nx,1,2,3\n".as_bytes(),
            HRF_DELIMITER,
            "bad.csv",
        )
        .unwrap();
        let err = HrfTable::from_station_table(&table).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, AnalysisError::Schema { .. }));
        assert!(message.contains("arousal_score"));
        assert!(message.contains("valence_score"));
        assert!(message.contains("B_HbR"));

        let no_channels = StationTable::from_reader(
            "event_type,arousal_score,valence_score\nx,1,2\n".as_bytes(),
            HRF_DELIMITER,
            "bare.csv",
        )
        .unwrap();
        assert!(matches!(
            HrfTable::from_station_table(&no_channels),
            Err(AnalysisError::Schema { .. })
        ));
    }

    #[test]
    fn test_average_tables_first_rows_elementwise() {
        let a = two_channel_table(80, 0.0);
        let b = two_channel_table(70, 10.0);
        let avg = average_tables(&[a, b], 60).unwrap();

        assert_eq!(avg.row_count(), 60);
        for i in 0..60 {
            let expected = i as f64 + 5.0;
            assert_eq!(avg.channels[0].hbo[i], Some(expected));
            assert_eq!(avg.channels[1].hbr[i], Some(-expected - 2.0));
        }
        // Mean trace of the average equals the average of per-channel means
        let mean = avg.mean_trace();
        assert_eq!(mean.hbo[3], Some(3.0 + 5.0 + 1.0));
    }

    #[test]
    fn test_average_tables_short_table_contributes_its_rows() {
        let a = two_channel_table(60, 0.0);
        let b = two_channel_table(2, 100.0);
        let avg = average_tables(&[a, b], 60).unwrap();
        assert_eq!(avg.channels[0].hbo[1], Some((1.0 + 101.0) / 2.0));
        assert_eq!(avg.channels[0].hbo[2], Some(2.0));
        assert_eq!(avg.row_count(), 60);
    }

    #[test]
    fn test_average_tables_rejects_other_layouts() {
        let a = two_channel_table(5, 0.0);
        let c = load("event_type,arousal_score,valence_score,C_HbO,C_HbR\n,,,1,2\n");
        assert!(matches!(c.check_layout(&a), Err(AnalysisError::Schema { .. })));
        assert!(average_tables(&[a, c], 60).is_err());
        assert!(matches!(average_tables(&[], 60), Err(AnalysisError::NoData(_))));
    }

    #[test]
    fn test_trace_points_skip_gaps() {
        let points = trace_points(&vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(points.len(), 2);
        assert!((points[1].0 - 0.2).abs() < 1e-12);
        assert_eq!(points[1].1, 3.0);
    }

    #[test]
    fn test_row_mean() {
        assert_eq!(row_mean([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(row_mean([None, None]), None);
    }
}
