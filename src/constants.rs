// src/constants.rs

use plotters::style::colors::full_palette::{BLUE, RED};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const HRF_PANEL_HEIGHT: u32 = 480; // One stacked HRF panel
pub const STATS_PLOT_WIDTH: u32 = 1280;
pub const STATS_PLOT_HEIGHT: u32 = 768;
pub const COLORBAR_WIDTH_PX: u32 = 160;

// Font sizes.
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 14;
pub const FONT_SIZE_LEGEND: i32 = 14;
pub const FONT_SIZE_ANNOTATION: i32 = 14;
pub const FONT_SIZE_MESSAGE: i32 = 20;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_MARKER: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;

// --- Directory layout ---
pub const SESSION_PREFIX: &str = "exp_";
pub const EEG_FILE_NAME: &str = "EEG.csv";
pub const HRF_FILE_PREFIX: &str = "affective_individual_";
pub const AFFECTIVE_SUBDIRS: [&str; 2] = ["baseline_tasks", "affective"];
pub const AFFECTIVE_FILE_PREFIX: &str = "individual_";
pub const CSV_EXTENSION: &str = "csv";
pub const DEFAULT_IGNORE_FILE: &str = "ignore_experimenter.csv";
pub const DEFAULT_STATS_OUTPUT_DIR: &str = "output";
pub const AVERAGE_PLOT_FILE_NAME: &str = "average_plot.png";

// Sessions left out of the affective statistics.
pub const DEFAULT_EXCLUDED_SESSIONS: [&str; 2] = ["exp_2022_04_22_09", "exp_2022_04_01_13"];

// --- CSV delimiters (each pipeline reads its own upstream format) ---
pub const EEG_DELIMITER: u8 = b';';
pub const HRF_DELIMITER: u8 = b',';
pub const AFFECTIVE_DELIMITER: u8 = b';';
pub const EXCLUSION_DELIMITER: u8 = b',';

// --- Column names ---
pub const EKG_COLUMN: &str = "AUX_EKG";
pub const EVENT_COLUMN: &str = "event_type";
pub const AROUSAL_COLUMN: &str = "arousal_score";
pub const VALENCE_COLUMN: &str = "valence_score";
pub const IMAGE_PATH_COLUMN: &str = "image_path";
pub const EXCLUSION_SESSION_COLUMN: &str = "group_session";
pub const EXCLUSION_STATION_COLUMN: &str = "station";
pub const SESSION_RESULT_COLUMN: &str = "exp_dir";
pub const HBO_SUFFIX: &str = "_HbO";
pub const HBR_SUFFIX: &str = "_HbR";
pub const MEAN_CHANNEL: &str = "Mean";

// --- ECG quality scoring ---
pub const ECG_SAMPLING_RATE_HZ: f64 = 500.0;
pub const EKG_UNIT_SCALE: f64 = 1e-6; // Raw AUX channel to the scorer's input unit

// Band-pass cleaning (BioSPPy-style FIR)
pub const ECG_CLEAN_LOW_HZ: f64 = 0.67;
pub const ECG_CLEAN_HIGH_HZ: f64 = 45.0;
pub const ECG_CLEAN_ORDER_FACTOR: f64 = 1.5; // numtaps = int(factor * fs), forced odd
pub const FILTFILT_PAD_FACTOR: usize = 3;

// Pan-Tompkins detection
pub const PT_INTEGRATION_WINDOW_S: f64 = 0.12;
pub const PT_BLANKING_S: f64 = 0.2;
pub const PT_MIN_PEAK_DISTANCE_S: f64 = 0.3;
pub const PT_MIN_MISSED_DISTANCE_S: f64 = 0.25;
pub const PT_SIGNAL_LEARNING_RATE: f64 = 0.125;
pub const PT_THRESHOLD_FRACTION: f64 = 0.25;
pub const PT_RR_MISSED_FACTOR: f64 = 1.66;
pub const PT_RR_HISTORY: usize = 8;

// Zhao (2018) fusion
pub const ZHAO_PSD_WINDOW_S: f64 = 1024.0;
pub const ZHAO_PSQI_NUM_BAND_HZ: (f64, f64) = (5.0, 15.0);
pub const ZHAO_PSQI_DEN_BAND_HZ: (f64, f64) = (5.0, 40.0);
pub const ZHAO_BASSQI_NUM_BAND_HZ: (f64, f64) = (0.0, 1.0);
pub const ZHAO_BASSQI_DEN_BAND_HZ: (f64, f64) = (0.0, 40.0);
pub const ZHAO_HEART_RATE_SPLIT_BPM: f64 = 130.0;
pub const ZHAO_PSQI_LIMITS_NORMAL: (f64, f64, f64) = (0.5, 0.8, 0.4);
pub const ZHAO_PSQI_LIMITS_TACHY: (f64, f64, f64) = (0.4, 0.7, 0.3);
pub const ZHAO_KSQI_OPTIMAL: f64 = 5.0;
pub const ZHAO_BASSQI_OPTIMAL: f64 = 0.95;
pub const ZHAO_BASSQI_UNQUALIFIED: f64 = 0.9;

// --- HRF figures ---
pub const HRF_SAMPLE_PERIOD_S: f64 = 0.1;
pub const HRF_AVERAGE_MAX_ROWS: usize = 60;
pub const ANNOTATION_Y_OFFSET: f64 = 0.1;
pub const ANNOTATION_DOT_RADIUS: u32 = 4;
pub const EVENT_MARKER_DASHES: usize = 30;
pub const HRF_X_LABEL: &str = "Time (seconds)";
pub const HRF_Y_LABEL: &str = "Concentration (μmol/L)";
pub const AROUSAL_LEGEND_NOTE: &str = "A: Arousal Score";
pub const VALENCE_LEGEND_NOTE: &str = "V: Valence Score";
pub const AVERAGE_PLOT_TITLE: &str = "Average Across Experiments";

// --- Affective statistics ---
pub const RATING_JITTER: f64 = 0.2;
pub const HISTOGRAM_BINS: usize = 5;
pub const HEXBIN_GRIDSIZE: usize = 20;
pub const BAR_LABEL_MAX_CHARS: usize = 24;

// --- Plot Color Assignments ---
pub const COLOR_HBO: &RGBColor = &RED;
pub const COLOR_HBR: &RGBColor = &BLUE;
pub const COLOR_HISTOGRAM_FILL: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
pub const COLOR_BAR_FILL: RGBColor = RGBColor(0x87, 0xce, 0xeb); // skyblue

// src/constants.rs
