// tests/hrf_pipeline_test.rs

use std::fs;
use std::path::{Path, PathBuf};

use expt_analysis::data_analysis::hrf_aggregation::average_tables;
use expt_analysis::error::AnalysisError;
use expt_analysis::data_input::exclusion::ExclusionList;
use expt_analysis::pipelines::hrf_average::collect_tables;
use expt_analysis::pipelines::hrf_plots::{
    discover_inputs, load_hrf_table, output_path_for, HrfPlotConfig,
};
use expt_analysis::pipelines::{hrf_average, hrf_plots};
use tempfile::TempDir;

/// Two-channel HRF recording; channel values are `offset + row`.
fn write_hrf(path: &Path, rows: usize, offset: f64) {
    let mut text = String::from(
        "S1_D1_HbO,S1_D1_HbR,S2_D1_HbO,S2_D1_HbR,event_type,arousal_score,valence_score\n",
    );
    for row in 0..rows {
        let v = offset + row as f64;
        let (event, arousal, valence) = match row {
            0 => ("start_affective_task", "", ""),
            5 => ("show_image", "", ""),
            9 => ("final_submission", "3", "-1"),
            _ => ("", "", ""),
        };
        text.push_str(&format!(
            "{v},{},{},{},{event},{arousal},{valence}\n",
            -v,
            v + 2.0,
            -v - 2.0
        ));
    }
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn fixture_tree(root: &Path) {
    write_hrf(&root.join("cohort/exp_1/affective_individual_lion.csv"), 80, 0.0);
    write_hrf(&root.join("cohort/exp_1/affective_individual_tiger.csv"), 70, 10.0);
    write_hrf(&root.join("exp_2/affective_individual_leopard.csv"), 80, 1000.0);
}

fn ignore_file(dir: &Path) -> PathBuf {
    let path = dir.join("ignore_experimenter.csv");
    fs::write(&path, "group_session,station\nexp_2,leopard\n").unwrap();
    path
}

#[test]
fn test_excluded_pair_gets_no_figure() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fixture_tree(&root);
    let exclusions = ExclusionList::load(&ignore_file(tmp.path())).unwrap();

    let inputs = discover_inputs(&root, &exclusions).unwrap();
    let stations: Vec<&str> = inputs.iter().map(|i| i.station.as_str()).collect();
    assert_eq!(stations, ["lion", "tiger"]);

    let out = output_path_for(&root, Path::new("plots"), &inputs[0]);
    assert_eq!(out, Path::new("plots/cohort/exp_1/affective_individual_lion.png"));
}

#[test]
fn test_average_over_first_sixty_rows() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fixture_tree(&root);
    let exclusions = ExclusionList::load(&ignore_file(tmp.path())).unwrap();

    let inputs = discover_inputs(&root, &exclusions).unwrap();
    let tables = collect_tables(&inputs).unwrap();
    assert_eq!(tables.len(), 2);

    let average = average_tables(&tables, 60).unwrap();
    assert_eq!(average.row_count(), 60);
    for row in [0, 17, 59] {
        // mean of row and 10 + row
        let expected = row as f64 + 5.0;
        assert_eq!(average.channels[0].hbo[row], Some(expected));
        assert_eq!(average.channels[0].hbr[row], Some(-expected));
        assert_eq!(average.channels[1].hbo[row], Some(expected + 2.0));
    }
    assert_eq!(average.events[5].as_deref(), Some("show_image"));
    assert_eq!(average.arousal[9], Some(3.0));

    // The mean trace is the average of the channel traces
    let mean = average.mean_trace();
    assert_eq!(mean.hbo[0], Some(6.0));
    assert_eq!(mean.hbr[0], Some(-6.0));
}

#[test]
fn test_malformed_and_mismatched_tables_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    write_hrf(&root.join("exp_1/affective_individual_lion.csv"), 20, 0.0);
    fs::write(
        root.join("exp_1/affective_individual_leopard.csv"),
        "S1_D1_HbO,S1_D1_HbR,event_type\n1,2,show_image\n",
    )
    .unwrap();
    fs::write(
        root.join("exp_1/affective_individual_tiger.csv"),
        "S9_D9_HbO,S9_D9_HbR,event_type,arousal_score,valence_score\n1,2,show_image,,\n",
    )
    .unwrap();

    let inputs = discover_inputs(&root, &ExclusionList::default()).unwrap();
    assert_eq!(inputs.len(), 3);
    let tables = collect_tables(&inputs).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].channel_names(), ["S1_D1", "S2_D1"]);
}

#[test]
fn test_missing_rating_columns_reject_single_plot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("affective_individual_lion.csv");
    fs::write(&path, "S1_D1_HbO,S1_D1_HbR,event_type\n1,2,show_image\n").unwrap();
    assert!(load_hrf_table(&path).is_err());
}

#[test]
fn test_missing_ignore_file_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fixture_tree(&root);
    let config = HrfPlotConfig {
        input_root: root,
        output_root: tmp.path().join("plots"),
        ignore_file: tmp.path().join("absent.csv"),
    };
    assert!(hrf_plots::run(&config).is_err());
    assert!(hrf_average::run(&config).is_err());
    assert!(!tmp.path().join("plots").exists());
}

#[test]
fn test_average_without_recordings_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fs::create_dir_all(root.join("exp_1")).unwrap();
    let config = HrfPlotConfig {
        input_root: root,
        output_root: tmp.path().join("plots"),
        ignore_file: ignore_file(tmp.path()),
    };
    assert!(hrf_average::run(&config).is_err());
}

#[test]
fn test_figures_written_to_mirrored_paths() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fixture_tree(&root);
    let plots = tmp.path().join("plots");
    let config = HrfPlotConfig {
        input_root: root,
        output_root: plots.clone(),
        ignore_file: ignore_file(tmp.path()),
    };

    let written = hrf_plots::run(&config).unwrap();
    let lion = plots.join("cohort/exp_1/affective_individual_lion.png");
    let tiger = plots.join("cohort/exp_1/affective_individual_tiger.png");
    assert_eq!(written, vec![lion.clone(), tiger.clone()]);
    for figure in [&lion, &tiger] {
        assert!(fs::metadata(figure).unwrap().len() > 0, "{} is empty", figure.display());
    }
    // exp_2/leopard is on the exclusion list
    assert!(!plots.join("exp_2").exists());
}

#[test]
fn test_average_figure_written() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fixture_tree(&root);
    let plots = tmp.path().join("plots");
    let config = HrfPlotConfig {
        input_root: root,
        output_root: plots.clone(),
        ignore_file: ignore_file(tmp.path()),
    };

    let output = hrf_average::run(&config).unwrap();
    assert_eq!(output, plots.join("average_plot.png"));
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn test_unknown_event_aborts_plotting() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("data");
    fs::create_dir_all(root.join("exp_1")).unwrap();
    fs::write(
        root.join("exp_1/affective_individual_lion.csv"),
        "S1_D1_HbO,S1_D1_HbR,event_type,arousal_score,valence_score\n\
         0.1,-0.1,start_affective_task,,\n\
         0.2,-0.2,coffee_break,,\n",
    )
    .unwrap();
    let plots = tmp.path().join("plots");
    let config = HrfPlotConfig {
        input_root: root,
        output_root: plots.clone(),
        ignore_file: ignore_file(tmp.path()),
    };

    let err = hrf_plots::run(&config).unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::UnknownEvent(label)) => assert_eq!(label, "coffee_break"),
        other => panic!("expected an unknown event error, got {other:?}"),
    }
    assert!(!plots.join("exp_1/affective_individual_lion.png").exists());
}
