// tests/affective_stats_test.rs

use std::fs;
use std::path::Path;

use expt_analysis::data_analysis::rating_stats::RatingDimension;
use expt_analysis::pipelines::affective_stats::{collect_corpus, run, AffectiveStatsConfig};
use tempfile::TempDir;

fn write_ratings(session_dir: &Path, station: &str, rows: &[(&str, &str, &str, &str)]) {
    let dir = session_dir.join("baseline_tasks/affective");
    fs::create_dir_all(&dir).unwrap();
    let mut text = String::from("timestamp;event_type;image_path;arousal_score;valence_score\n");
    for (i, (event, image, arousal, valence)) in rows.iter().enumerate() {
        text.push_str(&format!("{i};{event};{image};{arousal};{valence}\n"));
    }
    fs::write(dir.join(format!("individual_{station}.csv")), text).unwrap();
}

fn fixture_tree(root: &Path) {
    write_ratings(
        &root.join("exp_1"),
        "lion",
        &[
            ("show_image", "img/a.jpg", "", ""),
            ("intermediate_selection", "img/a.jpg", "1", "1"),
            ("final_submission", "img/a.jpg", "2", "-1"),
            ("final_submission", "img/b.jpg", "4", "3"),
        ],
    );
    write_ratings(
        &root.join("exp_2"),
        "tiger",
        &[
            ("final_submission", "img/a.jpg", "3", "0"),
            ("final_submission", "img/b.jpg", "", "1"),
        ],
    );
    // Excluded by default
    write_ratings(
        &root.join("exp_2022_04_22_09"),
        "leopard",
        &[("final_submission", "img/a.jpg", "9", "9")],
    );
}

#[test]
fn test_corpus_keeps_only_final_submissions() {
    let tmp = TempDir::new().unwrap();
    fixture_tree(tmp.path());
    let config = AffectiveStatsConfig::new(tmp.path());

    let corpus = collect_corpus(tmp.path(), &config.excluded_sessions).unwrap();
    assert_eq!(corpus.len(), 4);
    assert_eq!(corpus.values(RatingDimension::Arousal), [2.0, 4.0, 3.0]);
    assert_eq!(corpus.rating_pairs().len(), 3);
}

#[test]
fn test_per_stimulus_means() {
    let tmp = TempDir::new().unwrap();
    fixture_tree(tmp.path());
    let config = AffectiveStatsConfig::new(tmp.path());
    let corpus = collect_corpus(tmp.path(), &config.excluded_sessions).unwrap();

    let arousal = corpus.mean_by_stimulus(RatingDimension::Arousal);
    assert_eq!(
        arousal,
        vec![("img/a.jpg".to_string(), 2.5), ("img/b.jpg".to_string(), 4.0)]
    );
    let valence = corpus.mean_by_stimulus(RatingDimension::Valence);
    assert_eq!(
        valence,
        vec![("img/a.jpg".to_string(), -0.5), ("img/b.jpg".to_string(), 2.0)]
    );
}

#[test]
fn test_excluded_sessions_can_be_overridden() {
    let tmp = TempDir::new().unwrap();
    fixture_tree(tmp.path());
    let corpus = collect_corpus(tmp.path(), &["exp_1".to_string()]).unwrap();
    assert_eq!(corpus.len(), 3);
    assert!(corpus.values(RatingDimension::Arousal).contains(&9.0));
}

#[test]
fn test_empty_corpus_is_an_error() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("data/exp_1")).unwrap();
    let config = AffectiveStatsConfig {
        output_dir: tmp.path().join("out"),
        seed: Some(7),
        ..AffectiveStatsConfig::new(tmp.path().join("data"))
    };
    assert!(run(&config).is_err());
}

#[test]
fn test_five_figures_written() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fixture_tree(&data);
    let out = tmp.path().join("out/stats");
    let config = AffectiveStatsConfig {
        output_dir: out.clone(),
        seed: Some(42),
        ..AffectiveStatsConfig::new(&data)
    };

    let files = run(&config).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "hexbin_plot.png",
            "histogram_arousal.png",
            "histogram_valence.png",
            "bar_graph_arousal.png",
            "bar_graph_valence.png"
        ]
    );
    for file in files.iter() {
        assert_eq!(file.parent(), Some(out.as_path()));
        assert!(fs::metadata(file).unwrap().len() > 0, "{} is empty", file.display());
    }
}
