// src/data_input/session_walker.rs

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{AFFECTIVE_FILE_PREFIX, AFFECTIVE_SUBDIRS, CSV_EXTENSION, SESSION_PREFIX};
use crate::error::AnalysisError;
use crate::types::AnalysisResult;

fn is_session_name(name: &str) -> bool {
    name.starts_with(SESSION_PREFIX)
}

/// Final path component as a string ("" when the path has none).
pub fn session_name(session_dir: &Path) -> String {
    session_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Directory entry with `is_dir` following symlinks; `is_link` marks entries
/// that are symlinks themselves.
struct Entry {
    path: PathBuf,
    is_dir: bool,
    is_link: bool,
}

fn read_dir_sorted(dir: &Path) -> AnalysisResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))? {
        let entry = entry.map_err(|e| AnalysisError::io(dir, e))?;
        let is_link = entry
            .file_type()
            .map_err(|e| AnalysisError::io(entry.path(), e))?
            .is_symlink();
        let path = entry.path();
        entries.push(Entry {
            is_dir: path.is_dir(),
            is_link,
            path,
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// Session directories directly below `root`, sorted by name.
pub fn list_sessions(root: &Path) -> AnalysisResult<Vec<PathBuf>> {
    Ok(read_dir_sorted(root)?
        .into_iter()
        .filter(|e| e.is_dir && is_session_name(&session_name(&e.path)))
        .map(|e| e.path)
        .collect())
}

/// Session directories at any depth below `root` (a session nested inside
/// another session is reported too), sorted.
///
/// Symlinked directories are reported but not descended into. A directory
/// below `root` that cannot be read is skipped with a warning; an unreadable
/// `root` is an error.
pub fn find_sessions_recursive(root: &Path) -> AnalysisResult<Vec<PathBuf>> {
    let mut sessions = Vec::new();
    let mut pending = read_dir_sorted(root)?;
    pending.reverse();
    while let Some(entry) = pending.pop() {
        if !entry.is_dir {
            continue;
        }
        if is_session_name(&session_name(&entry.path)) {
            sessions.push(entry.path.clone());
        }
        if entry.is_link {
            continue;
        }
        match read_dir_sorted(&entry.path) {
            Ok(children) => pending.extend(children.into_iter().rev()),
            Err(e) => warn!("Skipping unreadable directory: {e}"),
        }
    }
    sessions.sort();
    Ok(sessions)
}

/// Regular files in `session_dir` whose name starts with `file_prefix`, sorted.
pub fn station_files(session_dir: &Path, file_prefix: &str) -> AnalysisResult<Vec<PathBuf>> {
    Ok(read_dir_sorted(session_dir)?
        .into_iter()
        .filter(|e| !e.is_dir && session_name(&e.path).starts_with(file_prefix))
        .map(|e| e.path)
        .collect())
}

/// Station encoded in a recording's file name: the last `_`-separated token
/// with its extension removed (`affective_individual_lion.csv` -> `lion`).
pub fn station_from_file_name(file_name: &str) -> String {
    let last = file_name.rsplit('_').next().unwrap_or(file_name);
    last.split('.').next().unwrap_or(last).to_string()
}

/// Rating exports of one session (`baseline_tasks/affective/individual_*.csv`).
/// A session without the affective folder has none.
pub fn affective_rating_files(session_dir: &Path) -> AnalysisResult<Vec<PathBuf>> {
    let affective_dir = AFFECTIVE_SUBDIRS
        .iter()
        .fold(session_dir.to_path_buf(), |dir, sub| dir.join(sub));
    if !affective_dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(station_files(&affective_dir, AFFECTIVE_FILE_PREFIX)?
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == CSV_EXTENSION))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn test_station_from_file_name() {
        assert_eq!(station_from_file_name("affective_individual_lion.csv"), "lion");
        assert_eq!(station_from_file_name("affective_individual_tiger.backup.csv"), "tiger");
        assert_eq!(station_from_file_name("leopard"), "leopard");
    }

    #[test]
    fn test_list_sessions_only_prefixed_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("exp_2022_01_01_10")).unwrap();
        fs::create_dir(tmp.path().join("exp_2022_01_02_10")).unwrap();
        fs::create_dir(tmp.path().join("pilot_2022")).unwrap();
        touch(&tmp.path().join("exp_notes.txt"));

        let sessions = list_sessions(tmp.path()).unwrap();
        let names: Vec<String> = sessions.iter().map(|p| session_name(p)).collect();
        assert_eq!(names, ["exp_2022_01_01_10", "exp_2022_01_02_10"]);
    }

    #[test]
    fn test_find_sessions_recursive() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("cohort_a/exp_1")).unwrap();
        fs::create_dir_all(tmp.path().join("cohort_b/deeper/exp_2")).unwrap();
        fs::create_dir_all(tmp.path().join("exp_3")).unwrap();

        let sessions = find_sessions_recursive(tmp.path()).unwrap();
        let names: Vec<String> = sessions.iter().map(|p| session_name(p)).collect();
        assert_eq!(names.len(), 3);
        for expected in ["exp_1", "exp_2", "exp_3"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_sessions_are_listed() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("store");
        fs::create_dir_all(store.join("exp_9")).unwrap();
        let root = tmp.path().join("data");
        fs::create_dir_all(root.join("cohort")).unwrap();
        std::os::unix::fs::symlink(store.join("exp_9"), root.join("exp_linked")).unwrap();
        // A link back up the tree must not be walked
        std::os::unix::fs::symlink(&root, root.join("cohort/loop")).unwrap();

        let names: Vec<String> = list_sessions(&root).unwrap().iter().map(|p| session_name(p)).collect();
        assert_eq!(names, ["exp_linked"]);

        let names: Vec<String> = find_sessions_recursive(&root)
            .unwrap()
            .iter()
            .map(|p| session_name(p))
            .collect();
        assert_eq!(names, ["exp_linked"]);
    }

    #[test]
    fn test_station_files_and_affective_files() {
        let tmp = TempDir::new().unwrap();
        let session = tmp.path().join("exp_1");
        touch(&session.join("affective_individual_lion.csv"));
        touch(&session.join("group_task.csv"));
        touch(&session.join("baseline_tasks/affective/individual_tiger.csv"));
        touch(&session.join("baseline_tasks/affective/individual_tiger.json"));
        touch(&session.join("baseline_tasks/affective/group_tiger.csv"));

        let files = station_files(&session, "affective_individual_").unwrap();
        assert_eq!(files, vec![session.join("affective_individual_lion.csv")]);

        let ratings = affective_rating_files(&session).unwrap();
        assert_eq!(ratings, vec![session.join("baseline_tasks/affective/individual_tiger.csv")]);

        assert!(affective_rating_files(&tmp.path().join("exp_missing")).unwrap().is_empty());
    }
}
