//! Data-directory resolution.

use novamart_core::config::DataConfig;
use novamart_core::{DashboardError, DashboardResult};
use std::path::PathBuf;
use tracing::{debug, warn};

/// First existing directory from the configured candidates.
///
/// A configured `dir` is the only candidate; otherwise the default list is
/// tried in order. Only existence is checked here; file presence is
/// validated by the loader.
pub fn resolve_data_dir(config: &DataConfig) -> DashboardResult<PathBuf> {
    let candidates = config.candidate_dirs();
    for dir in &candidates {
        if dir.is_dir() {
            debug!(dir = %dir.display(), "Data directory resolved");
            return Ok(dir.clone());
        }
        debug!(dir = %dir.display(), "Candidate data directory absent");
    }

    warn!(candidates = candidates.len(), "No data directory found");
    Err(DashboardError::DirectoryNotFound {
        candidates: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_existing_candidate_wins() {
        let root = tempfile::tempdir().unwrap();
        let second = root.path().join("data");
        let third = root.path().join("marketing_dataset");
        std::fs::create_dir(&second).unwrap();
        std::fs::create_dir(&third).unwrap();

        let config = DataConfig {
            dir: None,
            candidates: vec![
                root.path().join("missing").display().to_string(),
                second.display().to_string(),
                third.display().to_string(),
            ],
        };
        assert_eq!(resolve_data_dir(&config).unwrap(), second);
    }

    #[test]
    fn test_explicit_dir_is_not_silently_replaced() {
        let root = tempfile::tempdir().unwrap();
        let fallback = root.path().join("data");
        std::fs::create_dir(&fallback).unwrap();

        let config = DataConfig {
            dir: Some(root.path().join("typo").display().to_string()),
            candidates: vec![fallback.display().to_string()],
        };
        let err = resolve_data_dir(&config).unwrap_err();
        match err {
            DashboardError::DirectoryNotFound { candidates } => {
                assert_eq!(candidates.len(), 1);
                assert!(candidates[0].ends_with("typo"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("data");
        std::fs::write(&file, "not a dir").unwrap();
        let config = DataConfig {
            dir: None,
            candidates: vec![file.display().to_string()],
        };
        assert!(resolve_data_dir(&config).is_err());
    }
}
