use serde::Deserialize;
use std::path::Path;

/// Runtime knobs for ingestion and the threshold queries. Loaded from
/// `settings.json` in the workspace when one is selected; every field falls
/// back to its default when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub min_grade: i64,
    pub max_grade: i64,
    pub max_file_size: u64,
    pub max_records_per_file: usize,
    /// Grade value counted by the threshold queries (2 = failing grade).
    pub grade_to_analyze: i64,
    pub more_than_threshold: i64,
    pub less_than_threshold: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_grade: 1,
            max_grade: 5,
            max_file_size: 10 * 1024 * 1024,
            max_records_per_file: 10_000,
            grade_to_analyze: 2,
            more_than_threshold: 3,
            less_than_threshold: 5,
        }
    }
}

pub fn load_settings(workspace: &Path) -> anyhow::Result<Settings> {
    let path = workspace.join("settings.json");
    if !path.exists() {
        return Ok(Settings::default());
    }
    let bytes = std::fs::read(&path)?;
    let settings = serde_json::from_slice(&bytes)?;
    Ok(settings)
}
