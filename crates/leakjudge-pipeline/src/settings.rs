//! Pipeline settings file.
//!
//! The settings file is a JSON object. Unknown keys are ignored so the same
//! file can carry configuration for the external stages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

fn default_apk_folder() -> PathBuf {
    PathBuf::from("APKs")
}

fn default_output_base() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_entity_extension() -> String {
    "apk".to_string()
}

/// Pipeline configuration, loaded once and passed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Working directory holding the entity files.
    #[serde(default = "default_apk_folder")]
    pub apk_folder: PathBuf,

    /// Root directory the processing stage writes into.
    #[serde(default = "default_output_base")]
    pub output_base: PathBuf,

    /// Extension (without dot) of entity files picked up in batch mode.
    #[serde(default = "default_entity_extension")]
    pub entity_extension: String,

    /// Processing command; first element is the executable.
    #[serde(default)]
    pub processing_command: Vec<String>,

    /// Summarization command; first element is the executable.
    #[serde(default)]
    pub summarization_command: Vec<String>,

    /// Per-stage timeout in seconds (0 = none).
    #[serde(default)]
    pub stage_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apk_folder: default_apk_folder(),
            output_base: default_output_base(),
            entity_extension: default_entity_extension(),
            processing_command: Vec::new(),
            summarization_command: Vec::new(),
            stage_timeout_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PipelineError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that both stage commands are present.
    pub fn validate(&self) -> Result<()> {
        if self.processing_command.is_empty() {
            return Err(PipelineError::InvalidSettings(
                "processing_command is empty".to_string(),
            ));
        }
        if self.summarization_command.is_empty() {
            return Err(PipelineError::InvalidSettings(
                "summarization_command is empty".to_string(),
            ));
        }
        if self.entity_extension.is_empty() {
            return Err(PipelineError::InvalidSettings(
                "entity_extension is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the entity file for `entity_id`.
    pub fn entity_path(&self, entity_id: &str) -> PathBuf {
        self.apk_folder
            .join(format!("{entity_id}.{}", self.entity_extension))
    }

    pub fn with_apk_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.apk_folder = dir.into();
        self
    }

    pub fn with_output_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_base = dir.into();
        self
    }

    pub fn with_processing_command(mut self, command: Vec<String>) -> Self {
        self.processing_command = command;
        self
    }

    pub fn with_summarization_command(mut self, command: Vec<String>) -> Self {
        self.summarization_command = command;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_keys() {
        let settings: Settings = serde_json::from_str(r#"{"llm_model": "gpt-4o"}"#).unwrap();
        assert_eq!(settings.apk_folder, PathBuf::from("APKs"));
        assert_eq!(settings.output_base, PathBuf::from("outputs"));
        assert_eq!(settings.entity_extension, "apk");
        assert_eq!(settings.stage_timeout_secs, 0);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "apk_folder": "bench/APKs",
                "output_base": "bench/out",
                "processing_command": ["python", "parse.py", "{entity_path}"],
                "summarization_command": ["python", "summarize.py", "{entity_id}"],
                "stage_timeout_secs": 600
            }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.apk_folder, PathBuf::from("bench/APKs"));
        assert_eq!(settings.processing_command[2], "{entity_path}");
        assert_eq!(settings.stage_timeout_secs, 600);
        settings.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, PipelineError::SettingsRead { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::SettingsParse { .. }));
    }

    #[test]
    fn test_validate_rejects_missing_commands() {
        let err = Settings::default().validate().unwrap_err();
        assert!(err.to_string().contains("processing_command"));

        let err = Settings::default()
            .with_processing_command(vec!["true".to_string()])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("summarization_command"));
    }

    #[test]
    fn test_entity_path() {
        let settings = Settings::default().with_apk_folder("bench");
        assert_eq!(settings.entity_path("Button1"), PathBuf::from("bench/Button1.apk"));
    }
}
