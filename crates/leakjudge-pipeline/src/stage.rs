//! Processing and summarization stages.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{PipelineError, Result};
use crate::runner::CommandRunner;
use crate::settings::Settings;

/// Extracts content from one entity file into `output_root`.
#[async_trait]
pub trait ProcessingStage: Send + Sync {
    /// Returns `Ok(true)` when content was extracted, `Ok(false)` when the
    /// stage ran but produced nothing.
    async fn process(&self, entity_path: &Path, output_root: &Path) -> Result<bool>;
}

/// Summarizes the processed content of one entity.
#[async_trait]
pub trait SummarizationStage: Send + Sync {
    async fn summarize(&self, entity_id: &str) -> Result<()>;
}

/// Stage backed by an external command.
///
/// Each argument may contain the placeholders `{entity_path}`, `{entity_id}`
/// and `{output_root}`. A processing run reports content when
/// `<output_root>/<entity_id>` exists and is non-empty after the command
/// finishes; the directory is removed before the command starts, so only
/// this run's output counts.
#[derive(Debug, Clone)]
pub struct CommandStage {
    name: String,
    command: Vec<String>,
    timeout_secs: u64,
    output_root: PathBuf,
}

impl CommandStage {
    pub fn new(name: impl Into<String>, command: Vec<String>, timeout_secs: u64, output_root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            command,
            timeout_secs,
            output_root: output_root.into(),
        }
    }

    pub fn processing(settings: &Settings) -> Self {
        Self::new(
            "processing",
            settings.processing_command.clone(),
            settings.stage_timeout_secs,
            &settings.output_base,
        )
    }

    pub fn summarization(settings: &Settings) -> Self {
        Self::new(
            "summarization",
            settings.summarization_command.clone(),
            settings.stage_timeout_secs,
            &settings.output_base,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, entity_path: &Path, entity_id: &str, output_root: &Path) -> Vec<String> {
        let entity_path = entity_path.to_string_lossy();
        let output_root = output_root.to_string_lossy();
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{entity_path}", &entity_path)
                    .replace("{entity_id}", entity_id)
                    .replace("{output_root}", &output_root)
            })
            .collect()
    }
}

/// Entity id of an entity file: its name without the extension.
pub fn entity_id_of(entity_path: &Path) -> String {
    entity_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn clear_output(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(PipelineError::OutputDir {
            path: dir.to_path_buf(),
            source: e,
        }),
        _ => Ok(()),
    }
}

fn has_content(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[async_trait]
impl ProcessingStage for CommandStage {
    async fn process(&self, entity_path: &Path, output_root: &Path) -> Result<bool> {
        let entity_id = entity_id_of(entity_path);
        let entity_output = output_root.join(&entity_id);
        clear_output(&entity_output)?;

        let command = self.render(entity_path, &entity_id, output_root);
        let result = CommandRunner::execute(&self.name, &command, self.timeout_secs)
            .await?
            .into_passed()?;
        tracing::debug!(stage = %self.name, entity = %entity_id, duration_ms = result.duration_ms, "stage finished");

        Ok(has_content(&entity_output))
    }
}

#[async_trait]
impl SummarizationStage for CommandStage {
    async fn summarize(&self, entity_id: &str) -> Result<()> {
        // No entity file is in scope here; {entity_path} renders empty.
        let command = self.render(Path::new(""), entity_id, &self.output_root);
        let result = CommandRunner::execute(&self.name, &command, self.timeout_secs)
            .await?
            .into_passed()?;
        tracing::debug!(stage = %self.name, entity = %entity_id, duration_ms = result.duration_ms, "stage finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let stage = CommandStage::new(
            "processing",
            vec![
                "parse".to_string(),
                "--apk={entity_path}".to_string(),
                "{output_root}/{entity_id}".to_string(),
            ],
            0,
            "outputs",
        );
        let rendered = stage.render(Path::new("APKs/Button1.apk"), "Button1", Path::new("outputs"));
        assert_eq!(rendered, vec!["parse", "--apk=APKs/Button1.apk", "outputs/Button1"]);
    }

    #[test]
    fn test_entity_id_of() {
        assert_eq!(entity_id_of(Path::new("APKs/Button1.apk")), "Button1");
        assert_eq!(entity_id_of(Path::new("Loop1")), "Loop1");
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::default()
            .with_processing_command(vec!["p".to_string()])
            .with_summarization_command(vec!["s".to_string()]);
        assert_eq!(CommandStage::processing(&settings).name(), "processing");
        assert_eq!(CommandStage::summarization(&settings).command, vec!["s"]);
    }

    #[tokio::test]
    async fn test_process_reports_content() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(
            "processing",
            sh("mkdir -p '{output_root}/{entity_id}' && echo code > '{output_root}/{entity_id}/bytecode.txt'"),
            30,
            dir.path(),
        );

        let has = stage
            .process(Path::new("APKs/Button1.apk"), dir.path())
            .await
            .unwrap();
        assert!(has);
        assert!(dir.path().join("Button1/bytecode.txt").exists());
    }

    #[tokio::test]
    async fn test_process_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(
            "processing",
            sh("mkdir -p '{output_root}/{entity_id}'"),
            30,
            dir.path(),
        );

        let has = stage
            .process(Path::new("APKs/Obfuscated.apk"), dir.path())
            .await
            .unwrap();
        assert!(!has);
    }

    #[tokio::test]
    async fn test_process_ignores_output_left_by_earlier_run() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("Obfuscated");
        std::fs::create_dir_all(&stale).unwrap();
        std::fs::write(stale.join("bytecode.txt"), "old").unwrap();

        let stage = CommandStage::new("processing", sh("true"), 30, dir.path());
        let has = stage
            .process(Path::new("APKs/Obfuscated.apk"), dir.path())
            .await
            .unwrap();
        assert!(!has);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_process_non_zero_exit_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new("processing", sh("echo broken >&2; exit 3"), 30, dir.path());

        let err = stage
            .process(Path::new("APKs/Broken.apk"), dir.path())
            .await
            .unwrap_err();
        match err {
            PipelineError::StageExit { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summarize_runs_with_entity_id() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(
            "summarization",
            sh("echo done > '{output_root}/{entity_id}.summary'"),
            30,
            dir.path(),
        );

        stage.summarize("Button1").await.unwrap();
        assert!(dir.path().join("Button1.summary").exists());
    }
}
