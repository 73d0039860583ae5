//! Single-entity and batch orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::obs;
use crate::report::{BatchReport, EntityOutcome};
use crate::settings::Settings;
use crate::stage::{CommandStage, ProcessingStage, SummarizationStage};
use crate::state::{EntityRun, EntityState};

/// Which entities a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// One named entity (file name without extension).
    Single(String),
    /// Every entity file in the working directory.
    Batch,
}

/// Drives entities through processing and summarization.
///
/// Entities are handled one after the other. A failing entity is classified
/// and the run moves on; nothing is retried.
pub struct PipelineOrchestrator {
    settings: Settings,
    processing: Arc<dyn ProcessingStage>,
    summarization: Arc<dyn SummarizationStage>,
}

impl PipelineOrchestrator {
    pub fn new(
        settings: Settings,
        processing: Arc<dyn ProcessingStage>,
        summarization: Arc<dyn SummarizationStage>,
    ) -> Self {
        Self {
            settings,
            processing,
            summarization,
        }
    }

    /// Orchestrator whose stages run the commands configured in `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let processing = Arc::new(CommandStage::processing(&settings));
        let summarization = Arc::new(CommandStage::summarization(&settings));
        Ok(Self::new(settings, processing, summarization))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Entity files in the working directory, sorted by file name.
    pub fn discover_entities(&self) -> Result<Vec<(String, PathBuf)>> {
        let dir = &self.settings.apk_folder;
        let working_dir_err = |source: std::io::Error| PipelineError::WorkingDir {
            path: dir.clone(),
            source,
        };

        let mut entities = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(working_dir_err)? {
            let path = entry.map_err(working_dir_err)?.path();
            if !path.is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .is_some_and(|ext| ext == self.settings.entity_extension.as_str());
            if !matches_ext {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                entities.push((stem.to_string_lossy().to_string(), path));
            }
        }
        entities.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        Ok(entities)
    }

    /// Run the pipeline and report every entity's terminal state.
    ///
    /// Fails up front when the named entity is missing or the working
    /// directory cannot be listed; per-entity failures are reported instead.
    pub async fn run(&self, mode: RunMode) -> Result<BatchReport> {
        let entities = match &mode {
            RunMode::Single(entity_id) => {
                let path = self.settings.entity_path(entity_id);
                if !path.is_file() {
                    return Err(PipelineError::EntityNotFound(path));
                }
                vec![(entity_id.clone(), path)]
            }
            RunMode::Batch => self.discover_entities()?,
        };

        let output_root = &self.settings.output_base;
        std::fs::create_dir_all(output_root).map_err(|source| PipelineError::WorkingDir {
            path: output_root.clone(),
            source,
        })?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        obs::emit_batch_started(&run_id, entities.len());

        let mut outcomes = Vec::with_capacity(entities.len());
        for (entity_id, path) in entities {
            info!(entity = %entity_id, mode = ?mode, "Processing entity");
            let state = self.process_entity(&entity_id, &path).await?;
            obs::emit_entity_classified(&entity_id, &state);
            outcomes.push(EntityOutcome { entity_id, state });
        }

        let report = BatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        obs::emit_batch_finished(
            &run_id,
            report.succeeded().len(),
            report.failed().len(),
            report.empty().len(),
        );
        Ok(report)
    }

    /// Drive one entity to a terminal state.
    ///
    /// Stage errors become [`EntityState::Failed`]; only an illegal state
    /// transition is returned as an error.
    pub async fn process_entity(&self, entity_id: &str, path: &std::path::Path) -> Result<EntityState> {
        let mut run = EntityRun::new(entity_id);
        run.advance(EntityState::Processing)?;

        let next = match self.processing.process(path, &self.settings.output_base).await {
            Err(e) => EntityState::Failed {
                reason: e.to_string(),
            },
            Ok(false) => EntityState::EmptyResult,
            Ok(true) => match self.summarization.summarize(entity_id).await {
                Ok(()) => EntityState::Succeeded,
                Err(e) => EntityState::Failed {
                    reason: e.to_string(),
                },
            },
        };
        run.advance(next)?;
        Ok(run.into_state())
    }
}
